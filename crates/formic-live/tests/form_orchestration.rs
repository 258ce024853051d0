//! Form-level orchestration tests for formic-live
//!
//! Whole-form passes: error policies, submit scopes, focus and alert
//! fallbacks, server-rendered state and on-load validation.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use formic_dom::{ControlValue, Document, FormEvent, NodeId};
use formic_live::{
    LiveValidator, OptionsPatch, RuleEngine, RULES_ATTR, VALIDATION_SCOPE_ATTR,
};
use serde_json::Value;

/// Rule engine stub that logs the name of every control it evaluates
#[derive(Default)]
struct TestEngine {
    log: RefCell<Vec<String>>,
}

impl TestEngine {
    fn evaluated_controls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn evaluations(&self) -> usize {
        self.log.borrow().len()
    }
}

impl RuleEngine for TestEngine {
    fn evaluate_rule(
        &self,
        doc: &Document,
        control: NodeId,
        op: &str,
        arg: Option<&Value>,
        value: &ControlValue,
    ) -> Option<bool> {
        let name = doc.tree().attr(control, "name").unwrap_or("?").to_string();
        self.log.borrow_mut().push(name);
        match op {
            ":filled" => Some(!value.is_empty()),
            ":email" => {
                let text = value.display();
                Some(text.contains('@') && text.contains('.'))
            }
            ":equal" => Some(Some(value.display().as_str()) == arg.and_then(Value::as_str)),
            _ => None,
        }
    }
}

fn doc_with_form(id: &str) -> (Document, NodeId) {
    let mut doc = Document::new();
    let body = doc.body();
    let form = doc.tree.create_element("form");
    doc.tree.set_attr(form, "id", id);
    doc.tree.append_child(body, form);
    (doc, form)
}

fn add_element(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let elem = doc.tree.create_element(tag);
    for (name, value) in attrs {
        doc.tree.set_attr(elem, name, value);
    }
    doc.tree.append_child(parent, elem);
    elem
}

fn add_input(doc: &mut Document, parent: NodeId, attrs: &[(&str, &str)]) -> NodeId {
    add_element(doc, parent, "input", attrs)
}

fn filled_rules(msg: &str) -> String {
    format!(r#"[{{"op": ":filled", "msg": "{msg}"}}]"#)
}

// ============================================================================
// ERROR POLICIES
// ============================================================================

#[test]
fn test_show_all_errors_visits_every_control() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let _b = add_input(&mut doc, form, &[("name", "b"), (RULES_ATTR, &filled_rules("B"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_form(&mut doc, form));
    assert_eq!(live.engine().evaluated_controls(), vec!["a", "b"]);
}

#[test]
fn test_first_error_wins_stops_early() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let _b = add_input(&mut doc, form, &[("name", "b"), (RULES_ATTR, &filled_rules("B"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.set_options(OptionsPatch::default().show_all_errors(false));
    live.init_form(&mut doc, form);

    assert!(!live.validate_form(&mut doc, form));
    assert_eq!(live.engine().evaluated_controls(), vec!["a"]);
}

#[test]
fn test_has_error_reset_per_pass() {
    let (mut doc, form) = doc_with_form("f");
    let field = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_form(&mut doc, form));
    assert!(live.form_flags(&doc, form).has_error);

    doc.tree.set_attr(field, "value", "ok");
    assert!(live.validate_form(&mut doc, form));
    assert!(!live.form_flags(&doc, form).has_error);
}

#[test]
fn test_submit_event_carries_verdict() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    let now = Instant::now();

    // Uninitialized forms submit unhindered
    assert!(live.handle_event(&mut doc, FormEvent::Submit { form }, now));

    live.init_form(&mut doc, form);
    assert!(!live.handle_event(&mut doc, FormEvent::Submit { form }, now));
}

// ============================================================================
// CONTROL SKIPPING
// ============================================================================

#[test]
fn test_radio_groups_validated_once() {
    let (mut doc, form) = doc_with_form("f");
    let rules = filled_rules("Pick one");
    let _first = add_input(
        &mut doc,
        form,
        &[("type", "radio"), ("name", "color"), ("value", "red"), (RULES_ATTR, &rules)],
    );
    let _second = add_input(
        &mut doc,
        form,
        &[("type", "radio"), ("name", "color"), ("value", "blue"), (RULES_ATTR, &rules)],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_form(&mut doc, form));
    assert_eq!(live.engine().evaluated_controls(), vec!["color"]);
}

#[test]
fn test_disabled_controls_skipped() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(
        &mut doc,
        form,
        &[("name", "a"), ("disabled", ""), (RULES_ATTR, &filled_rules("A"))],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(live.validate_form(&mut doc, form));
    assert_eq!(live.engine().evaluations(), 0);
}

#[test]
fn test_non_validatable_tags_skipped() {
    let (mut doc, form) = doc_with_form("f");
    let _set = add_element(&mut doc, form, "fieldset", &[("name", "meta")]);
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    live.validate_form(&mut doc, form);
    assert_eq!(live.engine().evaluated_controls(), vec!["a"]);
}

// ============================================================================
// SUBMIT SCOPES
// ============================================================================

#[test]
fn test_scope_restricts_validated_controls() {
    let (mut doc, form) = doc_with_form("f");
    let _user = add_input(
        &mut doc,
        form,
        &[("name", "user[email]"), (RULES_ATTR, &filled_rules("U"))],
    );
    let _other = add_input(&mut doc, form, &[("name", "billing"), (RULES_ATTR, &filled_rules("B"))]);
    let button = add_element(
        &mut doc,
        form,
        "input",
        &[
            ("type", "submit"),
            ("formnovalidate", ""),
            (VALIDATION_SCOPE_ATTR, r#"["user"]"#),
        ],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    let now = Instant::now();
    live.init_form(&mut doc, form);

    live.handle_event(&mut doc, FormEvent::Click { target: button }, now);
    assert!(!live.handle_event(&mut doc, FormEvent::Submit { form }, now));
    assert_eq!(live.engine().evaluated_controls(), vec!["user[email]"]);
}

#[test]
fn test_empty_scope_short_circuits() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let button = add_element(
        &mut doc,
        form,
        "input",
        &[("type", "submit"), ("formnovalidate", "")],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    let now = Instant::now();
    live.init_form(&mut doc, form);

    live.handle_event(&mut doc, FormEvent::Click { target: button }, now);
    assert!(live.handle_event(&mut doc, FormEvent::Submit { form }, now));
    assert_eq!(live.engine().evaluations(), 0);
}

#[test]
fn test_plain_submitter_validates_everything() {
    let (mut doc, form) = doc_with_form("f");
    let _a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let button = add_element(&mut doc, form, "input", &[("type", "submit")]);

    let mut live = LiveValidator::new(TestEngine::default());
    let now = Instant::now();
    live.init_form(&mut doc, form);

    live.handle_event(&mut doc, FormEvent::Click { target: button }, now);
    assert!(!live.handle_event(&mut doc, FormEvent::Submit { form }, now));
    assert_eq!(live.engine().evaluated_controls(), vec!["a"]);
}

// ============================================================================
// FOCUS, SCROLL AND ALERT FALLBACKS
// ============================================================================

#[test]
fn test_first_failure_focused_once() {
    let (mut doc, form) = doc_with_form("f");
    let a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let _b = add_input(&mut doc, form, &[("name", "b"), (RULES_ATTR, &filled_rules("B"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);
    live.validate_form(&mut doc, form);

    assert_eq!(doc.active_element(), Some(a));
}

#[test]
fn test_focus_scrolls_past_configured_offset() {
    let (mut doc, form) = doc_with_form("f");
    let a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.set_options(OptionsPatch::default().focus_screen_offset_y(Some(50.0)));
    live.host_mut().set_control_top(a, 20.0);
    live.init_form(&mut doc, form);

    live.validate_form(&mut doc, form);
    live.tick(&mut doc, Instant::now());

    assert_eq!(live.host().scroll_requests().to_vec(), vec![-30.0]);
}

#[test]
fn test_no_scroll_when_control_below_offset() {
    let (mut doc, form) = doc_with_form("f");
    let a = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.set_options(OptionsPatch::default().focus_screen_offset_y(Some(50.0)));
    live.host_mut().set_control_top(a, 120.0);
    live.init_form(&mut doc, form);

    live.validate_form(&mut doc, form);
    live.tick(&mut doc, Instant::now());

    assert!(live.host().scroll_requests().is_empty());
}

#[test]
fn test_optout_control_raises_alert_instead_of_inline() {
    let (mut doc, form) = doc_with_form("f");
    let group = add_element(&mut doc, form, "div", &[("class", "form-group")]);
    let field = add_input(
        &mut doc,
        group,
        &[
            ("name", "a"),
            ("class", "no-live-validation"),
            (RULES_ATTR, &filled_rules("Fill me in")),
        ],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_form(&mut doc, form));
    assert_eq!(
        live.host().pending_alerts().to_vec(),
        vec!["Fill me in".to_string()]
    );
    assert!(!doc.tree.has_class(group, "has-error"));

    // Inline decoration was skipped entirely
    let _ = field;
    let message_node = doc.get_element_by_id("f-a_message").unwrap();
    assert_eq!(doc.tree.text_content(message_node), "");
}

#[test]
fn test_alert_raised_once_per_pass() {
    let (mut doc, form) = doc_with_form("f");
    let _inline = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);
    let _optout = add_input(
        &mut doc,
        form,
        &[
            ("name", "b"),
            ("class", "no-live-validation"),
            (RULES_ATTR, &filled_rules("B")),
        ],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);
    live.validate_form(&mut doc, form);

    // The inline control already flagged the form, so the opt-out
    // control stays quiet
    assert!(live.host().pending_alerts().is_empty());
}

// ============================================================================
// ON-LOAD VALIDATION
// ============================================================================

#[test]
fn test_init_on_load_initializes_rule_bearing_forms() {
    let (mut doc, form) = doc_with_form("f");
    let field = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let body = doc.body();
    let bare_form = add_element(&mut doc, body, "form", &[("id", "g")]);
    let bare_field = add_input(&mut doc, bare_form, &[("name", "x")]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_on_load(&mut doc);

    assert!(doc.tree.has_attr(field, formic_live::INITIALIZED_ATTR));
    assert!(!doc.tree.has_attr(bare_field, formic_live::INITIALIZED_ATTR));
    assert_eq!(doc.tree.attr(form, "novalidate"), Some("novalidate"));
    assert_eq!(doc.tree.attr(bare_form, "novalidate"), None);
}

#[test]
fn test_on_load_pass_marks_errors_without_focus() {
    let (mut doc, form) = doc_with_form("f");
    doc.tree.set_attr(form, "class", "validate-on-load");
    let group = add_element(&mut doc, form, "div", &[("class", "form-group")]);
    let _field = add_input(&mut doc, group, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_on_load(&mut doc);

    assert!(doc.tree.has_class(group, "has-error"));
    assert!(!live.form_flags(&doc, form).on_load_validation);
    // Focus side effects are suppressed while the on-load flag is up
    assert_eq!(doc.active_element(), None);
}

#[test]
fn test_on_load_pass_keeps_server_errors_on_valid_controls() {
    let (mut doc, form) = doc_with_form("f");
    doc.tree.set_attr(form, "class", "validate-on-load");
    let field = add_input(
        &mut doc,
        form,
        &[("id", "a"), ("name", "a"), ("value", "ok"), (RULES_ATTR, &filled_rules("A"))],
    );

    let server = add_element(
        &mut doc,
        form,
        "span",
        &[("class", "help-block text-danger")],
    );
    doc.tree.set_text_content(server, "Taken already");

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_on_load(&mut doc);

    // The control validates fine, but the merged server error must
    // survive the on-load pass
    let _ = field;
    let message_node = doc.get_element_by_id("a_message").unwrap();
    assert_eq!(doc.tree.text_content(message_node), "Taken already");
}

#[test]
fn test_alert_suppressed_during_on_load() {
    let (mut doc, form) = doc_with_form("f");
    doc.tree.set_attr(form, "class", "validate-on-load");
    let _field = add_input(
        &mut doc,
        form,
        &[
            ("name", "a"),
            ("class", "no-live-validation"),
            (RULES_ATTR, &filled_rules("A")),
        ],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_on_load(&mut doc);

    assert!(live.host().pending_alerts().is_empty());
}

// ============================================================================
// RULE WALK
// ============================================================================

#[test]
fn test_conditional_rules_apply_when_condition_holds() {
    let (mut doc, form) = doc_with_form("f");
    let rules = r#"[
        {"op": ":filled", "rules": [{"op": ":email", "msg": "Bad email"}]}
    ]"#;
    let field = add_input(&mut doc, form, &[("id", "e"), ("name", "e"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    // Empty: the condition fails, so the nested rule never runs
    assert!(live.validate_control(&mut doc, field));

    doc.tree.set_attr(field, "value", "nonsense");
    assert!(!live.validate_control(&mut doc, field));

    doc.tree.set_attr(field, "value", "a@b.c");
    assert!(live.validate_control(&mut doc, field));
}

#[test]
fn test_negated_rule() {
    let (mut doc, form) = doc_with_form("f");
    let rules = r#"[{"op": "~:equal", "msg": "Reserved", "arg": "admin"}]"#;
    let field = add_input(&mut doc, form, &[("name", "user"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    doc.tree.set_attr(field, "value", "admin");
    assert!(!live.validate_control(&mut doc, field));

    doc.tree.set_attr(field, "value", "alice");
    assert!(live.validate_control(&mut doc, field));
}

#[test]
fn test_optional_skips_remaining_rules_when_empty() {
    let (mut doc, form) = doc_with_form("f");
    let rules = r#"[
        {"op": "optional"},
        {"op": ":email", "msg": "Bad email"}
    ]"#;
    let field = add_input(&mut doc, form, &[("name", "e"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    // Empty and optional: the email rule is skipped
    assert!(live.validate_control(&mut doc, field));

    doc.tree.set_attr(field, "value", "nonsense");
    assert!(!live.validate_control(&mut doc, field));
}

#[test]
fn test_cross_control_rule_target() {
    let (mut doc, form) = doc_with_form("f");
    let _password = add_input(&mut doc, form, &[("name", "password"), ("value", "")]);
    let rules = r#"[{"op": ":filled", "control": "password", "msg": "Password first"}]"#;
    let confirm = add_input(&mut doc, form, &[("name", "confirm"), ("value", "x"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_control(&mut doc, confirm));
    assert_eq!(live.engine().evaluated_controls(), vec!["password"]);
}

#[test]
fn test_unknown_op_is_skipped() {
    let (mut doc, form) = doc_with_form("f");
    let rules = r#"[{"op": ":pattern", "msg": "No engine support", "arg": "x"}]"#;
    let field = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(live.validate_control(&mut doc, field));
}

#[test]
fn test_number_backstop() {
    let (mut doc, form) = doc_with_form("f");
    let field = add_input(
        &mut doc,
        form,
        &[("id", "n"), ("name", "n"), ("type", "number"), ("value", "abc")],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_control(&mut doc, field));
    let message_node = doc.get_element_by_id("n_message").unwrap();
    assert_eq!(
        doc.tree.text_content(message_node),
        "Please enter a valid value."
    );
}

#[test]
fn test_message_placeholder_expansion() {
    let (mut doc, form) = doc_with_form("f");
    let _min = add_input(&mut doc, form, &[("name", "min"), ("value", "3")]);
    let rules = r#"[{
        "op": ":equal",
        "msg": "Got %value, expected %0",
        "arg": [{"control": "min"}]
    }]"#;
    let field = add_input(&mut doc, form, &[("id", "q"), ("name", "q"), ("value", "7"), (RULES_ATTR, rules)]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    assert!(!live.validate_control(&mut doc, field));
    let message_node = doc.get_element_by_id("q_message").unwrap();
    assert_eq!(doc.tree.text_content(message_node), "Got 7, expected 3");
}

#[test]
fn test_checkbox_list_rules_live_on_first_member() {
    let (mut doc, form) = doc_with_form("f");
    let rules = filled_rules("Pick at least one");
    let first = add_input(
        &mut doc,
        form,
        &[("type", "checkbox"), ("name", "tags[]"), ("value", "rust"), (RULES_ATTR, &rules)],
    );
    let second = add_input(
        &mut doc,
        form,
        &[("type", "checkbox"), ("name", "tags[]"), ("value", "dom")],
    );

    let mut live = LiveValidator::new(TestEngine::default());
    live.init_form(&mut doc, form);

    // Validating the second member resolves to the first one's rules
    assert!(!live.validate_control(&mut doc, second));

    doc.tree.set_attr(first, "checked", "");
    assert!(live.validate_control(&mut doc, second));
}

#[test]
fn test_validation_fires_exactly_at_deadline() {
    let (mut doc, form) = doc_with_form("f");
    let field = add_input(&mut doc, form, &[("name", "a"), (RULES_ATTR, &filled_rules("A"))]);

    let mut live = LiveValidator::new(TestEngine::default());
    live.set_options(OptionsPatch::default().wait(Some(200)));
    live.init_form(&mut doc, form);

    let start = Instant::now();
    live.handle_event(&mut doc, FormEvent::KeyUp { target: field, key: 65 }, start);
    live.tick(&mut doc, start + Duration::from_millis(150));
    assert_eq!(live.engine().evaluations(), 0);
    live.tick(&mut doc, start + Duration::from_millis(200));
    assert_eq!(live.engine().evaluations(), 1);
}
