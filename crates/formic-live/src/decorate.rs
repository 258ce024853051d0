//! Control Decoration
//!
//! Applies and clears error/valid state on a control's group element
//! and its message node.

use formic_dom::{controls, Document, NodeId};
use tracing::debug;

use crate::form::FormRegistry;
use crate::message::{self, MESSAGE_ID_ATTR};
use crate::options::Options;
use crate::rules::{RuleEngine, RULES_ATTR};

/// Placeholder shown when an error carries no message
const NBSP: &str = "\u{a0}";

/// Resolve the element that carries the error/valid classes: the
/// nearest ancestor (control included) with the configured group class,
/// the control itself when none is found or the knob is off.
pub fn group_element(doc: &Document, options: &Options, control: NodeId) -> NodeId {
    match &options.show_message_class_on_parent {
        None => control,
        Some(marker) => doc
            .tree()
            .find_ancestor(control, |t, id| t.has_class(id, marker))
            .unwrap_or(control),
    }
}

/// Put a control into error state and display the message.
///
/// Controls that opted out of live validation are left alone.
pub fn add_error(
    doc: &mut Document,
    options: &Options,
    registry: &mut FormRegistry,
    control: NodeId,
    message: &str,
) {
    if doc
        .tree()
        .has_class(control, &options.disable_live_validation_class)
    {
        return;
    }

    let group = group_element(doc, options, control);
    registry.update_owner(doc, control, |flags| flags.has_error = true);
    doc.tree_mut().add_class(group, &options.control_error_class);
    if options.show_valid {
        doc.tree_mut()
            .remove_class(group, &options.control_valid_class);
    }

    let text = if message.is_empty() {
        NBSP.to_string()
    } else {
        format!("{}{message}", options.message_error_prefix)
    };

    let message_node = message::message_element(doc, options, control);
    let tree = doc.tree_mut();
    tree.set_text_content(message_node, &text);
    tree.set_class(message_node, &options.message_error_class);
    debug!(control = ?control, message, "error displayed");
}

/// Clear a control's error state.
///
/// A no-op while the owning form runs its on-load pass, so freshly
/// merged server errors survive the pass that re-evaluates them.
pub fn remove_error<E: RuleEngine>(
    doc: &mut Document,
    options: &Options,
    registry: &FormRegistry,
    engine: &E,
    control: NodeId,
) {
    if registry.flags_of_owner(doc, control).on_load_validation {
        return;
    }

    let group = group_element(doc, options, control);
    doc.tree_mut()
        .remove_class(group, &options.control_error_class);

    if doc.tree().has_attr(control, MESSAGE_ID_ATTR) {
        let message_node = message::message_element(doc, options, control);
        let tree = doc.tree_mut();
        tree.set_text_content(message_node, "");
        tree.set_class(message_node, "");
    }

    if options.show_valid {
        if show_valid(doc, options, engine, control) {
            doc.tree_mut().add_class(group, &options.control_valid_class);
        } else {
            doc.tree_mut()
                .remove_class(group, &options.control_valid_class);
        }
    }
}

/// Decide whether a passing control should advertise the valid state:
/// never for checkboxes/radios, rule-less controls, empty values, or
/// controls that opted out.
pub fn show_valid<E: RuleEngine>(
    doc: &Document,
    options: &Options,
    engine: &E,
    control: NodeId,
) -> bool {
    let tree = doc.tree();
    let kind = controls::control_type(tree, control);
    if kind == "checkbox" || kind == "radio" {
        return false;
    }

    let rules = engine.parse_rules(tree.attr(control, RULES_ATTR));
    if rules.is_empty() {
        return false;
    }

    if engine.effective_value(doc, control).is_empty() {
        return false;
    }

    !tree.has_class(control, &options.disable_show_valid_class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_dom::ControlValue;
    use serde_json::Value;

    struct AlwaysPass;

    impl RuleEngine for AlwaysPass {
        fn evaluate_rule(
            &self,
            _doc: &Document,
            _control: NodeId,
            _op: &str,
            _arg: Option<&Value>,
            _value: &ControlValue,
        ) -> Option<bool> {
            Some(true)
        }
    }

    fn fixture() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.tree.create_element("form");
        doc.tree.set_attr(form, "id", "f");
        doc.tree.append_child(body, form);
        let group = doc.tree.create_element("div");
        doc.tree.set_attr(group, "class", "form-group");
        doc.tree.append_child(form, group);
        let field = doc.tree.create_element("input");
        doc.tree.set_attr(field, "id", "email");
        doc.tree.set_attr(field, "name", "email");
        doc.tree.append_child(group, field);
        (doc, group, field)
    }

    #[test]
    fn test_add_error_decorates_group() {
        let (mut doc, group, field) = fixture();
        let options = Options::default();
        let mut registry = FormRegistry::new();

        add_error(&mut doc, &options, &mut registry, field, "Required");

        assert!(doc.tree.has_class(group, "has-error"));
        let msg = doc.get_element_by_id("email_message").unwrap();
        assert_eq!(doc.tree.text_content(msg), "Required");
        assert!(doc.tree.has_all_classes(msg, "help-block text-danger"));
        assert!(registry.flags_of_owner(&doc, field).has_error);
    }

    #[test]
    fn test_empty_message_renders_placeholder() {
        let (mut doc, _group, field) = fixture();
        let options = Options::default();
        let mut registry = FormRegistry::new();

        add_error(&mut doc, &options, &mut registry, field, "");
        let msg = doc.get_element_by_id("email_message").unwrap();
        assert_eq!(doc.tree.text_content(msg), "\u{a0}");
    }

    #[test]
    fn test_message_prefix() {
        let (mut doc, _group, field) = fixture();
        let mut options = Options::default();
        options.message_error_prefix = "! ".to_string();
        let mut registry = FormRegistry::new();

        add_error(&mut doc, &options, &mut registry, field, "Required");
        let msg = doc.get_element_by_id("email_message").unwrap();
        assert_eq!(doc.tree.text_content(msg), "! Required");
    }

    #[test]
    fn test_opted_out_control_untouched() {
        let (mut doc, group, field) = fixture();
        doc.tree.set_attr(field, "class", "no-live-validation");
        let options = Options::default();
        let mut registry = FormRegistry::new();

        add_error(&mut doc, &options, &mut registry, field, "Required");
        assert!(!doc.tree.has_class(group, "has-error"));
        assert!(doc.get_element_by_id("email_message").is_none());
    }

    #[test]
    fn test_error_round_trip_restores_classes() {
        let (mut doc, group, field) = fixture();
        let options = Options::default();
        let mut registry = FormRegistry::new();
        let before = doc.tree.attr(group, "class").unwrap().to_string();

        add_error(&mut doc, &options, &mut registry, field, "Required");
        remove_error(&mut doc, &options, &registry, &AlwaysPass, field);

        assert_eq!(doc.tree.attr(group, "class"), Some(before.as_str()));
        let msg = doc.get_element_by_id("email_message").unwrap();
        assert_eq!(doc.tree.text_content(msg), "");
    }

    #[test]
    fn test_remove_suppressed_during_on_load() {
        let (mut doc, group, field) = fixture();
        let options = Options::default();
        let mut registry = FormRegistry::new();

        add_error(&mut doc, &options, &mut registry, field, "Required");
        registry.update_owner(&doc, field, |f| f.on_load_validation = true);
        remove_error(&mut doc, &options, &registry, &AlwaysPass, field);

        assert!(doc.tree.has_class(group, "has-error"));
    }

    #[test]
    fn test_show_valid_policy() {
        let (mut doc, group, field) = fixture();
        let mut options = Options::default();
        options.show_valid = true;
        let mut registry = FormRegistry::new();

        // No rules attached: valid state never shown
        doc.tree.set_attr(field, "value", "a@b.c");
        add_error(&mut doc, &options, &mut registry, field, "x");
        remove_error(&mut doc, &options, &registry, &AlwaysPass, field);
        assert!(!doc.tree.has_class(group, "has-success"));

        // Rules and a non-empty value: valid state shown
        doc.tree
            .set_attr(field, RULES_ATTR, r#"[{"op": ":email", "msg": "Bad"}]"#);
        add_error(&mut doc, &options, &mut registry, field, "x");
        remove_error(&mut doc, &options, &registry, &AlwaysPass, field);
        assert!(doc.tree.has_class(group, "has-success"));

        // Checkbox never shows valid
        let check = doc.tree.create_element("input");
        doc.tree.set_attr(check, "type", "checkbox");
        assert!(!show_valid(&doc, &options, &AlwaysPass, check));
    }
}
