//! Form-Level Orchestrator
//!
//! Owns the coordinator state (options, form registry, debounce timers,
//! host effect queues) and drives whole-form and per-control validation
//! through the external rule engine.

use std::collections::HashSet;

use formic_dom::{controls, ControlValue, Document, NodeId};
use serde_json::Value;
use tracing::debug;

use crate::decorate;
use crate::form::{FormFlags, FormRegistry};
use crate::host::Host;
use crate::message;
use crate::options::{Options, OptionsPatch};
use crate::rules::{split_op, Rule, RuleEngine, RULES_ATTR};
use crate::timer::DebounceTimers;

/// Attribute marking a control whose handlers are bound
pub const INITIALIZED_ATTR: &str = "data-formic-initialized";

/// Attribute on a submit control restricting validation to named scopes
pub const VALIDATION_SCOPE_ATTR: &str = "data-formic-validation-scope";

/// Forms with this class run a validation pass at load time
pub const VALIDATE_ON_LOAD_CLASS: &str = "validate-on-load";

/// Message for the native number-validity backstop
const BAD_NUMBER_MESSAGE: &str = "Please enter a valid value.";

/// The live validation coordinator.
///
/// One instance per page; all state is explicit here, nothing is
/// ambient.
pub struct LiveValidator<E: RuleEngine> {
    engine: E,
    options: Options,
    registry: FormRegistry,
    pub(crate) timers: DebounceTimers,
    host: Host,
    /// Guards focus against re-entry within one validation pass
    pub(crate) focusing: bool,
    /// Control whose focus follow-up (guard reset + offset scroll) is
    /// due on the next tick
    pub(crate) pending_focus: Option<NodeId>,
}

impl<E: RuleEngine> LiveValidator<E> {
    /// Create a coordinator with default options
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, Options::default())
    }

    /// Create a coordinator with preconfigured options (the preload
    /// hook: merge the host page's options object before this)
    pub fn with_options(engine: E, options: Options) -> Self {
        Self {
            engine,
            options,
            registry: FormRegistry::new(),
            timers: DebounceTimers::new(),
            host: Host::new(),
            focusing: false,
            pending_focus: None,
        }
    }

    /// Merge an options patch; recognized fields only, intended before
    /// the first form is initialized
    pub fn set_options(&mut self, patch: OptionsPatch) {
        self.options.merge(patch);
    }

    /// Current configuration
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The rule engine collaborator
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Host effect queues (drain alerts/scrolls, register geometry)
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Mutable host effect queues
    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// A form's current flags
    pub fn form_flags(&self, doc: &Document, form: NodeId) -> FormFlags {
        self.registry.flags(doc, form)
    }

    pub(crate) fn registry(&self) -> &FormRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut FormRegistry {
        &mut self.registry
    }

    /// Initialize every form that owns at least one rules-bearing
    /// control; forms marked for it run an on-load validation pass.
    pub fn init_on_load(&mut self, doc: &mut Document) {
        for form in doc.forms() {
            let has_rules = controls::form_elements(doc.tree(), form)
                .into_iter()
                .any(|elem| doc.tree().has_attr(elem, RULES_ATTR));
            if !has_rules {
                continue;
            }

            self.init_form(doc, form);

            if doc.tree().has_class(form, VALIDATE_ON_LOAD_CLASS) {
                self.registry
                    .update(doc, form, |flags| flags.on_load_validation = true);
                self.validate_form(doc, form);
                self.registry
                    .update(doc, form, |flags| flags.on_load_validation = false);
            }
        }
    }

    /// Initialize one form: disable native validation, create its
    /// state, bind handlers and merge server-rendered errors.
    pub fn init_form(&mut self, doc: &mut Document, form: NodeId) {
        doc.tree_mut().set_attr(form, "novalidate", "novalidate");
        self.registry.register(doc, form);

        for elem in controls::form_elements(doc.tree(), form) {
            self.setup_handlers(doc, elem);
            self.process_server_errors(doc, elem);
        }
        debug!(form = ?form, "form initialized");
    }

    /// Move server-rendered error elements into the control's message
    /// node, once, at initialization.
    ///
    /// Only direct children of the message parent count, and the
    /// control's own message node is left alone; merged markup keeps
    /// document order.
    pub fn process_server_errors(&mut self, doc: &mut Document, control: NodeId) {
        let message_node = message::message_element(doc, &self.options, control);
        let parent = message::message_parent(doc, &self.options, control).node;

        let tree = doc.tree_mut();
        let server_errors: Vec<NodeId> = tree
            .children(parent)
            .into_iter()
            .filter(|&child| {
                child != message_node
                    && tree.has_all_classes(child, &self.options.message_error_class)
            })
            .collect();

        if server_errors.is_empty() {
            return;
        }

        tree.clear_children(message_node);
        for error in server_errors {
            tree.append_child(message_node, error);
        }
    }

    /// Validate a whole form.
    ///
    /// Resets the form's error flag, honors a partial-validation scope
    /// declared by the submitting control, walks the element collection
    /// in document order and ANDs the per-control verdicts; a `false`
    /// return must cancel submission.
    pub fn validate_form(&mut self, doc: &mut Document, form: NodeId) -> bool {
        self.registry.update(doc, form, |flags| flags.has_error = false);

        let mut scope: Option<Vec<String>> = None;
        if let Some(sender) = self.registry.flags(doc, form).submitted_by {
            if doc.tree().has_attr(sender, "formnovalidate") {
                let scopes = parse_scope(doc.tree().attr(sender, VALIDATION_SCOPE_ATTR));
                if scopes.is_empty() {
                    return true;
                }
                scope = Some(scopes);
            }
        }

        let mut success = true;
        let mut seen_radio_groups: HashSet<String> = HashSet::new();

        for elem in controls::form_elements(doc.tree(), form) {
            let Some(tag) = doc.tree().tag_name(elem).map(str::to_string) else {
                continue;
            };
            if !controls::is_validatable(&tag) {
                continue;
            }

            if controls::control_type(doc.tree(), elem) == "radio" {
                let name = doc.tree().attr(elem, "name").unwrap_or_default().to_string();
                if !seen_radio_groups.insert(name) {
                    continue;
                }
            }

            if let Some(scopes) = &scope {
                let name = doc.tree().attr(elem, "name").unwrap_or_default();
                let normalized = normalize_scope_name(name);
                if !scopes
                    .iter()
                    .any(|prefix| normalized.starts_with(&format!("{prefix}-")))
                {
                    continue;
                }
            }
            if self.engine.is_disabled(doc, elem) {
                continue;
            }

            success = self.validate_control(doc, elem) && success;
            if !success && !self.options.show_all_errors {
                break;
            }
        }

        debug!(form = ?form, success, "form validated");
        success
    }

    /// Validate one control against its attached rules.
    pub fn validate_control(&mut self, doc: &mut Document, control: NodeId) -> bool {
        // Checkbox lists carry their rules only on the first input
        let control = normalize_checkbox_list(doc, control);

        let rules = self
            .engine
            .parse_rules(doc.tree().attr(control, RULES_ATTR));
        let value = self.engine.effective_value(doc, control);
        self.validate_rule_list(doc, control, &rules, &value, false, false)
    }

    fn validate_rule_list(
        &mut self,
        doc: &mut Document,
        elem: NodeId,
        rules: &[Rule],
        value: &ControlValue,
        only_check: bool,
        mut empty_optional: bool,
    ) -> bool {
        for rule in rules {
            let (negated, op) = split_op(&rule.op);
            let condition = rule.rules.is_some();

            let cur_elem = match &rule.control {
                Some(name) => {
                    match controls::form_owner(doc.tree(), elem)
                        .and_then(|form| named_item(doc, form, name))
                    {
                        Some(found) => found,
                        None => continue,
                    }
                }
                None => elem,
            };

            if op == "optional" {
                let filled = self
                    .engine
                    .evaluate_rule(doc, elem, ":filled", None, value)
                    .unwrap_or(false);
                empty_optional = !filled;
                continue;
            }
            if empty_optional && !condition && op != ":filled" {
                continue;
            }

            let cur_value = if cur_elem == elem {
                value.clone()
            } else {
                self.engine.effective_value(doc, cur_elem)
            };
            let verdict =
                self.engine
                    .evaluate_rule(doc, cur_elem, op, rule.arg.as_ref(), &cur_value);
            let Some(mut success) = verdict else { continue };
            if negated {
                success = !success;
            }

            if condition && success {
                let nested = rule.rules.as_deref().unwrap_or_default();
                let nested_empty_optional = if op == ":blank" { false } else { empty_optional };
                if !self.validate_rule_list(doc, elem, nested, value, only_check, nested_empty_optional)
                {
                    return false;
                }
            } else if !condition && !success {
                if self.engine.is_disabled(doc, cur_elem) {
                    continue;
                }
                if !only_check {
                    let message = self.expand_message(doc, elem, cur_elem, rule);
                    self.report_error(doc, cur_elem, &message);
                }
                return false;
            }
        }

        if controls::control_type(doc.tree(), elem) == "number"
            && !controls::number_input_valid(doc.tree(), elem)
        {
            if !only_check {
                self.report_error(doc, elem, BAD_NUMBER_MESSAGE);
            }
            return false;
        }

        if !only_check {
            decorate::remove_error(doc, &self.options, &self.registry, &self.engine, elem);
        }
        true
    }

    /// Expand `%value` and `%N` placeholders against effective values.
    fn expand_message(
        &self,
        doc: &Document,
        elem: NodeId,
        cur_elem: NodeId,
        rule: &Rule,
    ) -> String {
        let msg = &rule.msg;
        if !msg.contains('%') {
            return msg.clone();
        }

        let mut out = String::with_capacity(msg.len());
        let mut rest = msg.as_str();
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix("value") {
                out.push_str(&self.engine.effective_value(doc, cur_elem).display());
                rest = tail;
            } else {
                let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
                if digits == 0 {
                    out.push('%');
                    rest = after;
                } else {
                    let position: usize = after[..digits].parse().unwrap_or(0);
                    out.push_str(&self.referenced_value(doc, elem, rule, position));
                    rest = &after[digits..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Value of the control referenced by the Nth argument entry
    fn referenced_value(
        &self,
        doc: &Document,
        elem: NodeId,
        rule: &Rule,
        position: usize,
    ) -> String {
        let args: Vec<&Value> = match rule.arg.as_ref() {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };
        let Some(name) = args
            .get(position)
            .and_then(|entry| entry.get("control"))
            .and_then(Value::as_str)
        else {
            return String::new();
        };
        let Some(target) =
            controls::form_owner(doc.tree(), elem).and_then(|form| named_item(doc, form, name))
        else {
            return String::new();
        };
        self.engine.effective_value(doc, target).display()
    }

    /// Route a validation failure: alert fallback for opt-out controls,
    /// focus-and-scroll for the first failure of a pass, inline
    /// decoration otherwise.
    pub(crate) fn report_error(&mut self, doc: &mut Document, control: NodeId, message: &str) {
        let no_live_validation = doc
            .tree()
            .has_class(control, &self.options.disable_live_validation_class);

        if no_live_validation {
            let flags = self.registry.flags_of_owner(doc, control);
            if !message.is_empty() && !flags.has_error && !flags.on_load_validation {
                self.host.alert(message);
            }
        }

        let flags = self.registry.flags_of_owner(doc, control);
        if !flags.has_error && !flags.on_load_validation && !self.focusing {
            self.focusing = true;
            doc.focus(control);
            self.pending_focus = Some(control);
        }

        if !no_live_validation {
            decorate::add_error(doc, &self.options, &mut self.registry, control, message);
        }
    }
}

/// Checkbox-list members share the first input's rules
fn normalize_checkbox_list(doc: &Document, control: NodeId) -> NodeId {
    let tree = doc.tree();
    let is_boxed_checkbox = controls::name_of(tree, control).is_some_and(|n| n.ends_with("[]"))
        && controls::control_type(tree, control) == "checkbox";
    if is_boxed_checkbox {
        controls::first_of_group(tree, control)
    } else {
        control
    }
}

/// `form.elements.namedItem`: first member matching by id or name
fn named_item(doc: &Document, form: NodeId, name: &str) -> Option<NodeId> {
    controls::form_elements(doc.tree(), form)
        .into_iter()
        .find(|&elem| {
            doc.tree().attr(elem, "id") == Some(name) || doc.tree().attr(elem, "name") == Some(name)
        })
}

/// Decode the submit scope attribute; absent or malformed means empty
fn parse_scope(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|value| serde_json::from_str(value).ok())
        .unwrap_or_default()
}

/// Normalize a control name for scope matching: bracket boundaries
/// become dashes and a trailing dash closes the name.
fn normalize_scope_name(name: &str) -> String {
    let mut normalized = name.replace("][", "-").replace(['[', ']'], "-");
    normalized.push('-');
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scope_name() {
        assert_eq!(normalize_scope_name("email"), "email-");
        assert_eq!(normalize_scope_name("user[email]"), "user-email--");
        assert_eq!(normalize_scope_name("tags[]"), "tags---");
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope(None), Vec::<String>::new());
        assert_eq!(parse_scope(Some("nonsense")), Vec::<String>::new());
        assert_eq!(
            parse_scope(Some(r#"["user", "billing"]"#)),
            vec!["user".to_string(), "billing".to_string()]
        );
    }
}
