//! Formic Live - Live Form Validation
//!
//! Attaches keystroke-level validation feedback to form controls that
//! carry declarative rules, and coordinates per-control error/valid
//! state with an external rule-evaluation engine.
//!
//! The coordinator owns all state explicitly: options, per-form flags,
//! per-control debounce deadlines and the host effect queues. The host
//! page feeds it [`formic_dom::FormEvent`]s plus a monotonic clock and
//! drains the queued alerts and scrolls.
//!
//! # Quick start
//! ```
//! use formic_dom::{ControlValue, Document, NodeId};
//! use formic_live::{LiveValidator, RuleEngine, RULES_ATTR};
//! use serde_json::Value;
//!
//! struct Filled;
//!
//! impl RuleEngine for Filled {
//!     fn evaluate_rule(
//!         &self,
//!         _doc: &Document,
//!         _control: NodeId,
//!         op: &str,
//!         _arg: Option<&Value>,
//!         value: &ControlValue,
//!     ) -> Option<bool> {
//!         (op == ":filled").then(|| !value.is_empty())
//!     }
//! }
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let form = doc.tree.create_element("form");
//! doc.tree.set_attr(form, "id", "signup");
//! doc.tree.append_child(body, form);
//! let email = doc.tree.create_element("input");
//! doc.tree.set_attr(email, "name", "email");
//! doc.tree.set_attr(email, RULES_ATTR, r#"[{"op": ":filled", "msg": "Fill it"}]"#);
//! doc.tree.append_child(form, email);
//!
//! let mut live = LiveValidator::new(Filled);
//! live.init_on_load(&mut doc);
//! assert!(!live.validate_form(&mut doc, form));
//! ```

pub mod decorate;
pub mod form;
pub mod host;
pub mod keys;
pub mod message;
mod options;
pub mod rules;
mod schedule;
pub mod timer;
mod validator;

pub use form::FormFlags;
pub use host::Host;
pub use message::{MessageParent, MESSAGE_ID_ATTR};
pub use options::{Options, OptionsPatch};
pub use rules::{parse_rules, try_parse_rules, Rule, RuleEngine, RuleParseError, RULES_ATTR};
pub use validator::{
    LiveValidator, INITIALIZED_ATTR, VALIDATE_ON_LOAD_CLASS, VALIDATION_SCOPE_ATTR,
};
