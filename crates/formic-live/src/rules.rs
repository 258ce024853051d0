//! Validation Rules
//!
//! The JSON rule blob attached to controls, and the boundary to the
//! external rule-evaluation engine.

use formic_dom::{controls, ControlValue, Document, NodeId};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Attribute carrying a control's serialized rule list
pub const RULES_ATTR: &str = "data-formic-rules";

/// One declarative validation rule
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// Operator, optionally prefixed `~` for negation; a rule carrying
    /// nested `rules` is a condition
    pub op: String,
    /// Message shown on failure; `%value` and `%N` placeholders are
    /// expanded against effective values
    #[serde(default)]
    pub msg: String,
    /// Operator argument
    #[serde(default)]
    pub arg: Option<Value>,
    /// Name of another control this rule targets instead of its owner
    #[serde(default)]
    pub control: Option<String>,
    /// Nested rules, applied when this condition is satisfied
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

/// Rule blob decode failure
#[derive(Debug, Error)]
pub enum RuleParseError {
    #[error("malformed rule list: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a rule list, propagating decode failures
pub fn try_parse_rules(raw: &str) -> Result<Vec<Rule>, RuleParseError> {
    Ok(serde_json::from_str(raw)?)
}

/// Decode a rule list; absent or malformed blobs yield the empty list
pub fn parse_rules(raw: Option<&str>) -> Vec<Rule> {
    let Some(raw) = raw else { return Vec::new() };
    match try_parse_rules(raw) {
        Ok(rules) => rules,
        Err(err) => {
            warn!(%err, "ignoring malformed rule list");
            Vec::new()
        }
    }
}

/// Split an operator into its negation flag and bare name, dropping
/// any `?` suffix.
pub fn split_op(op: &str) -> (bool, &str) {
    let (negated, rest) = match op.strip_prefix('~') {
        Some(rest) => (true, rest),
        None => (false, op),
    };
    let name = rest.split('?').next().unwrap_or(rest);
    (negated, name)
}

/// The external rule-evaluation collaborator.
///
/// Only `evaluate_rule` is required; the provided defaults cover the
/// engine-side lookups this layer can answer from the DOM itself.
pub trait RuleEngine {
    /// Evaluate one rule operator against a value. `None` means the
    /// rule does not apply to this control and is skipped.
    fn evaluate_rule(
        &self,
        doc: &Document,
        control: NodeId,
        op: &str,
        arg: Option<&Value>,
        value: &ControlValue,
    ) -> Option<bool>;

    /// Check whether a control is excluded from validation
    fn is_disabled(&self, doc: &Document, control: NodeId) -> bool {
        controls::is_disabled(doc.tree(), control)
    }

    /// Decode a control's attached rule list
    fn parse_rules(&self, raw: Option<&str>) -> Vec<Rule> {
        parse_rules(raw)
    }

    /// Compute a control's effective value
    fn effective_value(&self, doc: &Document, control: NodeId) -> ControlValue {
        controls::control_value(doc.tree(), control)
    }
}
