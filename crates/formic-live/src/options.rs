//! Options Registry
//!
//! Flat configuration for class names, the message tag, the debounce
//! delay and the display policies. Fixed before the first form is
//! initialized; later mutation is outside the contract.

use serde::Deserialize;
use serde_json::Value;

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct Options {
    /// Class marking the ancestor that receives error/valid classes;
    /// `None` decorates the control itself
    pub show_message_class_on_parent: Option<String>,
    /// Class marking the ancestor that receives the message node;
    /// `None` uses the control's direct parent
    pub message_parent_class: Option<String>,
    /// Class for an invalid control's group
    pub control_error_class: String,
    /// Class for a valid control's group
    pub control_valid_class: String,
    /// Class for an error message node (may be compound)
    pub message_error_class: String,
    /// Controls with this class show their message even while hidden
    pub enable_hidden_message_class: String,
    /// Controls with this class have live validation disabled
    pub disable_live_validation_class: String,
    /// Controls with this class never show the valid state
    pub disable_show_valid_class: String,
    /// Tag for lazily created message nodes
    pub message_tag: String,
    /// Message node id = control id + this postfix
    pub message_id_postfix: String,
    /// Decoration put before every non-empty error message
    pub message_error_prefix: String,
    /// Keep going after the first failing control on submit
    pub show_all_errors: bool,
    /// Toggle the valid class on passing controls
    pub show_valid: bool,
    /// Debounce delay in ms for keystroke revalidation; `None` disables
    pub wait: Option<u64>,
    /// Viewport offset in px to clear when scrolling to a focused
    /// error; `None` keeps default browser behavior
    pub focus_screen_offset_y: Option<f64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_message_class_on_parent: Some("form-group".to_string()),
            message_parent_class: None,
            control_error_class: "has-error".to_string(),
            control_valid_class: "has-success".to_string(),
            message_error_class: "help-block text-danger".to_string(),
            enable_hidden_message_class: "show-hidden-error".to_string(),
            disable_live_validation_class: "no-live-validation".to_string(),
            disable_show_valid_class: "no-show-valid".to_string(),
            message_tag: "span".to_string(),
            message_id_postfix: "_message".to_string(),
            message_error_prefix: String::new(),
            show_all_errors: true,
            show_valid: false,
            wait: None,
            focus_screen_offset_y: None,
        }
    }
}

/// A knob that host pages may switch off with JSON `false`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OrOff<T> {
    Value(T),
    Off(bool),
}

impl<T> OrOff<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Off(_) => None,
        }
    }
}

/// Partial options; only carried fields are merged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    show_message_class_on_parent: Option<OrOff<String>>,
    message_parent_class: Option<OrOff<String>>,
    control_error_class: Option<String>,
    control_valid_class: Option<String>,
    message_error_class: Option<String>,
    enable_hidden_message_class: Option<String>,
    disable_live_validation_class: Option<String>,
    disable_show_valid_class: Option<String>,
    message_tag: Option<String>,
    message_id_postfix: Option<String>,
    message_error_prefix: Option<String>,
    show_all_errors: Option<bool>,
    show_valid: Option<bool>,
    wait: Option<OrOff<u64>>,
    focus_screen_offset_y: Option<OrOff<f64>>,
}

impl OptionsPatch {
    /// Patch toggling the group-class knob
    pub fn show_message_class_on_parent(mut self, value: Option<&str>) -> Self {
        self.show_message_class_on_parent = Some(wrap(value.map(str::to_string)));
        self
    }

    /// Patch toggling the message-parent knob
    pub fn message_parent_class(mut self, value: Option<&str>) -> Self {
        self.message_parent_class = Some(wrap(value.map(str::to_string)));
        self
    }

    /// Patch the error-class name
    pub fn control_error_class(mut self, value: &str) -> Self {
        self.control_error_class = Some(value.to_string());
        self
    }

    /// Patch the valid-class name
    pub fn control_valid_class(mut self, value: &str) -> Self {
        self.control_valid_class = Some(value.to_string());
        self
    }

    /// Patch the message-class name
    pub fn message_error_class(mut self, value: &str) -> Self {
        self.message_error_class = Some(value.to_string());
        self
    }

    /// Patch the message-node tag
    pub fn message_tag(mut self, value: &str) -> Self {
        self.message_tag = Some(value.to_string());
        self
    }

    /// Patch the message-id postfix
    pub fn message_id_postfix(mut self, value: &str) -> Self {
        self.message_id_postfix = Some(value.to_string());
        self
    }

    /// Patch the message prefix
    pub fn message_error_prefix(mut self, value: &str) -> Self {
        self.message_error_prefix = Some(value.to_string());
        self
    }

    /// Patch the collect-all-errors policy
    pub fn show_all_errors(mut self, value: bool) -> Self {
        self.show_all_errors = Some(value);
        self
    }

    /// Patch the show-valid policy
    pub fn show_valid(mut self, value: bool) -> Self {
        self.show_valid = Some(value);
        self
    }

    /// Patch the debounce delay
    pub fn wait(mut self, value: Option<u64>) -> Self {
        self.wait = Some(wrap(value));
        self
    }

    /// Patch the focus scroll offset
    pub fn focus_screen_offset_y(mut self, value: Option<f64>) -> Self {
        self.focus_screen_offset_y = Some(wrap(value));
        self
    }
}

fn wrap<T>(value: Option<T>) -> OrOff<T> {
    match value {
        Some(v) => OrOff::Value(v),
        None => OrOff::Off(false),
    }
}

impl Options {
    /// Merge a typed patch; absent fields keep their value
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(v) = patch.show_message_class_on_parent {
            self.show_message_class_on_parent = v.into_option();
        }
        if let Some(v) = patch.message_parent_class {
            self.message_parent_class = v.into_option();
        }
        if let Some(v) = patch.control_error_class {
            self.control_error_class = v;
        }
        if let Some(v) = patch.control_valid_class {
            self.control_valid_class = v;
        }
        if let Some(v) = patch.message_error_class {
            self.message_error_class = v;
        }
        if let Some(v) = patch.enable_hidden_message_class {
            self.enable_hidden_message_class = v;
        }
        if let Some(v) = patch.disable_live_validation_class {
            self.disable_live_validation_class = v;
        }
        if let Some(v) = patch.disable_show_valid_class {
            self.disable_show_valid_class = v;
        }
        if let Some(v) = patch.message_tag {
            self.message_tag = v;
        }
        if let Some(v) = patch.message_id_postfix {
            self.message_id_postfix = v;
        }
        if let Some(v) = patch.message_error_prefix {
            self.message_error_prefix = v;
        }
        if let Some(v) = patch.show_all_errors {
            self.show_all_errors = v;
        }
        if let Some(v) = patch.show_valid {
            self.show_valid = v;
        }
        if let Some(v) = patch.wait {
            self.wait = v.into_option();
        }
        if let Some(v) = patch.focus_screen_offset_y {
            self.focus_screen_offset_y = v.into_option();
        }
    }

    /// Merge a preload options object (camelCase keys, JSON `false`
    /// switching a knob off). Unknown keys are ignored silently; a
    /// non-object value is ignored whole.
    pub fn merge_json(&mut self, preload: &Value) {
        match serde_json::from_value::<OptionsPatch>(preload.clone()) {
            Ok(patch) => self.merge(patch),
            Err(err) => tracing::warn!(%err, "ignoring malformed options preload"),
        }
    }
}
