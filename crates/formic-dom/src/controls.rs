//! Form Control Model
//!
//! Control classification, ownership, grouping and effective values.

use crate::{DomTree, NodeId};

/// Tags that take part in validation
pub const VALIDATABLE_TAGS: [&str; 4] = ["input", "select", "textarea", "button"];

/// Form-associated tags (a superset; fieldset/output appear in a form's
/// element collection but are never validated)
pub const FORM_ASSOCIATED_TAGS: [&str; 6] =
    ["input", "select", "textarea", "button", "fieldset", "output"];

/// Check whether a tag is a validatable control kind
pub fn is_validatable(tag: &str) -> bool {
    VALIDATABLE_TAGS.contains(&tag)
}

/// Check whether a tag belongs to a form's element collection
pub fn is_form_associated(tag: &str) -> bool {
    FORM_ASSOCIATED_TAGS.contains(&tag)
}

/// Control type in the DOM sense: `type` attribute for inputs (default
/// "text"), "select-one"/"select-multiple" for selects, the tag name
/// otherwise.
pub fn control_type(tree: &DomTree, id: NodeId) -> String {
    match tree.tag_name(id) {
        Some("input") => tree
            .attr(id, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string()),
        Some("select") => {
            if tree.has_attr(id, "multiple") {
                "select-multiple".to_string()
            } else {
                "select-one".to_string()
            }
        }
        Some("button") => tree
            .attr(id, "type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "submit".to_string()),
        Some(tag) => tag.to_string(),
        None => String::new(),
    }
}

/// Check the `disabled` attribute
pub fn is_disabled(tree: &DomTree, id: NodeId) -> bool {
    tree.has_attr(id, "disabled")
}

/// `name` attribute of a control
pub fn name_of(tree: &DomTree, id: NodeId) -> Option<&str> {
    tree.attr(id, "name")
}

/// Nearest `<form>` ancestor
pub fn form_owner(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let parent = tree.parent(id)?;
    tree.find_ancestor(parent, |t, n| t.tag_name(n) == Some("form"))
}

/// A form's element collection, in document order
pub fn form_elements(tree: &DomTree, form: NodeId) -> Vec<NodeId> {
    tree.descendants(form)
        .into_iter()
        .filter(|&node| {
            tree.tag_name(node)
                .is_some_and(is_form_associated)
        })
        .collect()
}

/// Members of a form's element collection sharing a name
pub fn controls_named(tree: &DomTree, form: NodeId, name: &str) -> Vec<NodeId> {
    form_elements(tree, form)
        .into_iter()
        .filter(|&node| tree.attr(node, "name") == Some(name))
        .collect()
}

/// Check whether a control belongs to a same-named multi-control group
/// (the named lookup on its form yields a collection, not one element)
pub fn is_multi_group(tree: &DomTree, id: NodeId) -> bool {
    let Some(name) = name_of(tree, id) else {
        return false;
    };
    let Some(form) = form_owner(tree, id) else {
        return false;
    };
    controls_named(tree, form, name).len() > 1
}

/// First member of a control's same-named group, or the control itself
pub fn first_of_group(tree: &DomTree, id: NodeId) -> NodeId {
    if !is_multi_group(tree, id) {
        return id;
    }
    let name = name_of(tree, id).unwrap_or_default().to_string();
    match form_owner(tree, id) {
        Some(form) => controls_named(tree, form, &name)
            .first()
            .copied()
            .unwrap_or(id),
        None => id,
    }
}

/// Check an inline `display: none` on the element's style attribute
pub fn is_display_hidden(tree: &DomTree, id: NodeId) -> bool {
    let Some(style) = tree.attr(id, "style") else {
        return false;
    };
    style.split(';').any(|decl| {
        let mut parts = decl.splitn(2, ':');
        let prop = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        prop.eq_ignore_ascii_case("display") && value.eq_ignore_ascii_case("none")
    })
}

/// Raw value of a control: `value` attribute for most kinds, text
/// content for textareas.
pub fn raw_value(tree: &DomTree, id: NodeId) -> String {
    match tree.tag_name(id) {
        Some("textarea") => tree.text_content(id),
        _ => tree.attr(id, "value").unwrap_or_default().to_string(),
    }
}

/// Effective value of a form control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    /// No value (unchecked radio group, unselected single-select)
    None,
    /// Checkbox state
    Bool(bool),
    /// Single textual value
    Text(String),
    /// Multi-control or multi-select collection
    List(Vec<String>),
}

impl ControlValue {
    /// Emptiness the way loose JS comparison saw it: `null`, `false`,
    /// `""` and `[]` all compare equal to the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Bool(checked) => !checked,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Rendering for `%value` message substitution
    pub fn display(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(checked) => checked.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// Compute a control's effective value.
///
/// Radio groups yield the checked member's value; `name[]` groups
/// collect checked checkboxes and non-empty other members; selects
/// follow their `selected` options; checkboxes are their checked state;
/// text kinds drop carriage returns and (outside textareas) trim.
pub fn control_value(tree: &DomTree, id: NodeId) -> ControlValue {
    let kind = control_type(tree, id);

    if kind == "radio" {
        let name = name_of(tree, id).unwrap_or_default().to_string();
        if let Some(form) = form_owner(tree, id) {
            for member in form_elements(tree, form) {
                if tree.attr(member, "name") == Some(name.as_str())
                    && tree.has_attr(member, "checked")
                {
                    return ControlValue::Text(raw_value(tree, member));
                }
            }
        }
        return ControlValue::None;
    }

    if kind == "file" {
        return ControlValue::Text(raw_value(tree, id));
    }

    if tree.tag_name(id) == Some("select") {
        let selected: Vec<String> = tree
            .descendants(id)
            .into_iter()
            .filter(|&node| {
                tree.tag_name(node) == Some("option") && tree.has_attr(node, "selected")
            })
            .map(|node| option_value(tree, node))
            .collect();
        if kind == "select-one" {
            return match selected.into_iter().next() {
                Some(value) => ControlValue::Text(value),
                None => ControlValue::None,
            };
        }
        return ControlValue::List(selected);
    }

    if name_of(tree, id).is_some_and(|n| n.ends_with("[]")) {
        let members = if is_multi_group(tree, id) {
            let name = name_of(tree, id).unwrap_or_default().to_string();
            let form = form_owner(tree, id);
            match form {
                Some(form) => controls_named(tree, form, &name),
                None => vec![id],
            }
        } else {
            vec![id]
        };

        let mut values = Vec::new();
        for member in members {
            let value = raw_value(tree, member);
            if control_type(tree, member) == "checkbox" {
                if tree.has_attr(member, "checked") {
                    values.push(value);
                }
            } else if !value.is_empty() {
                values.push(value);
            }
        }
        return ControlValue::List(values);
    }

    if kind == "checkbox" {
        return ControlValue::Bool(tree.has_attr(id, "checked"));
    }

    if tree.tag_name(id) == Some("textarea") {
        return ControlValue::Text(raw_value(tree, id).replace('\r', ""));
    }

    ControlValue::Text(raw_value(tree, id).replace('\r', "").trim().to_string())
}

fn option_value(tree: &DomTree, option: NodeId) -> String {
    match tree.attr(option, "value") {
        Some(value) => value.to_string(),
        None => tree.text_content(option).trim().to_string(),
    }
}

/// Native number-input validity backstop: a non-empty value that does
/// not parse as a number is bad input.
pub fn number_input_valid(tree: &DomTree, id: NodeId) -> bool {
    if control_type(tree, id) != "number" {
        return true;
    }
    let raw = raw_value(tree, id);
    raw.trim().is_empty() || raw.trim().parse::<f64>().is_ok()
}
