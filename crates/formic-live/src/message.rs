//! Message-Node Locator
//!
//! Finds or lazily creates the node that displays a control's
//! validation message, and resolves where in the tree it belongs.

use formic_dom::{controls, Document, NodeId};
use tracing::trace;

use crate::options::Options;

/// Attribute caching a control's message-node association
pub const MESSAGE_ID_ATTR: &str = "data-formic-message-id";

/// Resolved message parent; `explicit` records whether the configured
/// marker class was actually found (the fallback parent is not an
/// explicit match)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageParent {
    pub node: NodeId,
    pub explicit: bool,
}

/// Derive a document-unique id for a control's message node.
///
/// Controls with an id of their own use `id + postfix`; multi-group
/// members and id-less controls derive from the form id (or `frm`) and
/// the control name with any trailing `[]` stripped. A numeric suffix
/// disambiguates until the id is unused.
pub fn message_id(doc: &Document, options: &Options, control: NodeId) -> String {
    let tree = doc.tree();
    let control_id = tree.attr(control, "id").unwrap_or_default();
    let mut stem = format!("{control_id}{}", options.message_id_postfix);

    if let Some(name) = controls::name_of(tree, control) {
        if control_id.is_empty() || controls::is_multi_group(tree, control) {
            let name = name.strip_suffix("[]").unwrap_or(name);
            let form_id = controls::form_owner(tree, control)
                .and_then(|form| tree.attr(form, "id"))
                .filter(|id| !id.is_empty())
                .unwrap_or("frm");
            stem = format!("{form_id}-{name}{}", options.message_id_postfix);
        }
    }

    let mut id = stem.clone();
    let mut suffix = 0;
    while doc.get_element_by_id(&id).is_some() {
        suffix += 1;
        id = format!("{stem}_{suffix}");
    }
    id
}

/// Resolve the element the message node is appended under.
///
/// Walks ancestors for the configured marker class, falling back to the
/// control's direct parent. Radio/checkbox messages are hoisted out of
/// their label; non-explicit multi-group parents are promoted one extra
/// level, since grouped controls sit one wrapper deeper.
pub fn message_parent(doc: &Document, options: &Options, control: NodeId) -> MessageParent {
    let tree = doc.tree();
    let direct = tree.parent(control).unwrap_or(control);

    let mut node = direct;
    let mut explicit = false;
    if let Some(marker) = &options.message_parent_class {
        match tree.find_ancestor(direct, |t, id| t.has_class(id, marker)) {
            Some(found) => {
                node = found;
                explicit = true;
            }
            None => node = direct,
        }
    }

    let kind = controls::control_type(tree, control);
    if (kind == "checkbox" || kind == "radio") && tree.tag_name(node) == Some("label") {
        node = tree.parent(node).unwrap_or(node);
    }

    if !explicit
        && controls::name_of(tree, control).is_some()
        && controls::is_multi_group(tree, control)
    {
        node = tree.parent(node).unwrap_or(node);
    }

    MessageParent { node, explicit }
}

/// Find the message node for a control, creating it on first use.
///
/// The association is cached on the control and reused for its
/// lifetime; multi-controls sharing a `name[]` share the first member's
/// message node.
pub fn message_element(doc: &mut Document, options: &Options, control: NodeId) -> NodeId {
    let control = if controls::name_of(doc.tree(), control).is_some_and(|n| n.ends_with("[]")) {
        controls::first_of_group(doc.tree(), control)
    } else {
        control
    };

    let id = match doc.tree().attr(control, MESSAGE_ID_ATTR) {
        Some(cached) => cached.to_string(),
        None => {
            let id = message_id(doc, options, control);
            doc.tree_mut().set_attr(control, MESSAGE_ID_ATTR, &id);
            id
        }
    };

    if let Some(existing) = doc.get_element_by_id(&id) {
        return existing;
    }

    let parent = message_parent(doc, options, control).node;
    let tree = doc.tree_mut();
    let node = tree.create_element(&options.message_tag);
    tree.set_attr(node, "id", &id);
    if controls::is_display_hidden(tree, control)
        && !tree.has_class(control, &options.enable_hidden_message_class)
    {
        tree.set_attr(node, "style", "display: none");
    }
    tree.append_child(parent, node);
    trace!(id, "created message node");
    node
}
