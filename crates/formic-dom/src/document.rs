//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Element holding focus, if any
    active_element: Option<NodeId>,
}

impl Document {
    /// Create a new document with html/body structure
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let body = tree.create_element("body");
        tree.append_child(tree.root(), html);
        tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            body_element: body,
            active_element: None,
        }
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&node| self.tree.attr(node, "id") == Some(id))
    }

    /// All <form> elements in document order
    pub fn forms(&self) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&node| self.tree.tag_name(node) == Some("form"))
            .collect()
    }

    /// Move focus to an element.
    ///
    /// Recorded unconditionally, the way DOM `focus()` accepts any
    /// element; visual effect is the host's concern.
    pub fn focus(&mut self, id: NodeId) {
        self.active_element = Some(id);
    }

    /// Element holding focus
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
