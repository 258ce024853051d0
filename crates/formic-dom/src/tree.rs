//! DOM Tree (arena-based allocation)

use tracing::trace;

use crate::{classes, Node, NodeId};

/// Arena-based DOM tree
///
/// Nodes are never deallocated; a detached node simply has no parent.
/// Lifetime matches the page, so the arena only grows.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Root node ID
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::element(tag));
        trace!(tag, id = id.0, "created element");
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::text(content.to_string()));
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// The child is detached from any previous parent first; this is a
    /// move, never a copy.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);

        let prev_last = self.nodes[parent.index()].last_child;
        if prev_last.is_valid() {
            self.nodes[prev_last.index()].next_sibling = child;
            self.nodes[child.index()].prev_sibling = prev_last;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        self.nodes[child.index()].parent = parent;
        trace!(parent = parent.0, child = child.0, "appended child");
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let parent = node.parent;
        let prev = node.prev_sibling;
        let next = node.next_sibling;
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        parent.is_valid().then_some(parent)
    }

    /// Child IDs in document order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.get(id) else { return out };
        let mut cur = node.first_child;
        while cur.is_valid() {
            out.push(cur);
            cur = self.nodes[cur.index()].next_sibling;
        }
        out
    }

    /// Descendant IDs in preorder, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Walk from `start` (inclusive) up through ancestors until the
    /// predicate matches. Callers decide the fallback when nothing does.
    pub fn find_ancestor<F>(&self, start: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&Self, NodeId) -> bool,
    {
        let mut cur = Some(start);
        while let Some(id) = cur {
            if predicate(self, id) {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.attr(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.get_mut(id).and_then(|n| n.as_element_mut()) {
            elem.set_attr(name, value);
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(elem) = self.get_mut(id).and_then(|n| n.as_element_mut()) {
            elem.remove_attr(name);
        }
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.get(id)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.has_attr(name))
    }

    /// Check for a single class on an element
    pub fn has_class(&self, id: NodeId, name: &str) -> bool {
        classes::has_class(self.attr(id, "class"), name)
    }

    /// Check that every token of a compound class string is present
    pub fn has_all_classes(&self, id: NodeId, names: &str) -> bool {
        classes::has_all_classes(self.attr(id, "class"), names)
    }

    /// Add a class to an element
    pub fn add_class(&mut self, id: NodeId, name: &str) {
        let updated = classes::add_class(self.attr(id, "class"), name);
        self.set_attr(id, "class", &updated);
    }

    /// Remove a class from an element
    pub fn remove_class(&mut self, id: NodeId, name: &str) {
        let updated = classes::remove_class(self.attr(id, "class"), name);
        self.set_attr(id, "class", &updated);
    }

    /// Replace the class attribute wholesale
    pub fn set_class(&mut self, id: NodeId, value: &str) {
        self.set_attr(id, "class", value);
    }

    /// Detach all children of a node
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.detach(child);
        }
    }

    /// Replace a node's content with a single text child.
    ///
    /// An empty string just clears the node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(|n| n.as_text()) {
            out.push_str(text);
        }
        for child in self.descendants(id) {
            if let Some(text) = self.get(child).and_then(|n| n.as_text()) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
