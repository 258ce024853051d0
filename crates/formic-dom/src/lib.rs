//! Formic DOM - Document Object Model
//!
//! Minimal in-memory DOM tree for driving form validation without a
//! real browser document.

pub mod classes;
pub mod controls;
mod document;
mod events;
mod node;
mod tree;

pub use controls::ControlValue;
pub use document::Document;
pub use events::FormEvent;
pub use node::{Attr, ElementData, Node, NodeData, TextData};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
