//! Input Events
//!
//! The event kinds the validation layer subscribes to. Key codes are in
//! the legacy DOM `keyCode` space.

use crate::NodeId;

/// An input event delivered by the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    /// Committed value change
    Change { target: NodeId },
    /// Focus left the control
    Blur { target: NodeId },
    /// Key pressed down
    KeyDown { target: NodeId, key: u32 },
    /// Key released
    KeyUp { target: NodeId, key: u32 },
    /// Pointer click anywhere in the document
    Click { target: NodeId },
    /// Form submission requested
    Submit { form: NodeId },
}

impl FormEvent {
    /// The node the event is addressed to
    pub fn target(&self) -> NodeId {
        match *self {
            Self::Change { target }
            | Self::Blur { target }
            | Self::KeyDown { target, .. }
            | Self::KeyUp { target, .. }
            | Self::Click { target } => target,
            Self::Submit { form } => form,
        }
    }
}
