//! Host document abstraction. The patcher is the only caller.

use std::fmt;
use std::rc::Rc;

use crate::vnode::{AttrValue, Event};

/// Callback registered with the host for one event on one node.
pub type EventCallback = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Missing { node: String },
    NotAnElement { node: String },
    NotAText { node: String },
    IndexOutOfBounds { index: usize, len: usize },
    Rejected { operation: &'static str, reason: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Missing { node } => write!(f, "node {node} missing"),
            HostError::NotAnElement { node } => write!(f, "node {node} is not an element"),
            HostError::NotAText { node } => write!(f, "node {node} is not a text node"),
            HostError::IndexOutOfBounds { index, len } => {
                write!(f, "child index {index} out of bounds (len {len})")
            }
            HostError::Rejected { operation, reason } => {
                write!(f, "host rejected {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for HostError {}

/// Mutation surface of a host document tree.
///
/// Child indices are positions in the parent's current child list.
/// `move_child` removes the child at `from` and reinserts it so that it ends
/// up at position `to`.
pub trait Document {
    type Node: Clone;
    type Listener;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, HostError>;
    fn create_text(&mut self, text: &str) -> Result<Self::Node, HostError>;
    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), HostError>;
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError>;
    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), HostError>;
    fn insert_child(
        &mut self,
        parent: &Self::Node,
        index: usize,
        child: &Self::Node,
    ) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: &Self::Node, index: usize) -> Result<(), HostError>;
    fn move_child(&mut self, parent: &Self::Node, from: usize, to: usize) -> Result<(), HostError>;
    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        callback: EventCallback,
    ) -> Result<Self::Listener, HostError>;
    fn remove_listener(
        &mut self,
        node: &Self::Node,
        listener: Self::Listener,
    ) -> Result<(), HostError>;
}
