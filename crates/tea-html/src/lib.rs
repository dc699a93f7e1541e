//! Thin view-builder layer: HTML tag constructors plus attribute and event
//! helpers producing `tea_core` view trees.

pub mod attributes;
mod elements;
pub mod events;

pub use attributes::Attributes;
pub use elements::*;
pub use events::Events;
pub use tea_core::{AttrValue, Element, Event, Handler, VNode};

/// Text node.
pub fn text<Msg>(content: impl Into<String>) -> VNode<Msg> {
    VNode::text(content)
}

/// Element with an arbitrary tag name.
pub fn node<Msg>(tag: &str) -> Element<Msg> {
    Element::new(tag)
}

pub mod prelude {
    pub use crate::attributes::Attributes;
    pub use crate::elements::*;
    pub use crate::events::Events;
    pub use crate::{node, text};
    pub use tea_core::{Command, Element, Event, Handler, VNode};
}

#[cfg(test)]
#[path = "tests/html_tests.rs"]
mod tests;
