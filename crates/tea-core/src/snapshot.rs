use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::vnode::VNode;

/// Structural description of a tree, comparable between a rendered `VNode`
/// and a live host tree. Attribute and handler order is not significant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        handlers: BTreeSet<String>,
        children: Vec<Snapshot>,
    },
    Text(String),
}

impl Snapshot {
    pub fn of<Msg>(node: &VNode<Msg>) -> Self {
        match node {
            VNode::Text(content) => Snapshot::Text(content.clone()),
            VNode::Element(element) => Snapshot::Element {
                tag: element.tag.clone(),
                attributes: element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect(),
                handlers: element.handlers.keys().cloned().collect(),
                children: element.children.iter().map(Snapshot::of).collect(),
            },
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Snapshot::Text(content) => writeln!(f, "{indent}{content:?}"),
            Snapshot::Element {
                tag,
                attributes,
                handlers,
                children,
            } => {
                write!(f, "{indent}<{tag}")?;
                for (name, value) in attributes {
                    write!(f, " {name}={value:?}")?;
                }
                for event in handlers {
                    write!(f, " on:{event}")?;
                }
                writeln!(f, ">")?;
                for child in children {
                    child.write(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl<Msg> From<&VNode<Msg>> for Snapshot {
    fn from(node: &VNode<Msg>) -> Self {
        Snapshot::of(node)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}
