//! In-memory host document used by headless shells and tests.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::collections::map::HashSet;
use crate::document::{Document, EventCallback, HostError};
use crate::snapshot::Snapshot;
use crate::vnode::AttrValue;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct RegisteredListener {
    id: ListenerId,
    event: String,
    callback: EventCallback,
}

enum MemoryNodeKind {
    Element {
        tag: String,
        attributes: IndexMap<String, AttrValue>,
        listeners: Vec<RegisteredListener>,
    },
    Text(String),
}

struct MemoryNode {
    kind: MemoryNodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
pub struct MemoryDocument {
    nodes: Vec<Option<MemoryNode>>,
    next_listener: u64,
    rejected_tags: HashSet<String>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to mount a program into.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.push(MemoryNodeKind::Element {
            tag: tag.to_owned(),
            attributes: IndexMap::new(),
            listeners: Vec::new(),
        })
    }

    /// Makes `create_element` fail for `tag`, the way a sandboxed host
    /// refuses some elements.
    pub fn reject_tag(&mut self, tag: &str) {
        self.rejected_tags.insert(tag.to_owned());
    }

    /// Number of live nodes, including detached containers.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.kind {
            MemoryNodeKind::Element { tag, .. } => Some(tag),
            MemoryNodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.kind {
            MemoryNodeKind::Text(content) => Some(content),
            MemoryNodeKind::Element { .. } => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        match &self.node(id).ok()?.kind {
            MemoryNodeKind::Element { attributes, .. } => attributes.get(name),
            MemoryNodeKind::Text(_) => None,
        }
    }

    /// Most recently registered callback for `event` on `id`.
    pub fn listener(&self, id: NodeId, event: &str) -> Option<EventCallback> {
        match &self.node(id).ok()?.kind {
            MemoryNodeKind::Element { listeners, .. } => listeners
                .iter()
                .rev()
                .find(|listener| listener.event == event)
                .map(|listener| listener.callback.clone()),
            MemoryNodeKind::Text(_) => None,
        }
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        match self.node(id).map(|node| &node.kind) {
            Ok(MemoryNodeKind::Element { listeners, .. }) => listeners.len(),
            _ => 0,
        }
    }

    /// Listeners registered across the whole document.
    pub fn total_listeners(&self) -> usize {
        (0..self.nodes.len()).map(|id| self.listener_count(id)).sum()
    }

    /// Depth-first search below (and including) `root`.
    pub fn find(&self, root: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            if predicate(self, id) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }

    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find(root, |doc, id| doc.tag(id) == Some(tag))
    }

    /// First element whose direct text children read `text`.
    pub fn find_by_text(&self, root: NodeId, text: &str) -> Option<NodeId> {
        self.find(root, |doc, id| {
            doc.tag(id).is_some() && {
                let own: String = doc
                    .children(id)
                    .iter()
                    .filter_map(|child| doc.text(*child))
                    .collect();
                own == text
            }
        })
    }

    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.find(root, |doc, id| {
            doc.attribute(id, name)
                .map(|attr| attr.to_string() == value)
                .unwrap_or(false)
        })
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(content) = self.text(id) {
            out.push_str(content);
            return;
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    pub fn snapshot(&self, id: NodeId) -> Option<Snapshot> {
        let node = self.node(id).ok()?;
        Some(match &node.kind {
            MemoryNodeKind::Text(content) => Snapshot::Text(content.clone()),
            MemoryNodeKind::Element {
                tag,
                attributes,
                listeners,
            } => Snapshot::Element {
                tag: tag.clone(),
                attributes: attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect::<BTreeMap<_, _>>(),
                handlers: listeners
                    .iter()
                    .map(|listener| listener.event.clone())
                    .collect(),
                children: node
                    .children
                    .iter()
                    .filter_map(|child| self.snapshot(*child))
                    .collect(),
            },
        })
    }

    pub fn dump_tree(&self, root: Option<NodeId>) -> String {
        let mut output = String::new();
        if let Some(root_id) = root {
            self.dump_node(&mut output, root_id, 0);
        } else {
            output.push_str("(no root)\n");
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id).map(|node| &node.kind) {
            Ok(MemoryNodeKind::Element {
                tag,
                attributes,
                listeners,
            }) => {
                output.push_str(&format!("{indent}[{id}] <{tag}"));
                for (name, value) in attributes {
                    output.push_str(&format!(" {name}={:?}", value.to_string()));
                }
                for listener in listeners {
                    output.push_str(&format!(" on:{}", listener.event));
                }
                output.push_str(">\n");
                for &child in self.children(id) {
                    self.dump_node(output, child, depth + 1);
                }
            }
            Ok(MemoryNodeKind::Text(content)) => {
                output.push_str(&format!("{indent}[{id}] {content:?}\n"));
            }
            Err(_) => output.push_str(&format!("{indent}[{id}] (missing)\n")),
        }
    }

    fn push(&mut self, kind: MemoryNodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn node(&self, id: NodeId) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(HostError::Missing {
                node: id.to_string(),
            })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing {
                node: id.to_string(),
            })
    }

    fn element_mut(
        &mut self,
        id: NodeId,
    ) -> Result<(&mut IndexMap<String, AttrValue>, &mut Vec<RegisteredListener>), HostError> {
        match &mut self.node_mut(id)?.kind {
            MemoryNodeKind::Element {
                attributes,
                listeners,
                ..
            } => Ok((attributes, listeners)),
            MemoryNodeKind::Text(_) => Err(HostError::NotAnElement {
                node: id.to_string(),
            }),
        }
    }

    /// Frees `id` and everything below it.
    fn release(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id).and_then(Option::take) {
            Some(node) => node.children,
            None => return,
        };
        for child in children {
            self.release(child);
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;
    type Listener = ListenerId;

    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
        if self.rejected_tags.contains(tag) {
            return Err(HostError::Rejected {
                operation: "create_element",
                reason: format!("<{tag}> is not allowed"),
            });
        }
        Ok(self.create_container(tag))
    }

    fn create_text(&mut self, text: &str) -> Result<NodeId, HostError> {
        Ok(self.push(MemoryNodeKind::Text(text.to_owned())))
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> Result<(), HostError> {
        match &mut self.node_mut(*node)?.kind {
            MemoryNodeKind::Text(content) => {
                content.clear();
                content.push_str(text);
                Ok(())
            }
            MemoryNodeKind::Element { .. } => Err(HostError::NotAText {
                node: node.to_string(),
            }),
        }
    }

    fn set_attribute(
        &mut self,
        node: &NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(*node)?;
        attributes.insert(name.to_owned(), value.clone());
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(*node)?;
        attributes.shift_remove(name);
        Ok(())
    }

    fn insert_child(&mut self, parent: &NodeId, index: usize, child: &NodeId) -> Result<(), HostError> {
        self.node(*child)?;
        let siblings = &mut self.node_mut(*parent)?.children;
        if index > siblings.len() {
            return Err(HostError::IndexOutOfBounds {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, *child);
        self.node_mut(*child)?.parent = Some(*parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, index: usize) -> Result<(), HostError> {
        let siblings = &mut self.node_mut(*parent)?.children;
        if index >= siblings.len() {
            return Err(HostError::IndexOutOfBounds {
                index,
                len: siblings.len(),
            });
        }
        let child = siblings.remove(index);
        self.release(child);
        Ok(())
    }

    fn move_child(&mut self, parent: &NodeId, from: usize, to: usize) -> Result<(), HostError> {
        let siblings = &mut self.node_mut(*parent)?.children;
        let len = siblings.len();
        if from >= len || to >= len {
            return Err(HostError::IndexOutOfBounds {
                index: from.max(to),
                len,
            });
        }
        let child = siblings.remove(from);
        siblings.insert(to, child);
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        callback: EventCallback,
    ) -> Result<ListenerId, HostError> {
        let id = ListenerId(self.next_listener);
        let (_, listeners) = self.element_mut(*node)?;
        listeners.push(RegisteredListener {
            id,
            event: event.to_owned(),
            callback,
        });
        self.next_listener += 1;
        Ok(id)
    }

    fn remove_listener(&mut self, node: &NodeId, listener: ListenerId) -> Result<(), HostError> {
        let (_, listeners) = self.element_mut(*node)?;
        listeners.retain(|registered| registered.id != listener);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
