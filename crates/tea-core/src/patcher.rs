//! Applies patch lists to the live host tree.

use indexmap::IndexMap;

use crate::document::{Document, HostError};
use crate::patch::{NodePath, Patch};
use crate::runtime::RuntimeHandle;
use crate::vnode::VNode;

/// Host-side counterpart of one rendered node.
pub struct LiveNode<D: Document> {
    handle: D::Node,
    text: bool,
    listeners: IndexMap<String, D::Listener>,
    children: Vec<LiveNode<D>>,
}

impl<D: Document> LiveNode<D> {
    pub fn handle(&self) -> &D::Node {
        &self.handle
    }

    pub fn is_text(&self) -> bool {
        self.text
    }

    pub fn children(&self) -> &[LiveNode<D>] {
        &self.children
    }

    pub fn has_listener(&self, event: &str) -> bool {
        self.listeners.contains_key(event)
    }
}

/// The mount container plus the live nodes mounted below it.
pub struct LiveTree<D: Document> {
    container: D::Node,
    root: Option<LiveNode<D>>,
}

impl<D: Document> LiveTree<D> {
    pub fn new(container: D::Node) -> Self {
        Self {
            container,
            root: None,
        }
    }

    pub fn container(&self) -> &D::Node {
        &self.container
    }

    pub fn root(&self) -> Option<&LiveNode<D>> {
        self.root.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    pub fn node(&self, path: &NodePath) -> Option<&LiveNode<D>> {
        let mut node = self.root.as_ref()?;
        for &index in path.indices() {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Detaches every listener and removes the root from the container.
    pub fn unmount(&mut self, document: &mut D) -> Result<(), HostError> {
        if let Some(root) = self.root.take() {
            detach_listeners(document, root)?;
            document.remove_child(&self.container, 0)?;
        }
        Ok(())
    }

    fn resolve_mut(&mut self, path: &NodePath) -> &mut LiveNode<D> {
        let mut node = match self.root.as_mut() {
            Some(root) => root,
            None => panic!("patch targets {path} but nothing is mounted"),
        };
        for &index in path.indices() {
            let len = node.children.len();
            node = match node.children.get_mut(index) {
                Some(child) => child,
                None => panic!("patch path {path} does not resolve: child {index} of {len}"),
            };
        }
        node
    }
}

/// Applies `patches` in order, registering listeners that feed `dispatcher`.
pub fn apply<D, Msg>(
    document: &mut D,
    live: &mut LiveTree<D>,
    patches: Vec<Patch<Msg>>,
    dispatcher: &RuntimeHandle<Msg>,
) -> Result<(), HostError>
where
    D: Document,
    Msg: Clone + 'static,
{
    Patcher::new(dispatcher).apply(document, live, patches)
}

pub struct Patcher<'a, Msg: 'static> {
    dispatcher: &'a RuntimeHandle<Msg>,
    trace: bool,
}

impl<'a, Msg: Clone + 'static> Patcher<'a, Msg> {
    pub fn new(dispatcher: &'a RuntimeHandle<Msg>) -> Self {
        Self {
            dispatcher,
            trace: false,
        }
    }

    /// Log every patch at trace level as it is applied.
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Host failures abort the remaining patches and are returned. A patch
    /// that does not fit the live tree is a differ bug and panics.
    pub fn apply<D: Document>(
        &self,
        document: &mut D,
        live: &mut LiveTree<D>,
        patches: Vec<Patch<Msg>>,
    ) -> Result<(), HostError> {
        for patch in patches {
            if self.trace {
                log::trace!("apply {patch:?}");
            }
            self.apply_one(document, live, patch)?;
        }
        Ok(())
    }

    fn apply_one<D: Document>(
        &self,
        document: &mut D,
        live: &mut LiveTree<D>,
        patch: Patch<Msg>,
    ) -> Result<(), HostError> {
        match patch {
            Patch::ReplaceNode { path, node } => {
                let replacement = self.build(document, &node)?;
                match path.split_last() {
                    None => {
                        if let Some(previous) = live.root.take() {
                            detach_listeners(document, previous)?;
                            document.remove_child(&live.container, 0)?;
                        }
                        document.insert_child(&live.container, 0, &replacement.handle)?;
                        live.root = Some(replacement);
                    }
                    Some((parent_path, index)) => {
                        let parent = live.resolve_mut(&parent_path);
                        assert!(
                            index < parent.children.len(),
                            "replace at {path} out of range ({} children)",
                            parent.children.len()
                        );
                        let previous = std::mem::replace(&mut parent.children[index], replacement);
                        detach_listeners(document, previous)?;
                        document.remove_child(&parent.handle, index)?;
                        document.insert_child(&parent.handle, index, &parent.children[index].handle)?;
                    }
                }
            }
            Patch::UpdateText { path, text } => {
                let node = live.resolve_mut(&path);
                assert!(node.text, "text update at {path} targets an element");
                document.set_text(&node.handle, &text)?;
            }
            Patch::SetAttribute { path, name, value } => {
                let node = live.resolve_mut(&path);
                assert!(!node.text, "attribute {name} set on text node at {path}");
                document.set_attribute(&node.handle, &name, &value)?;
            }
            Patch::RemoveAttribute { path, name } => {
                let node = live.resolve_mut(&path);
                assert!(!node.text, "attribute {name} removed from text node at {path}");
                document.remove_attribute(&node.handle, &name)?;
            }
            Patch::AddHandler {
                path,
                event,
                handler,
            } => {
                let node = live.resolve_mut(&path);
                assert!(!node.text, "handler {event} added to text node at {path}");
                if let Some(stale) = node.listeners.shift_remove(&event) {
                    document.remove_listener(&node.handle, stale)?;
                }
                let listener =
                    document.add_listener(&node.handle, &event, self.dispatcher.callback(handler))?;
                node.listeners.insert(event, listener);
            }
            Patch::RemoveHandler { path, event } => {
                let node = live.resolve_mut(&path);
                let listener = match node.listeners.shift_remove(&event) {
                    Some(listener) => listener,
                    None => panic!("no {event} listener registered at {path}"),
                };
                document.remove_listener(&node.handle, listener)?;
            }
            Patch::InsertChildAt {
                parent,
                index,
                node,
            } => {
                let child = self.build(document, &node)?;
                let target = live.resolve_mut(&parent);
                assert!(
                    index <= target.children.len(),
                    "insert at {parent}[{index}] out of range ({} children)",
                    target.children.len()
                );
                document.insert_child(&target.handle, index, &child.handle)?;
                target.children.insert(index, child);
            }
            Patch::RemoveChildAt { parent, index } => {
                let target = live.resolve_mut(&parent);
                assert!(
                    index < target.children.len(),
                    "remove at {parent}[{index}] out of range ({} children)",
                    target.children.len()
                );
                let removed = target.children.remove(index);
                detach_listeners(document, removed)?;
                document.remove_child(&target.handle, index)?;
            }
            Patch::MoveChildTo { parent, from, to } => {
                let target = live.resolve_mut(&parent);
                let len = target.children.len();
                assert!(
                    from < len && to < len,
                    "move {from} -> {to} under {parent} out of range ({len} children)"
                );
                document.move_child(&target.handle, from, to)?;
                let moved = target.children.remove(from);
                target.children.insert(to, moved);
            }
        }
        Ok(())
    }

    fn build<D: Document>(&self, document: &mut D, node: &VNode<Msg>) -> Result<LiveNode<D>, HostError> {
        match node {
            VNode::Text(content) => Ok(LiveNode {
                handle: document.create_text(content)?,
                text: true,
                listeners: IndexMap::new(),
                children: Vec::new(),
            }),
            VNode::Element(element) => {
                let handle = document.create_element(&element.tag)?;
                for (name, value) in &element.attributes {
                    document.set_attribute(&handle, name, value)?;
                }
                let mut listeners = IndexMap::with_capacity(element.handlers.len());
                for (event, handler) in &element.handlers {
                    let callback = self.dispatcher.callback(handler.clone());
                    listeners.insert(event.clone(), document.add_listener(&handle, event, callback)?);
                }
                let mut children = Vec::with_capacity(element.children.len());
                for (index, child) in element.children.iter().enumerate() {
                    let live_child = self.build(document, child)?;
                    document.insert_child(&handle, index, &live_child.handle)?;
                    children.push(live_child);
                }
                Ok(LiveNode {
                    handle,
                    text: false,
                    listeners,
                    children,
                })
            }
        }
    }
}

fn detach_listeners<D: Document>(document: &mut D, node: LiveNode<D>) -> Result<(), HostError> {
    for (_, listener) in node.listeners {
        document.remove_listener(&node.handle, listener)?;
    }
    for child in node.children {
        detach_listeners(document, child)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/patcher_tests.rs"]
mod tests;
