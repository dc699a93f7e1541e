//! Mutation instructions produced by the differ and consumed by the patcher.

use std::fmt;

use crate::vnode::{AttrValue, Handler, VNode};

/// Child-index path from the root of the rendered tree. The empty path is the
/// root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Splits into the parent path and the index within the parent.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (position, index) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// Single mutation of the live tree.
///
/// Structural patches (`InsertChildAt`, `RemoveChildAt`, `MoveChildTo`) carry
/// the parent path and indices valid at the moment the patch is applied, so a
/// patch list must be applied front to back.
pub enum Patch<Msg> {
    ReplaceNode { path: NodePath, node: VNode<Msg> },
    UpdateText { path: NodePath, text: String },
    SetAttribute { path: NodePath, name: String, value: AttrValue },
    RemoveAttribute { path: NodePath, name: String },
    AddHandler { path: NodePath, event: String, handler: Handler<Msg> },
    RemoveHandler { path: NodePath, event: String },
    InsertChildAt { parent: NodePath, index: usize, node: VNode<Msg> },
    RemoveChildAt { parent: NodePath, index: usize },
    MoveChildTo { parent: NodePath, from: usize, to: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatchKind {
    ReplaceNode,
    UpdateText,
    SetAttribute,
    RemoveAttribute,
    AddHandler,
    RemoveHandler,
    InsertChildAt,
    RemoveChildAt,
    MoveChildTo,
}

impl<Msg> Patch<Msg> {
    pub fn kind(&self) -> PatchKind {
        match self {
            Patch::ReplaceNode { .. } => PatchKind::ReplaceNode,
            Patch::UpdateText { .. } => PatchKind::UpdateText,
            Patch::SetAttribute { .. } => PatchKind::SetAttribute,
            Patch::RemoveAttribute { .. } => PatchKind::RemoveAttribute,
            Patch::AddHandler { .. } => PatchKind::AddHandler,
            Patch::RemoveHandler { .. } => PatchKind::RemoveHandler,
            Patch::InsertChildAt { .. } => PatchKind::InsertChildAt,
            Patch::RemoveChildAt { .. } => PatchKind::RemoveChildAt,
            Patch::MoveChildTo { .. } => PatchKind::MoveChildTo,
        }
    }

    /// Path of the node the patch mutates. For structural patches this is
    /// the parent whose child list changes.
    pub fn target(&self) -> &NodePath {
        match self {
            Patch::ReplaceNode { path, .. }
            | Patch::UpdateText { path, .. }
            | Patch::SetAttribute { path, .. }
            | Patch::RemoveAttribute { path, .. }
            | Patch::AddHandler { path, .. }
            | Patch::RemoveHandler { path, .. } => path,
            Patch::InsertChildAt { parent, .. }
            | Patch::RemoveChildAt { parent, .. }
            | Patch::MoveChildTo { parent, .. } => parent,
        }
    }
}

impl<Msg> fmt::Debug for Patch<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::ReplaceNode { path, node } => f
                .debug_struct("ReplaceNode")
                .field("path", &format_args!("{path}"))
                .field("tag", &node.tag().unwrap_or("#text"))
                .finish(),
            Patch::UpdateText { path, text } => f
                .debug_struct("UpdateText")
                .field("path", &format_args!("{path}"))
                .field("text", text)
                .finish(),
            Patch::SetAttribute { path, name, value } => f
                .debug_struct("SetAttribute")
                .field("path", &format_args!("{path}"))
                .field("name", name)
                .field("value", value)
                .finish(),
            Patch::RemoveAttribute { path, name } => f
                .debug_struct("RemoveAttribute")
                .field("path", &format_args!("{path}"))
                .field("name", name)
                .finish(),
            Patch::AddHandler { path, event, .. } => f
                .debug_struct("AddHandler")
                .field("path", &format_args!("{path}"))
                .field("event", event)
                .finish(),
            Patch::RemoveHandler { path, event } => f
                .debug_struct("RemoveHandler")
                .field("path", &format_args!("{path}"))
                .field("event", event)
                .finish(),
            Patch::InsertChildAt {
                parent,
                index,
                node,
            } => f
                .debug_struct("InsertChildAt")
                .field("parent", &format_args!("{parent}"))
                .field("index", index)
                .field("tag", &node.tag().unwrap_or("#text"))
                .finish(),
            Patch::RemoveChildAt { parent, index } => f
                .debug_struct("RemoveChildAt")
                .field("parent", &format_args!("{parent}"))
                .field("index", index)
                .finish(),
            Patch::MoveChildTo { parent, from, to } => f
                .debug_struct("MoveChildTo")
                .field("parent", &format_args!("{parent}"))
                .field("from", from)
                .field("to", to)
                .finish(),
        }
    }
}
