//! Tree differ: computes the patch list turning one rendered tree into the next.
//!
//! Element nodes are matched by tag (and key, when present). Child lists that
//! carry at least one key are reconciled by identity so reordering yields
//! moves instead of rebuilds; unkeyed lists are compared position by position,
//! which can misattribute identity when the application reorders them.

use std::fmt;

use indexmap::IndexMap;

use crate::collections::map::{HashMap, HashSet};
use crate::patch::{NodePath, Patch, PatchKind};
use crate::vnode::{AttrValue, Element, Handler, VNode};

/// Computes the patches that turn `old` into `new`.
///
/// Patches must be applied in the returned order. Diffing a tree against
/// itself yields no patches.
pub fn diff<Msg: Clone + PartialEq>(old: &VNode<Msg>, new: &VNode<Msg>) -> Vec<Patch<Msg>> {
    let mut patches = Vec::new();
    diff_node(old, new, &NodePath::root(), &mut patches);
    patches
}

/// Patches for the first render, when no previous tree exists: the whole tree
/// is created under the mount point.
pub fn mount<Msg: Clone>(new: &VNode<Msg>) -> Vec<Patch<Msg>> {
    vec![Patch::ReplaceNode {
        path: NodePath::root(),
        node: new.clone(),
    }]
}

fn diff_node<Msg: Clone + PartialEq>(
    old: &VNode<Msg>,
    new: &VNode<Msg>,
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    match (old, new) {
        (VNode::Text(before), VNode::Text(after)) => {
            if before != after {
                patches.push(Patch::UpdateText {
                    path: path.clone(),
                    text: after.clone(),
                });
            }
        }
        (VNode::Element(before), VNode::Element(after))
            if before.tag == after.tag && before.key == after.key =>
        {
            diff_element(before, after, path, patches);
        }
        // Replacing rebuilds the whole subtree; descendants are not diffed.
        _ => patches.push(Patch::ReplaceNode {
            path: path.clone(),
            node: new.clone(),
        }),
    }
}

fn diff_element<Msg: Clone + PartialEq>(
    old: &Element<Msg>,
    new: &Element<Msg>,
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    diff_attributes(&old.attributes, &new.attributes, path, patches);
    diff_handlers(&old.handlers, &new.handlers, path, patches);
    diff_children(&old.children, &new.children, path, patches);
}

fn diff_attributes<Msg>(
    old: &IndexMap<String, AttrValue>,
    new: &IndexMap<String, AttrValue>,
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    for (name, value) in new {
        if old.get(name) != Some(value) {
            patches.push(Patch::SetAttribute {
                path: path.clone(),
                name: name.clone(),
                value: value.clone(),
            });
        }
    }
    for name in old.keys() {
        if !new.contains_key(name) {
            patches.push(Patch::RemoveAttribute {
                path: path.clone(),
                name: name.clone(),
            });
        }
    }
}

fn diff_handlers<Msg: Clone + PartialEq>(
    old: &IndexMap<String, Handler<Msg>>,
    new: &IndexMap<String, Handler<Msg>>,
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    for (event, handler) in new {
        if old.get(event) != Some(handler) {
            patches.push(Patch::AddHandler {
                path: path.clone(),
                event: event.clone(),
                handler: handler.clone(),
            });
        }
    }
    for event in old.keys() {
        if !new.contains_key(event) {
            patches.push(Patch::RemoveHandler {
                path: path.clone(),
                event: event.clone(),
            });
        }
    }
}

fn diff_children<Msg: Clone + PartialEq>(
    old: &[VNode<Msg>],
    new: &[VNode<Msg>],
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    if old.is_empty() && new.is_empty() {
        return;
    }
    let keyed = old.iter().chain(new).any(|child| child.key().is_some());
    if keyed {
        match (identities(old), identities(new)) {
            (Some(old_ids), Some(new_ids)) => {
                diff_keyed(old, new, &old_ids, &new_ids, path, patches);
                return;
            }
            _ => log::warn!("duplicate child keys under {path}; falling back to positional diff"),
        }
    }
    diff_positional(old, new, path, patches);
}

/// Identity of a child within its sibling list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Identity<'a> {
    Key(&'a str),
    /// Ordinal among the unkeyed siblings.
    Unkeyed(usize),
}

fn identities<Msg>(children: &[VNode<Msg>]) -> Option<Vec<Identity<'_>>> {
    let mut seen: HashSet<&str> = HashSet::default();
    let mut unkeyed = 0;
    let mut ids = Vec::with_capacity(children.len());
    for child in children {
        let id = match child.key() {
            Some(key) => {
                if !seen.insert(key) {
                    return None;
                }
                Identity::Key(key)
            }
            None => {
                unkeyed += 1;
                Identity::Unkeyed(unkeyed - 1)
            }
        };
        ids.push(id);
    }
    Some(ids)
}

fn diff_keyed<Msg: Clone + PartialEq>(
    old: &[VNode<Msg>],
    new: &[VNode<Msg>],
    old_ids: &[Identity<'_>],
    new_ids: &[Identity<'_>],
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    let wanted: HashSet<Identity<'_>> = new_ids.iter().copied().collect();
    let mut source: HashMap<Identity<'_>, usize> = HashMap::default();
    for (index, id) in old_ids.iter().enumerate() {
        source.insert(*id, index);
    }

    // Mirror of the live child list, updated as each patch is emitted so that
    // every index is valid at the moment the patch is applied.
    let mut live: Vec<Identity<'_>> = old_ids.to_vec();

    let mut index = 0;
    while index < live.len() {
        if wanted.contains(&live[index]) {
            index += 1;
        } else {
            patches.push(Patch::RemoveChildAt {
                parent: path.clone(),
                index,
            });
            live.remove(index);
        }
    }

    let survivors: HashMap<Identity<'_>, usize> = live
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();
    let order: Vec<Option<usize>> = new_ids.iter().map(|id| survivors.get(id).copied()).collect();
    let stable = longest_increasing(&order);

    // Each child is placed right after the previously placed sibling. Children
    // on the longest increasing run of surviving positions never move.
    let mut slot = 0;
    for (target, id) in new_ids.iter().enumerate() {
        let Some(from) = live.iter().position(|candidate| candidate == id) else {
            patches.push(Patch::InsertChildAt {
                parent: path.clone(),
                index: slot,
                node: new[target].clone(),
            });
            live.insert(slot, *id);
            slot += 1;
            continue;
        };
        if stable[target] || from == slot {
            slot = from + 1;
            continue;
        }
        let to = if from > slot { slot } else { slot - 1 };
        patches.push(Patch::MoveChildTo {
            parent: path.clone(),
            from,
            to,
        });
        let moved = live.remove(from);
        live.insert(to, moved);
        slot = to + 1;
    }
    debug_assert_eq!(live, new_ids);

    for (target, id) in new_ids.iter().enumerate() {
        if let Some(&from) = source.get(id) {
            diff_node(&old[from], &new[target], &path.child(target), patches);
        }
    }
}

/// Marks the entries of `order` forming its longest strictly increasing
/// subsequence. `None` entries never belong to it.
fn longest_increasing(order: &[Option<usize>]) -> Vec<bool> {
    // (value, position in `order`) of the smallest tail for each run length.
    let mut tails: Vec<(usize, usize)> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; order.len()];
    for (position, value) in order.iter().enumerate() {
        let Some(value) = *value else {
            continue;
        };
        let length = tails.partition_point(|&(tail, _)| tail < value);
        previous[position] = length.checked_sub(1).map(|before| tails[before].1);
        if length == tails.len() {
            tails.push((value, position));
        } else {
            tails[length] = (value, position);
        }
    }
    let mut marked = vec![false; order.len()];
    let mut cursor = tails.last().map(|&(_, position)| position);
    while let Some(position) = cursor {
        marked[position] = true;
        cursor = previous[position];
    }
    marked
}

fn diff_positional<Msg: Clone + PartialEq>(
    old: &[VNode<Msg>],
    new: &[VNode<Msg>],
    path: &NodePath,
    patches: &mut Vec<Patch<Msg>>,
) {
    if new.len() > old.len() {
        for (index, node) in new.iter().enumerate().skip(old.len()) {
            patches.push(Patch::InsertChildAt {
                parent: path.clone(),
                index,
                node: node.clone(),
            });
        }
    } else {
        for index in (new.len()..old.len()).rev() {
            patches.push(Patch::RemoveChildAt {
                parent: path.clone(),
                index,
            });
        }
    }
    for (index, (before, after)) in old.iter().zip(new).enumerate() {
        diff_node(before, after, &path.child(index), patches);
    }
}

/// Patch counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub replaced: usize,
    pub text_updates: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    pub handlers_added: usize,
    pub handlers_removed: usize,
    pub inserted: usize,
    pub removed: usize,
    pub moved: usize,
}

impl DiffStats {
    pub fn from_patches<Msg>(patches: &[Patch<Msg>]) -> Self {
        let mut stats = Self::default();
        for patch in patches {
            *stats.slot(patch.kind()) += 1;
        }
        stats
    }

    pub fn count(&self, kind: PatchKind) -> usize {
        match kind {
            PatchKind::ReplaceNode => self.replaced,
            PatchKind::UpdateText => self.text_updates,
            PatchKind::SetAttribute => self.attributes_set,
            PatchKind::RemoveAttribute => self.attributes_removed,
            PatchKind::AddHandler => self.handlers_added,
            PatchKind::RemoveHandler => self.handlers_removed,
            PatchKind::InsertChildAt => self.inserted,
            PatchKind::RemoveChildAt => self.removed,
            PatchKind::MoveChildTo => self.moved,
        }
    }

    pub fn total(&self) -> usize {
        self.replaced
            + self.text_updates
            + self.attributes_set
            + self.attributes_removed
            + self.handlers_added
            + self.handlers_removed
            + self.inserted
            + self.removed
            + self.moved
    }

    fn slot(&mut self, kind: PatchKind) -> &mut usize {
        match kind {
            PatchKind::ReplaceNode => &mut self.replaced,
            PatchKind::UpdateText => &mut self.text_updates,
            PatchKind::SetAttribute => &mut self.attributes_set,
            PatchKind::RemoveAttribute => &mut self.attributes_removed,
            PatchKind::AddHandler => &mut self.handlers_added,
            PatchKind::RemoveHandler => &mut self.handlers_removed,
            PatchKind::InsertChildAt => &mut self.inserted,
            PatchKind::RemoveChildAt => &mut self.removed,
            PatchKind::MoveChildTo => &mut self.moved,
        }
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} patches (replace {}, text {}, attr +{}/-{}, handler +{}/-{}, insert {}, remove {}, move {})",
            self.total(),
            self.replaced,
            self.text_updates,
            self.attributes_set,
            self.attributes_removed,
            self.handlers_added,
            self.handlers_removed,
            self.inserted,
            self.removed,
            self.moved,
        )
    }
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
