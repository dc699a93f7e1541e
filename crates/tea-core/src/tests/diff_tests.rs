use super::*;
use crate::memory::MemoryDocument;
use crate::patcher::{LiveTree, Patcher};
use crate::runtime::RuntimeHandle;
use crate::snapshot::Snapshot;
use crate::vnode::Event;

#[derive(Clone, Debug, PartialEq)]
enum Msg {
    Increment,
    Decrement,
    Select(usize),
    Typed(String),
}

fn typed(value: String) -> Msg {
    Msg::Typed(value)
}

fn other_typed(value: String) -> Msg {
    Msg::Typed(value.to_uppercase())
}

fn keyed_list(keys: &[&str]) -> VNode<Msg> {
    VNode::element("ul")
        .children(keys.iter().map(|key| {
            VNode::element("li")
                .key(*key)
                .attr("class", "item")
                .child(*key)
        }))
        .into()
}

fn counter(value: i32) -> VNode<Msg> {
    VNode::element("div")
        .attr("id", "counter")
        .child(
            VNode::element("button")
                .on("click", Handler::Message(Msg::Decrement))
                .child("-"),
        )
        .child(VNode::element("span").child(value.to_string()))
        .child(
            VNode::element("button")
                .on("click", Handler::Message(Msg::Increment))
                .child("+"),
        )
        .into()
}

fn kinds(patches: &[Patch<Msg>]) -> Vec<PatchKind> {
    patches.iter().map(Patch::kind).collect()
}

/// Mounts `old`, applies `diff(old, new)` and returns the live snapshot.
fn apply_diff(old: &VNode<Msg>, new: &VNode<Msg>) -> Snapshot {
    let mut document = MemoryDocument::new();
    let container = document.create_container("main");
    let mut live = LiveTree::new(container);
    let handle = RuntimeHandle::detached();
    let patcher = Patcher::new(&handle);
    patcher
        .apply(&mut document, &mut live, mount(old))
        .expect("mount");
    patcher
        .apply(&mut document, &mut live, diff(old, new))
        .expect("apply diff");
    let root = document.children(container)[0];
    document.snapshot(root).expect("snapshot")
}

#[test]
fn identical_trees_produce_no_patches() {
    let trees = vec![
        counter(3),
        keyed_list(&["a", "b", "c"]),
        VNode::text("plain"),
        VNode::element("input")
            .on("input", Handler::Input(typed))
            .attr("value", "x")
            .attr("disabled", false)
            .into(),
    ];
    for tree in trees {
        assert!(diff(&tree, &tree.clone()).is_empty(), "{tree:?}");
    }
}

#[test]
fn text_change_updates_in_place() {
    let patches = diff(&counter(0), &counter(1));
    assert_eq!(kinds(&patches), vec![PatchKind::UpdateText]);
    match &patches[0] {
        Patch::UpdateText { path, text } => {
            assert_eq!(path.indices(), &[1, 0]);
            assert_eq!(text, "1");
        }
        other => panic!("unexpected patch {other:?}"),
    }
}

#[test]
fn different_tags_replace_without_descending() {
    let old: VNode<Msg> = VNode::element("div")
        .child(VNode::element("p").child("x"))
        .into();
    let new: VNode<Msg> = VNode::element("span")
        .child(VNode::element("p").child("y"))
        .into();
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::ReplaceNode]);
    assert!(patches[0].target().is_root());
}

#[test]
fn element_and_text_swap_is_a_replace() {
    let old: VNode<Msg> = VNode::element("div").child("text").into();
    let new: VNode<Msg> = VNode::element("div")
        .child(VNode::element("b").child("text"))
        .into();
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::ReplaceNode]);
    assert_eq!(patches[0].target().indices(), &[0]);
}

#[test]
fn attribute_changes_set_and_remove() {
    let old: VNode<Msg> = VNode::element("a")
        .attr("href", "/old")
        .attr("title", "t")
        .attr("tabindex", 1)
        .into();
    let new: VNode<Msg> = VNode::element("a")
        .attr("href", "/new")
        .attr("tabindex", 1)
        .attr("target", "_blank")
        .into();
    let patches = diff(&old, &new);
    assert_eq!(
        kinds(&patches),
        vec![
            PatchKind::SetAttribute,
            PatchKind::SetAttribute,
            PatchKind::RemoveAttribute
        ]
    );
    let names: Vec<&str> = patches
        .iter()
        .map(|patch| match patch {
            Patch::SetAttribute { name, .. } | Patch::RemoveAttribute { name, .. } => name.as_str(),
            other => panic!("unexpected patch {other:?}"),
        })
        .collect();
    assert_eq!(names, vec!["href", "target", "title"]);
}

#[test]
fn numeric_attributes_equal_themselves() {
    let node: VNode<Msg> = VNode::element("div")
        .attr("data-x", f64::NAN)
        .attr("data-y", -0.0)
        .into();
    assert!(diff(&node, &node.clone()).is_empty());

    let positive: VNode<Msg> = VNode::element("div").attr("data-y", 0.0).into();
    let negative: VNode<Msg> = VNode::element("div").attr("data-y", -0.0).into();
    assert_eq!(kinds(&diff(&positive, &negative)), vec![PatchKind::SetAttribute]);
}

#[test]
fn handlers_compare_structurally() {
    let with = |handler: Handler<Msg>| -> VNode<Msg> {
        VNode::element("button").on("click", handler).into()
    };

    let same = diff(
        &with(Handler::Message(Msg::Select(1))),
        &with(Handler::Message(Msg::Select(1))),
    );
    assert!(same.is_empty());

    let changed = diff(
        &with(Handler::Message(Msg::Select(1))),
        &with(Handler::Message(Msg::Select(2))),
    );
    assert_eq!(kinds(&changed), vec![PatchKind::AddHandler]);

    let same_fn = diff(&with(Handler::Input(typed)), &with(Handler::Input(typed)));
    assert!(same_fn.is_empty());

    let other_fn = diff(
        &with(Handler::Input(typed)),
        &with(Handler::Input(other_typed)),
    );
    assert_eq!(kinds(&other_fn), vec![PatchKind::AddHandler]);

    let keyed_a = Handler::keyed("row-1", |_: &Event| Some(Msg::Select(1)));
    let keyed_b = Handler::keyed("row-1", |_: &Event| Some(Msg::Select(99)));
    assert!(diff(&with(keyed_a), &with(keyed_b)).is_empty());

    let removed = diff(
        &with(Handler::Message(Msg::Increment)),
        &VNode::element("button").into(),
    );
    assert_eq!(kinds(&removed), vec![PatchKind::RemoveHandler]);
}

#[test]
fn keyed_rotation_is_a_single_move() {
    let old = keyed_list(&["k1", "k2", "k3"]);
    let new = keyed_list(&["k3", "k1", "k2"]);
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::MoveChildTo]);
    match &patches[0] {
        Patch::MoveChildTo { parent, from, to } => {
            assert!(parent.is_root());
            assert_eq!((*from, *to), (2, 0));
        }
        other => panic!("unexpected patch {other:?}"),
    }
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn keyed_reorders_never_rebuild_moved_children() {
    let old = keyed_list(&["a", "b", "c", "d", "e"]);
    let new = keyed_list(&["e", "d", "c", "b", "a"]);
    let stats = DiffStats::from_patches(&diff(&old, &new));
    assert_eq!(stats.replaced, 0);
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.moved, 4);
    assert_eq!(stats.total(), 4);
}

#[test]
fn moving_one_child_to_the_end_is_a_single_move() {
    let old = keyed_list(&["a", "b", "c", "d", "e"]);
    let new = keyed_list(&["b", "c", "d", "e", "a"]);
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::MoveChildTo]);
    match &patches[0] {
        Patch::MoveChildTo { from, to, .. } => assert_eq!((*from, *to), (0, 4)),
        other => panic!("unexpected patch {other:?}"),
    }
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn keyed_moves_only_touch_children_out_of_order() {
    let old = keyed_list(&["a", "b", "c", "d", "e", "f"]);
    let new = keyed_list(&["a", "e", "c", "d", "b", "f"]);
    let stats = DiffStats::from_patches(&diff(&old, &new));
    assert_eq!(stats.moved, 2);
    assert_eq!(stats.total(), 2);
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));

    let old = keyed_list(&["a", "b", "c", "d"]);
    let new = keyed_list(&["x", "d", "a", "y", "b"]);
    let patches = diff(&old, &new);
    let stats = DiffStats::from_patches(&patches);
    assert_eq!((stats.removed, stats.moved, stats.inserted), (1, 1, 2));
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn removing_a_keyed_child_touches_nothing_else() {
    let old = keyed_list(&["a", "b", "c"]);
    let new = keyed_list(&["a", "c"]);
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::RemoveChildAt]);
    match &patches[0] {
        Patch::RemoveChildAt { parent, index } => {
            assert!(parent.is_root());
            assert_eq!(*index, 1);
        }
        other => panic!("unexpected patch {other:?}"),
    }
}

#[test]
fn keyed_insert_and_update_are_addressed_by_final_index() {
    let old: VNode<Msg> = VNode::element("ul")
        .child(VNode::element("li").key("a").child("a"))
        .child(VNode::element("li").key("b").child("b"))
        .into();
    let new: VNode<Msg> = VNode::element("ul")
        .child(VNode::element("li").key("new").child("new"))
        .child(VNode::element("li").key("a").child("a"))
        .child(VNode::element("li").key("b").child("b!"))
        .into();
    let patches = diff(&old, &new);
    assert_eq!(
        kinds(&patches),
        vec![PatchKind::InsertChildAt, PatchKind::UpdateText]
    );
    assert_eq!(patches[1].target().indices(), &[2, 0]);
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn duplicate_keys_fall_back_to_positional() {
    let old = keyed_list(&["a", "a"]);
    let new = keyed_list(&["a", "a", "b"]);
    let patches = diff(&old, &new);
    assert_eq!(kinds(&patches), vec![PatchKind::InsertChildAt]);
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn mixed_keyed_and_unkeyed_children() {
    let old: VNode<Msg> = VNode::element("div")
        .child(VNode::element("h1").child("title"))
        .child(VNode::element("p").key("x").child("x"))
        .child(VNode::element("p").key("y").child("y"))
        .into();
    let new: VNode<Msg> = VNode::element("div")
        .child(VNode::element("p").key("y").child("y"))
        .child(VNode::element("h1").child("title"))
        .child(VNode::element("p").key("x").child("x"))
        .into();
    let stats = DiffStats::from_patches(&diff(&old, &new));
    assert_eq!(stats.replaced, 0);
    assert_eq!(apply_diff(&old, &new), Snapshot::of(&new));
}

#[test]
fn positional_lists_grow_and_shrink_at_the_tail() {
    let list = |items: &[&str]| -> VNode<Msg> {
        VNode::element("ol")
            .children(items.iter().map(|item| VNode::element("li").child(*item)))
            .into()
    };

    let grown = diff(&list(&["a"]), &list(&["a", "b", "c"]));
    assert_eq!(
        kinds(&grown),
        vec![PatchKind::InsertChildAt, PatchKind::InsertChildAt]
    );

    let shrunk = diff(&list(&["a", "b", "c"]), &list(&["a"]));
    let indices: Vec<usize> = shrunk
        .iter()
        .map(|patch| match patch {
            Patch::RemoveChildAt { index, .. } => *index,
            other => panic!("unexpected patch {other:?}"),
        })
        .collect();
    assert_eq!(indices, vec![2, 1]);

    // Positional diffing cannot see the reorder; it rewrites text instead.
    let reordered = diff(&list(&["a", "b"]), &list(&["b", "a"]));
    assert_eq!(
        kinds(&reordered),
        vec![PatchKind::UpdateText, PatchKind::UpdateText]
    );

    let emptied = diff(&list(&["a", "b"]), &list(&[]));
    assert_eq!(DiffStats::from_patches(&emptied).removed, 2);
    let filled = diff(&list(&[]), &list(&["a", "b"]));
    assert_eq!(DiffStats::from_patches(&filled).inserted, 2);
}

#[test]
fn round_trip_reaches_the_new_tree() {
    let cases: Vec<(VNode<Msg>, VNode<Msg>)> = vec![
        (counter(0), counter(-1)),
        (keyed_list(&["a", "b", "c", "d"]), keyed_list(&["d", "x", "b"])),
        (keyed_list(&[]), keyed_list(&["only"])),
        (keyed_list(&["a", "b"]), keyed_list(&[])),
        (counter(2), keyed_list(&["a"])),
        (
            VNode::element("form")
                .attr("class", "a")
                .child(VNode::element("input").on("input", Handler::Input(typed)))
                .into(),
            VNode::element("form")
                .attr("id", "f")
                .child(VNode::element("input").attr("value", "v"))
                .child("trailing")
                .into(),
        ),
    ];
    for (old, new) in cases {
        assert_eq!(apply_diff(&old, &new), Snapshot::of(&new), "{old:?} -> {new:?}");
    }
}

#[test]
fn stats_display_summarises_counts() {
    let stats = DiffStats::from_patches(&diff(&keyed_list(&["a", "b"]), &keyed_list(&["b"])));
    assert_eq!(stats.count(PatchKind::RemoveChildAt), 1);
    assert!(stats.to_string().starts_with("1 patches"));
}
