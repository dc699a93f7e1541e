use super::*;
use crate::diff::{diff, mount};
use crate::memory::{MemoryDocument, NodeId};
use crate::snapshot::Snapshot;
use crate::vnode::Handler;

#[derive(Clone, Debug, PartialEq)]
enum Msg {
    Pick(u32),
    Clear,
}

struct Fixture {
    document: MemoryDocument,
    live: LiveTree<MemoryDocument>,
    container: NodeId,
    handle: RuntimeHandle<Msg>,
}

impl Fixture {
    fn new() -> Self {
        let mut document = MemoryDocument::new();
        let container = document.create_container("main");
        Self {
            document,
            live: LiveTree::new(container),
            container,
            handle: RuntimeHandle::detached(),
        }
    }

    fn apply(&mut self, patches: Vec<Patch<Msg>>) -> Result<(), HostError> {
        apply(&mut self.document, &mut self.live, patches, &self.handle)
    }

    fn root(&self) -> NodeId {
        self.document.children(self.container)[0]
    }

    fn snapshot(&self) -> Snapshot {
        self.document.snapshot(self.root()).expect("mounted root")
    }
}

fn menu(items: &[(u32, &str)]) -> VNode<Msg> {
    VNode::element("nav")
        .on("dblclick", Handler::Message(Msg::Clear))
        .children(items.iter().map(|(id, label)| {
            VNode::element("a")
                .key(id.to_string())
                .on("click", Handler::Message(Msg::Pick(*id)))
                .child(*label)
        }))
        .into()
}

#[test]
fn mount_builds_the_whole_tree() {
    let mut fixture = Fixture::new();
    let tree = menu(&[(1, "one"), (2, "two")]);
    fixture.apply(mount(&tree)).expect("mount");

    assert!(fixture.live.is_mounted());
    assert_eq!(fixture.snapshot(), Snapshot::of(&tree));
    assert_eq!(fixture.document.total_listeners(), 3);

    let second = fixture
        .live
        .node(&NodePath::from(vec![1]))
        .expect("second link");
    assert!(second.has_listener("click"));
    assert_eq!(second.children().len(), 1);
    assert!(second.children()[0].is_text());
    assert_eq!(fixture.document.text(*second.children()[0].handle()), Some("two"));
}

#[test]
fn handler_replacement_keeps_a_single_listener() {
    let mut fixture = Fixture::new();
    let old = menu(&[(1, "one")]);
    fixture.apply(mount(&old)).expect("mount");
    let link = fixture.document.children(fixture.root())[0];

    let new: VNode<Msg> = VNode::element("nav")
        .on("dblclick", Handler::Message(Msg::Clear))
        .child(
            VNode::element("a")
                .key("1")
                .on("click", Handler::Message(Msg::Pick(7)))
                .child("one"),
        )
        .into();
    fixture.apply(diff(&old, &new)).expect("patch");

    assert_eq!(fixture.document.listener_count(link), 1);
    assert_eq!(fixture.document.listener_count(fixture.root()), 1);
}

#[test]
fn removed_and_replaced_subtrees_lose_their_listeners() {
    let mut fixture = Fixture::new();
    let old = menu(&[(1, "one"), (2, "two"), (3, "three")]);
    fixture.apply(mount(&old)).expect("mount");
    assert_eq!(fixture.document.total_listeners(), 4);

    let fewer = menu(&[(2, "two")]);
    fixture.apply(diff(&old, &fewer)).expect("remove");
    assert_eq!(fixture.document.total_listeners(), 2);

    let replaced: VNode<Msg> = VNode::element("section").child("empty").into();
    fixture.apply(diff(&fewer, &replaced)).expect("replace");
    assert_eq!(fixture.document.total_listeners(), 0);
    assert_eq!(fixture.snapshot(), Snapshot::of(&replaced));
    assert_eq!(fixture.document.children(fixture.container).len(), 1);
}

#[test]
fn keyed_moves_keep_host_nodes() {
    let mut fixture = Fixture::new();
    let old = menu(&[(1, "one"), (2, "two"), (3, "three")]);
    fixture.apply(mount(&old)).expect("mount");
    let before: Vec<NodeId> = fixture.document.children(fixture.root()).to_vec();

    let new = menu(&[(3, "three"), (1, "one"), (2, "two")]);
    fixture.apply(diff(&old, &new)).expect("move");

    assert_eq!(
        fixture.document.children(fixture.root()),
        &[before[2], before[0], before[1]]
    );
    assert_eq!(fixture.snapshot(), Snapshot::of(&new));
}

#[test]
fn unmount_clears_the_container() {
    let mut fixture = Fixture::new();
    fixture
        .apply(mount(&menu(&[(1, "one")])))
        .expect("mount");
    fixture.live.unmount(&mut fixture.document).expect("unmount");

    assert!(!fixture.live.is_mounted());
    assert!(fixture.document.children(fixture.container).is_empty());
    assert_eq!(fixture.document.total_listeners(), 0);
    assert_eq!(fixture.document.len(), 1);
}

#[test]
fn host_failures_propagate() {
    let mut fixture = Fixture::new();
    fixture.document.reject_tag("iframe");
    let tree: VNode<Msg> = VNode::element("div")
        .child(VNode::element("iframe"))
        .into();
    let err = fixture.apply(mount(&tree)).unwrap_err();
    assert!(matches!(err, HostError::Rejected { .. }));
}

#[test]
#[should_panic(expected = "does not resolve")]
fn patches_for_missing_nodes_panic() {
    let mut fixture = Fixture::new();
    fixture.apply(mount(&menu(&[]))).expect("mount");
    let _ = fixture.apply(vec![Patch::UpdateText {
        path: NodePath::from(vec![4, 0]),
        text: "ghost".into(),
    }]);
}

#[test]
#[should_panic(expected = "targets an element")]
fn text_updates_on_elements_panic() {
    let mut fixture = Fixture::new();
    fixture.apply(mount(&menu(&[(1, "one")]))).expect("mount");
    let _ = fixture.apply(vec![Patch::UpdateText {
        path: NodePath::from(vec![0]),
        text: "nope".into(),
    }]);
}
