use super::*;
use crate::vnode::Event;
use std::cell::Cell;
use std::rc::Rc;

fn build_list(document: &mut MemoryDocument) -> (NodeId, Vec<NodeId>) {
    let list = document.create_element("ul").expect("ul");
    let items: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let item = document.create_element("li").expect("li");
            let text = document.create_text(label).expect("text");
            document.insert_child(&item, 0, &text).expect("insert text");
            document.insert_child(&list, index, &item).expect("insert item");
            item
        })
        .collect();
    (list, items)
}

#[test]
fn builds_and_queries_a_tree() {
    let mut document = MemoryDocument::new();
    let (list, items) = build_list(&mut document);
    document
        .set_attribute(&items[1], "class", &AttrValue::from("selected"))
        .expect("set attribute");

    assert_eq!(document.children(list), items.as_slice());
    assert_eq!(document.parent(items[0]), Some(list));
    assert_eq!(document.tag(list), Some("ul"));
    assert_eq!(document.text_content(list), "abc");
    assert_eq!(document.find_by_text(list, "b"), Some(items[1]));
    assert_eq!(document.find_by_tag(list, "li"), Some(items[0]));
    assert_eq!(
        document.find_by_attribute(list, "class", "selected"),
        Some(items[1])
    );
    assert_eq!(document.len(), 7);
}

#[test]
fn move_child_lands_at_target_index() {
    let mut document = MemoryDocument::new();
    let (list, items) = build_list(&mut document);

    document.move_child(&list, 2, 0).expect("move last to front");
    assert_eq!(document.children(list), &[items[2], items[0], items[1]]);

    document.move_child(&list, 0, 2).expect("move front to last");
    assert_eq!(document.children(list), items.as_slice());

    let err = document.move_child(&list, 3, 0).unwrap_err();
    assert_eq!(err, HostError::IndexOutOfBounds { index: 3, len: 3 });
}

#[test]
fn remove_child_releases_the_subtree() {
    let mut document = MemoryDocument::new();
    let (list, items) = build_list(&mut document);
    let text = document.children(items[1])[0];

    document.remove_child(&list, 1).expect("remove");
    assert!(!document.contains(items[1]));
    assert!(!document.contains(text));
    assert_eq!(document.text_content(list), "ac");
    assert_eq!(document.len(), 5);
}

#[test]
fn text_and_element_operations_are_checked() {
    let mut document = MemoryDocument::new();
    let element = document.create_element("p").expect("p");
    let text = document.create_text("hi").expect("text");

    assert!(matches!(
        document.set_text(&element, "nope"),
        Err(HostError::NotAText { .. })
    ));
    assert!(matches!(
        document.set_attribute(&text, "id", &AttrValue::from("x")),
        Err(HostError::NotAnElement { .. })
    ));
    assert!(matches!(
        document.insert_child(&element, 1, &text),
        Err(HostError::IndexOutOfBounds { index: 1, len: 0 })
    ));
    assert!(matches!(
        document.remove_child(&element, 0),
        Err(HostError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        document.set_text(&99, "x"),
        Err(HostError::Missing { .. })
    ));

    document.set_text(&text, "hello").expect("set text");
    assert_eq!(document.text(text), Some("hello"));
}

#[test]
fn listeners_are_registered_and_detached_by_id() {
    let mut document = MemoryDocument::new();
    let button = document.create_element("button").expect("button");
    let clicks = Rc::new(Cell::new(0));

    let first = {
        let clicks = clicks.clone();
        document
            .add_listener(&button, "click", Rc::new(move |_: &Event| clicks.set(clicks.get() + 1)))
            .expect("first listener")
    };
    let second = {
        let clicks = clicks.clone();
        document
            .add_listener(&button, "click", Rc::new(move |_: &Event| clicks.set(clicks.get() + 10)))
            .expect("second listener")
    };
    assert_ne!(first, second);
    assert_eq!(document.listener_count(button), 2);

    let callback = document.listener(button, "click").expect("latest listener");
    callback(&Event::new("click"));
    assert_eq!(clicks.get(), 10);

    document.remove_listener(&button, second).expect("remove");
    let callback = document.listener(button, "click").expect("remaining listener");
    callback(&Event::new("click"));
    assert_eq!(clicks.get(), 11);

    document.remove_listener(&button, first).expect("remove");
    assert!(document.listener(button, "click").is_none());
    assert_eq!(document.total_listeners(), 0);
}

#[test]
fn rejected_tags_fail_creation() {
    let mut document = MemoryDocument::new();
    document.reject_tag("script");
    let err = document.create_element("script").unwrap_err();
    assert!(matches!(
        err,
        HostError::Rejected {
            operation: "create_element",
            ..
        }
    ));
    assert!(err.to_string().contains("<script>"));
    assert!(document.create_element("div").is_ok());
}

#[test]
fn snapshot_and_dump_describe_the_tree() {
    let mut document = MemoryDocument::new();
    let (list, items) = build_list(&mut document);
    document
        .set_attribute(&items[0], "data-id", &AttrValue::from(1))
        .expect("attribute");

    let snapshot = document.snapshot(list).expect("snapshot");
    match &snapshot {
        Snapshot::Element { tag, children, .. } => {
            assert_eq!(tag, "ul");
            assert_eq!(children.len(), 3);
        }
        Snapshot::Text(_) => panic!("expected an element"),
    }

    let dump = document.dump_tree(Some(list));
    assert!(dump.starts_with(&format!("[{list}] <ul>")));
    assert!(dump.contains("<li data-id=\"1\">"));
    assert!(dump.contains("\"c\""));
    assert_eq!(document.dump_tree(None), "(no root)\n");
}
