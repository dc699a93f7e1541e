use super::prelude::*;
use super::events::is_enter;
use tea_core::{diff, AttrValue, Event};

#[derive(Clone, Debug, PartialEq)]
enum Msg {
    Add,
    Edit(String),
    Toggle(bool),
    Submit,
}

fn submit_on_enter(event: &Event) -> Option<Msg> {
    is_enter(event).then_some(Msg::Submit)
}

fn form_view(draft: &str, done: bool) -> VNode<Msg> {
    form()
        .on_submit(Msg::Add)
        .child(
            input()
                .input_type("text")
                .value(draft)
                .placeholder("What needs to be done?")
                .autofocus(true)
                .on_input(Msg::Edit)
                .on_key_down(submit_on_enter),
        )
        .child(input().input_type("checkbox").checked(done).on_check(Msg::Toggle))
        .child(button().class("primary").class("wide").on_click(Msg::Add).child(text("Add")))
        .into()
}

#[test]
fn tag_constructors_use_their_names() {
    let tree: VNode<Msg> = div().child(ul().child(li())).child(main()).into();
    assert_eq!(tree.tag(), Some("div"));
    assert_eq!(tree.children()[0].children()[0].tag(), Some("li"));
    assert_eq!(tree.children()[1].tag(), Some("main"));
    assert_eq!(node::<Msg>("x-widget").tag, "x-widget");
}

#[test]
fn attributes_land_on_the_element() {
    let element: Element<Msg> = label()
        .id("name")
        .label_for("field")
        .class_list(&[("a", true), ("b", false), ("c", true)])
        .disabled(false);
    assert_eq!(
        element.attributes.get("class"),
        Some(&AttrValue::from("a c"))
    );
    assert_eq!(element.attributes.get("for"), Some(&AttrValue::from("field")));
    assert_eq!(element.attributes.get("disabled"), Some(&AttrValue::Bool(false)));
    assert!(!element.attributes["disabled"].is_present());
}

#[test]
fn class_appends() {
    let element: Element<Msg> = button().class("primary").class("wide");
    assert_eq!(element.attributes["class"], AttrValue::from("primary wide"));
}

#[test]
fn event_helpers_produce_messages() {
    let tree = form_view("milk", false);
    let field = match &tree.children()[0] {
        VNode::Element(element) => element.clone(),
        VNode::Text(_) => panic!("expected input"),
    };
    let typed = field.handlers["input"].invoke(&Event::new("input").with_value("eggs"));
    assert_eq!(typed, Some(Msg::Edit("eggs".into())));

    let enter = field.handlers["keydown"].invoke(&Event::new("keydown").with_key("Enter"));
    assert_eq!(enter, Some(Msg::Submit));
    let other = field.handlers["keydown"].invoke(&Event::new("keydown").with_key("a"));
    assert_eq!(other, None);

    let checkbox = match &tree.children()[1] {
        VNode::Element(element) => element.clone(),
        VNode::Text(_) => panic!("expected checkbox"),
    };
    let toggled = checkbox.handlers["change"].invoke(&Event::new("change").with_checked(true));
    assert_eq!(toggled, Some(Msg::Toggle(true)));
}

#[test]
fn unchanged_views_diff_to_nothing() {
    assert!(diff(&form_view("a", true), &form_view("a", true)).is_empty());
    let patches = diff(&form_view("a", true), &form_view("ab", true));
    assert_eq!(patches.len(), 1);
}
