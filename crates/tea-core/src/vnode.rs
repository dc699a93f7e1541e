//! Virtual node tree produced by `view` functions.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::collections::hash_key;

/// Value assigned to an element attribute.
#[derive(Clone, Debug)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Number(f64),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean attributes are present only while `true`.
    pub fn is_present(&self) -> bool {
        !matches!(self, AttrValue::Bool(false))
    }
}

/// Numbers compare by bit pattern so that an attribute always equals itself,
/// NaN included.
impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(value) => f.write_str(value),
            AttrValue::Bool(value) => write!(f, "{value}"),
            AttrValue::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(value.into())
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Number(value.into())
    }
}

/// Host event payload delivered to handlers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    /// Current `value` of the event target, for form controls.
    pub value: Option<String>,
    pub checked: Option<bool>,
    /// Key name for keyboard events.
    pub key: Option<String>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

pub type KeyedCallback<Msg> = Rc<dyn Fn(&Event) -> Option<Msg>>;

/// Builds a message from a host event.
///
/// Handlers compare structurally so that re-rendering an unchanged view does
/// not churn host listeners: constant messages by value, plain functions by
/// address, and capturing closures by the hash of a caller supplied key.
pub enum Handler<Msg> {
    Message(Msg),
    Event(fn(&Event) -> Msg),
    FilterEvent(fn(&Event) -> Option<Msg>),
    Input(fn(String) -> Msg),
    Keyed { id: u64, callback: KeyedCallback<Msg> },
}

impl<Msg> Handler<Msg> {
    /// Wraps a capturing closure. Two keyed handlers are the same handler
    /// whenever their keys hash equally.
    pub fn keyed<K: Hash + ?Sized>(
        key: &K,
        callback: impl Fn(&Event) -> Option<Msg> + 'static,
    ) -> Self {
        Handler::Keyed {
            id: hash_key(key),
            callback: Rc::new(callback),
        }
    }

    pub fn invoke(&self, event: &Event) -> Option<Msg>
    where
        Msg: Clone,
    {
        match self {
            Handler::Message(msg) => Some(msg.clone()),
            Handler::Event(build) => Some(build(event)),
            Handler::FilterEvent(build) => build(event),
            Handler::Input(build) => Some(build(event.value.clone().unwrap_or_default())),
            Handler::Keyed { callback, .. } => callback(event),
        }
    }
}

impl<Msg: Clone> Clone for Handler<Msg> {
    fn clone(&self) -> Self {
        match self {
            Handler::Message(msg) => Handler::Message(msg.clone()),
            Handler::Event(build) => Handler::Event(*build),
            Handler::FilterEvent(build) => Handler::FilterEvent(*build),
            Handler::Input(build) => Handler::Input(*build),
            Handler::Keyed { id, callback } => Handler::Keyed {
                id: *id,
                callback: Rc::clone(callback),
            },
        }
    }
}

impl<Msg: PartialEq> PartialEq for Handler<Msg> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Handler::Message(a), Handler::Message(b)) => a == b,
            (Handler::Event(a), Handler::Event(b)) => *a as usize == *b as usize,
            (Handler::FilterEvent(a), Handler::FilterEvent(b)) => *a as usize == *b as usize,
            (Handler::Input(a), Handler::Input(b)) => *a as usize == *b as usize,
            (Handler::Keyed { id: a, .. }, Handler::Keyed { id: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl<Msg: fmt::Debug> fmt::Debug for Handler<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Message(msg) => f.debug_tuple("Message").field(msg).finish(),
            Handler::Event(_) => f.write_str("Event(fn)"),
            Handler::FilterEvent(_) => f.write_str("FilterEvent(fn)"),
            Handler::Input(_) => f.write_str("Input(fn)"),
            Handler::Keyed { id, .. } => f.debug_struct("Keyed").field("id", id).finish(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element<Msg> {
    pub tag: String,
    pub attributes: IndexMap<String, AttrValue>,
    pub handlers: IndexMap<String, Handler<Msg>>,
    pub children: Vec<VNode<Msg>>,
    pub key: Option<String>,
}

impl<Msg> Element<Msg> {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            handlers: IndexMap::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attr_if(self, condition: bool, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        if condition {
            self.attr(name, value)
        } else {
            self
        }
    }

    /// Appends to the space separated `class` attribute.
    pub fn class(mut self, name: &str) -> Self {
        let merged = match self.attributes.get("class").and_then(AttrValue::as_str) {
            Some(existing) if !existing.is_empty() => format!("{existing} {name}"),
            _ => name.to_owned(),
        };
        self.attributes.insert("class".to_owned(), AttrValue::Str(merged));
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: Handler<Msg>) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    pub fn child(mut self, child: impl Into<VNode<Msg>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode<Msg>>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// One node of a rendered tree. Trees are rebuilt on every render and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum VNode<Msg> {
    Element(Element<Msg>),
    Text(String),
}

impl<Msg> VNode<Msg> {
    pub fn element(tag: impl Into<String>) -> Element<Msg> {
        Element::new(tag)
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text(content.into())
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            VNode::Element(element) => element.key.as_deref(),
            VNode::Text(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element(element) => Some(&element.tag),
            VNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[VNode<Msg>] {
        match self {
            VNode::Element(element) => &element.children,
            VNode::Text(_) => &[],
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(VNode::node_count).sum::<usize>()
    }

    /// Concatenated text of every text node below `self`, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            VNode::Text(content) => out.push_str(content),
            VNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl<Msg> From<Element<Msg>> for VNode<Msg> {
    fn from(element: Element<Msg>) -> Self {
        VNode::Element(element)
    }
}

impl<Msg> From<&str> for VNode<Msg> {
    fn from(content: &str) -> Self {
        VNode::Text(content.to_owned())
    }
}

impl<Msg> From<String> for VNode<Msg> {
    fn from(content: String) -> Self {
        VNode::Text(content)
    }
}
