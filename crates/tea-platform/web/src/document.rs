use tea_core::{AttrValue, Document, Event, EventCallback, HostError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent};

/// Registered DOM listener. Dropping it frees the JS closure, so it must
/// outlive its registration.
pub struct WebListener {
    event: String,
    closure: Closure<dyn Fn(web_sys::Event)>,
}

/// [`Document`] over the browser DOM.
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The page's document, when running in a window.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

fn rejected(operation: &'static str) -> impl FnOnce(JsValue) -> HostError {
    move |err| HostError::Rejected {
        operation,
        reason: format!("{err:?}"),
    }
}

fn element(node: &web_sys::Node) -> Result<&web_sys::Element, HostError> {
    node.dyn_ref::<web_sys::Element>()
        .ok_or_else(|| HostError::NotAnElement {
            node: node.node_name(),
        })
}

fn child_at(parent: &web_sys::Node, index: usize) -> Result<web_sys::Node, HostError> {
    let children = parent.child_nodes();
    let len = children.length() as usize;
    u32::try_from(index)
        .ok()
        .and_then(|index| children.get(index))
        .ok_or(HostError::IndexOutOfBounds { index, len })
}

/// `value` and `checked` attributes only set the initial state of form
/// controls; the live property has to follow as well.
fn sync_property(node: &web_sys::Element, name: &str, value: Option<&AttrValue>) {
    match name {
        "value" => {
            let text = value.map(ToString::to_string).unwrap_or_default();
            if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
                if input.value() != text {
                    input.set_value(&text);
                }
            } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
                if area.value() != text {
                    area.set_value(&text);
                }
            } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
                select.set_value(&text);
            }
        }
        "checked" => {
            if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
                input.set_checked(value.is_some_and(AttrValue::is_present));
            }
        }
        _ => {}
    }
}

/// Host-agnostic view of a DOM event.
fn translate(raw: &web_sys::Event) -> Event {
    let kind = raw.type_();
    if kind == "submit" {
        raw.prevent_default();
    }
    let mut event = Event::new(kind);
    if let Some(target) = raw.target() {
        if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
            event = event.with_value(input.value()).with_checked(input.checked());
        } else if let Some(area) = target.dyn_ref::<HtmlTextAreaElement>() {
            event = event.with_value(area.value());
        } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
            event = event.with_value(select.value());
        }
    }
    if let Some(keyboard) = raw.dyn_ref::<KeyboardEvent>() {
        event = event.with_key(keyboard.key());
    }
    event
}

impl Document for WebDocument {
    type Node = web_sys::Node;
    type Listener = WebListener;

    fn create_element(&mut self, tag: &str) -> Result<web_sys::Node, HostError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(rejected("create_element"))
    }

    fn create_text(&mut self, text: &str) -> Result<web_sys::Node, HostError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn set_text(&mut self, node: &web_sys::Node, text: &str) -> Result<(), HostError> {
        if node.node_type() != web_sys::Node::TEXT_NODE {
            return Err(HostError::NotAText {
                node: node.node_name(),
            });
        }
        node.set_text_content(Some(text));
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: &web_sys::Node,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        let target = element(node)?;
        match value {
            AttrValue::Bool(false) => target
                .remove_attribute(name)
                .map_err(rejected("remove_attribute"))?,
            AttrValue::Bool(true) => target
                .set_attribute(name, "")
                .map_err(rejected("set_attribute"))?,
            other => target
                .set_attribute(name, &other.to_string())
                .map_err(rejected("set_attribute"))?,
        }
        sync_property(target, name, Some(value));
        Ok(())
    }

    fn remove_attribute(&mut self, node: &web_sys::Node, name: &str) -> Result<(), HostError> {
        let target = element(node)?;
        target
            .remove_attribute(name)
            .map_err(rejected("remove_attribute"))?;
        sync_property(target, name, None);
        Ok(())
    }

    fn insert_child(
        &mut self,
        parent: &web_sys::Node,
        index: usize,
        child: &web_sys::Node,
    ) -> Result<(), HostError> {
        let len = parent.child_nodes().length() as usize;
        if index > len {
            return Err(HostError::IndexOutOfBounds { index, len });
        }
        let reference = if index == len {
            None
        } else {
            Some(child_at(parent, index)?)
        };
        parent
            .insert_before(child, reference.as_ref())
            .map_err(rejected("insert_child"))?;
        Ok(())
    }

    fn remove_child(&mut self, parent: &web_sys::Node, index: usize) -> Result<(), HostError> {
        let child = child_at(parent, index)?;
        parent
            .remove_child(&child)
            .map_err(rejected("remove_child"))?;
        Ok(())
    }

    fn move_child(&mut self, parent: &web_sys::Node, from: usize, to: usize) -> Result<(), HostError> {
        let len = parent.child_nodes().length() as usize;
        if to >= len {
            return Err(HostError::IndexOutOfBounds { index: to, len });
        }
        let child = child_at(parent, from)?;
        parent
            .remove_child(&child)
            .map_err(rejected("move_child"))?;
        let reference = if to == len - 1 {
            None
        } else {
            Some(child_at(parent, to)?)
        };
        parent
            .insert_before(&child, reference.as_ref())
            .map_err(rejected("move_child"))?;
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &web_sys::Node,
        event: &str,
        callback: EventCallback,
    ) -> Result<WebListener, HostError> {
        let closure: Closure<dyn Fn(web_sys::Event)> =
            Closure::new(move |raw: web_sys::Event| callback(&translate(&raw)));
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(rejected("add_listener"))?;
        Ok(WebListener {
            event: event.to_owned(),
            closure,
        })
    }

    fn remove_listener(
        &mut self,
        node: &web_sys::Node,
        listener: WebListener,
    ) -> Result<(), HostError> {
        node.remove_event_listener_with_callback(
            &listener.event,
            listener.closure.as_ref().unchecked_ref(),
        )
        .map_err(rejected("remove_listener"))
    }
}
