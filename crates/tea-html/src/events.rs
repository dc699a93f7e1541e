//! Event helpers. Each one picks the `Handler` variant whose identity stays
//! stable across renders so unchanged views do not re-register listeners.

use tea_core::{Element, Event, Handler};

pub trait Events<Msg>: Sized {
    fn handle(self, event: &str, handler: Handler<Msg>) -> Self;

    fn on_click(self, msg: Msg) -> Self {
        self.handle("click", Handler::Message(msg))
    }

    fn on_double_click(self, msg: Msg) -> Self {
        self.handle("dblclick", Handler::Message(msg))
    }

    fn on_submit(self, msg: Msg) -> Self {
        self.handle("submit", Handler::Message(msg))
    }

    fn on_blur(self, msg: Msg) -> Self {
        self.handle("blur", Handler::Message(msg))
    }

    /// Current value of a text field on every keystroke.
    fn on_input(self, build: fn(String) -> Msg) -> Self {
        self.handle("input", Handler::Input(build))
    }

    fn on_change(self, build: fn(String) -> Msg) -> Self {
        self.handle("change", Handler::Input(build))
    }

    fn on_key_down(self, filter: fn(&Event) -> Option<Msg>) -> Self {
        self.handle("keydown", Handler::FilterEvent(filter))
    }

    /// Checkbox state after a `change` event.
    fn on_check(self, build: fn(bool) -> Msg) -> Self
    where
        Msg: 'static,
    {
        let handler = Handler::keyed(&("check", build as usize), move |event: &Event| {
            event.checked.map(build)
        });
        self.handle("change", handler)
    }

    /// Capturing closure; `key` must change whenever the closure's captures
    /// do.
    fn on_keyed<K: std::hash::Hash + ?Sized>(
        self,
        event: &str,
        key: &K,
        callback: impl Fn(&Event) -> Option<Msg> + 'static,
    ) -> Self {
        self.handle(event, Handler::keyed(key, callback))
    }
}

impl<Msg> Events<Msg> for Element<Msg> {
    fn handle(self, event: &str, handler: Handler<Msg>) -> Self {
        self.on(event, handler)
    }
}

/// `keydown` filter matching the Enter key.
pub fn is_enter(event: &Event) -> bool {
    event.key.as_deref() == Some("Enter")
}
