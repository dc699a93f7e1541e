//! Common HTML attributes as builder methods on [`Element`].

use tea_core::{AttrValue, Element};

pub trait Attributes: Sized {
    fn set(self, name: &str, value: AttrValue) -> Self;

    fn id(self, id: impl Into<String>) -> Self {
        self.set("id", AttrValue::Str(id.into()))
    }

    fn href(self, href: impl Into<String>) -> Self {
        self.set("href", AttrValue::Str(href.into()))
    }

    fn value(self, value: impl Into<String>) -> Self {
        self.set("value", AttrValue::Str(value.into()))
    }

    fn placeholder(self, text: impl Into<String>) -> Self {
        self.set("placeholder", AttrValue::Str(text.into()))
    }

    fn name(self, name: impl Into<String>) -> Self {
        self.set("name", AttrValue::Str(name.into()))
    }

    fn style(self, style: impl Into<String>) -> Self {
        self.set("style", AttrValue::Str(style.into()))
    }

    /// The `type` attribute.
    fn input_type(self, kind: &str) -> Self {
        self.set("type", AttrValue::from(kind))
    }

    /// The `for` attribute of a label.
    fn label_for(self, id: impl Into<String>) -> Self {
        self.set("for", AttrValue::Str(id.into()))
    }

    fn checked(self, checked: bool) -> Self {
        self.set("checked", AttrValue::Bool(checked))
    }

    fn disabled(self, disabled: bool) -> Self {
        self.set("disabled", AttrValue::Bool(disabled))
    }

    fn autofocus(self, autofocus: bool) -> Self {
        self.set("autofocus", AttrValue::Bool(autofocus))
    }

    /// Space separated class list of the names whose flag is set.
    fn class_list(self, classes: &[(&str, bool)]) -> Self {
        let joined = classes
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ");
        self.set("class", AttrValue::Str(joined))
    }
}

impl<Msg> Attributes for Element<Msg> {
    fn set(self, name: &str, value: AttrValue) -> Self {
        self.attr(name, value)
    }
}
