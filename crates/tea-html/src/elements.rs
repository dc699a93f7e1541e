use tea_core::Element;

macro_rules! elements {
    ($($name:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name<Msg>() -> Element<Msg> {
                Element::new(stringify!($name))
            }
        )*
    };
}

elements!(
    a, article, aside, b, button, code, div, em, footer, form, h1, h2, h3, header, i, img,
    input, label, li, main, nav, ol, option, p, pre, section, select, span, strong, table,
    tbody, td, textarea, th, thead, tr, ul,
);
