//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use crate::tokenizer::Attribute;

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "...if any of the attributes on the token match the strings in the first
/// column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string in the second column, the local
/// name being the string in the third column."
///
/// Namespaced attributes are stored under their qualified `prefix:local` name.
/// The entries listed here are the only names the serializer treats as
/// namespaced.
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str, &str)] = &[
    ("xlink:actuate", "xlink", "actuate"),
    ("xlink:arcrole", "xlink", "arcrole"),
    ("xlink:href", "xlink", "href"),
    ("xlink:role", "xlink", "role"),
    ("xlink:show", "xlink", "show"),
    ("xlink:title", "xlink", "title"),
    ("xlink:type", "xlink", "type"),
    ("xml:lang", "xml", "lang"),
    ("xml:space", "xml", "space"),
    ("xmlns", "", "xmlns"),
    ("xmlns:xlink", "xmlns", "xlink"),
];

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// Normalises the qualified names of xlink, xml and xmlns attributes.
pub fn adjust_foreign_attributes(attributes: &mut [Attribute]) {
    for attr in &mut *attributes {
        let Some(&(_, prefix, local_name)) = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|&&(from, _, _)| attr.name == from)
        else {
            continue;
        };
        attr.name = if prefix.is_empty() {
            local_name.to_string()
        } else {
            format!("{prefix}:{local_name}")
        };
    }
}

/// Splits an adjusted foreign attribute name into `(prefix, local name)`.
#[must_use]
pub fn namespaced_attribute(name: &str) -> Option<(&'static str, &'static str)> {
    FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|&&(from, prefix, _)| from == name && !prefix.is_empty())
        .map(|&(_, prefix, local_name)| (prefix, local_name))
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2",
/// "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
/// "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong",
/// "strike", "sub", "sup", "table", "tt", "u", "ul", "var""
///
/// "A start tag whose tag name is "font", if the token has any attributes
/// named "color", "face", or "size""
#[must_use]
pub fn is_breakout_tag(name: &str, attributes: &[Attribute]) -> bool {
    match name {
        "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl"
        | "dt" | "em" | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr"
        | "i" | "img" | "li" | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre"
        | "ruby" | "s" | "small" | "span" | "strong" | "strike" | "sub" | "sup" | "table"
        | "tt" | "u" | "ul" | "var" => true,
        "font" => attributes
            .iter()
            .any(|attr| matches!(attr.name.as_str(), "color" | "face" | "size")),
        _ => false,
    }
}
