//! HTML fragment parsing.
//!
//! Markup is parsed with `scraper` (html5ever) and copied into a small owned
//! tree with lowercase tag names and entity-decoded text and attribute
//! values. The codec and the clipboard walk that tree.

use scraper::{ElementRef, Html};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements that never contribute document text.
const DROPPED_TAGS: &[&str] = &[
    "head", "noscript", "script", "style", "template", "title",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The raw inline `style` declaration, or an empty string.
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or("")
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_text(&mut out);
        }
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.write_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (key, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_text(value).replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if element.is_void() {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

/// Escapes the three characters that would otherwise be read as markup.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parses `input` as an HTML body fragment.
///
/// Tree construction follows the HTML parsing algorithm, so implied end tags,
/// misnested formatting and named entities come out as a browser would build
/// them. Comments, doctypes and processing instructions are dropped, as are
/// elements whose content is not document text.
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let parsed = Html::parse_fragment(input);
    convert_children(parsed.root_element())
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => nodes.push(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child)
                    && let Some(converted) = convert_element(element)
                {
                    nodes.push(Node::Element(converted));
                }
            }
            _ => {}
        }
    }
    nodes
}

fn convert_element(element: ElementRef<'_>) -> Option<Element> {
    let value = element.value();
    let tag = value.name().to_ascii_lowercase();
    if DROPPED_TAGS.contains(&tag.as_str()) {
        return None;
    }
    Some(Element {
        attrs: value
            .attrs()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        children: convert_children(element),
        tag,
    })
}
