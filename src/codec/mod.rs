//! Segment codec: conversion between styled text runs and inline markup.
//!
//! A block's content is an ordered list of [`TextSegment`]s. The editable
//! surface holds the same content as inline markup where bold is `<b>` and
//! underline is `<u>`. [`to_markup`] and [`from_markup`] convert between the
//! two; [`normalize`] yields the canonical run list that both directions agree
//! on.

pub mod html;

use serde::{Deserialize, Deserializer, Serialize};

pub use html::{Element, Node};

/// A maximal run of text sharing one attribute set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient_flag"
    )]
    pub bold: bool,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient_flag"
    )]
    pub underline: bool,
}

/// The inline attributes a run can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attributes {
    pub bold: bool,
    pub underline: bool,
}

impl Attributes {
    pub const PLAIN: Self = Self {
        bold: false,
        underline: false,
    };
}

impl TextSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            text: text.into(),
            bold: attrs.bold,
            underline: attrs.underline,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            Attributes {
                bold: true,
                underline: false,
            },
        )
    }

    pub fn underline(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            Attributes {
                bold: false,
                underline: true,
            },
        )
    }

    pub fn attributes(&self) -> Attributes {
        Attributes {
            bold: self.bold,
            underline: self.underline,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Missing and `null` flags both read as `false`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Reads block content in either the segment form or the legacy form where
/// content was stored as a single markup string.
pub(crate) fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<TextSegment>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ContentRepr {
        Segments(Vec<TextSegment>),
        Markup(String),
    }

    Ok(match ContentRepr::deserialize(deserializer)? {
        ContentRepr::Segments(segments) => normalize(segments),
        ContentRepr::Markup(markup) => from_markup(&markup),
    })
}

/// Drops empty runs, merges adjacent runs with equal attributes, and returns
/// a single empty plain run when nothing is left.
pub fn normalize(segments: Vec<TextSegment>) -> Vec<TextSegment> {
    let mut merged: Vec<TextSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.attributes() == segment.attributes() => {
                last.text.push_str(&segment.text);
            }
            _ => merged.push(segment),
        }
    }
    if merged.is_empty() {
        merged.push(TextSegment::default());
    }
    merged
}

/// Whether the runs are already in the form [`normalize`] produces.
pub fn is_normalized(segments: &[TextSegment]) -> bool {
    match segments {
        [] => false,
        [only] => !only.text.is_empty() || only.attributes() == Attributes::PLAIN,
        _ => {
            segments.iter().all(|s| !s.text.is_empty())
                && segments
                    .windows(2)
                    .all(|pair| pair[0].attributes() != pair[1].attributes())
        }
    }
}

pub fn plain_text(segments: &[TextSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Renders runs as inline markup: text is escaped, bold wraps in `<b>`, and
/// underline wraps outside of that in `<u>`.
pub fn to_markup(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        let mut piece = html::escape_text(&segment.text);
        if segment.bold {
            piece = format!("<b>{piece}</b>");
        }
        if segment.underline {
            piece = format!("<u>{piece}</u>");
        }
        out.push_str(&piece);
    }
    out
}

pub fn from_markup(markup: &str) -> Vec<TextSegment> {
    segments_from_nodes(&html::parse_fragment(markup))
}

/// Collects normalized runs from an already-parsed node list.
pub fn segments_from_nodes(nodes: &[Node]) -> Vec<TextSegment> {
    let mut runs = Vec::new();
    for node in nodes {
        collect_runs(node, Attributes::PLAIN, &mut runs);
    }
    normalize(runs)
}

fn collect_runs(node: &Node, inherited: Attributes, out: &mut Vec<TextSegment>) {
    match node {
        Node::Text(text) => {
            if !text.is_empty() {
                out.push(TextSegment::styled(text.clone(), inherited));
            }
        }
        Node::Element(element) => {
            let style = element.style();
            let attrs = Attributes {
                bold: inherited.bold
                    || matches!(element.tag.as_str(), "b" | "strong")
                    || declares(style, "font-weight", "bold"),
                underline: inherited.underline
                    || element.tag == "u"
                    || declares(style, "text-decoration", "underline"),
            };
            for child in &element.children {
                collect_runs(child, attrs, out);
            }
        }
    }
}

fn declares(style: &str, property: &str, value: &str) -> bool {
    style.contains(&format!("{property}: {value}")) || style.contains(&format!("{property}:{value}"))
}
