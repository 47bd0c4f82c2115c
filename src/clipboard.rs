//! Clipboard interchange for block selections.
//!
//! Copy writes three flavours: the selected blocks as JSON, an HTML rendering
//! for other applications, and plain text. Paste reads them back in priority
//! order: block JSON, then block-level HTML elements, then multi-line plain
//! text.

use serde_json::Value;
use tracing::debug;

use crate::codec::{self, Node, TextSegment, html};
use crate::doc::{self, Block, BlockId, BlockPatch, BlockType, Document, EditError};
use crate::selection::SelectionSet;

pub const MIME_JSON: &str = "application/json";
pub const MIME_HTML: &str = "text/html";
pub const MIME_TEXT: &str = "text/plain";

/// The flavours of one clipboard transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    pub json: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

impl ClipboardData {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, mime: &str) -> Option<&str> {
        match mime {
            MIME_JSON => self.json.as_deref(),
            MIME_HTML => self.html.as_deref(),
            MIME_TEXT => self.text.as_deref(),
            _ => None,
        }
    }

    pub fn set(&mut self, mime: &str, value: String) {
        match mime {
            MIME_JSON => self.json = Some(value),
            MIME_HTML => self.html = Some(value),
            MIME_TEXT => self.text = Some(value),
            _ => debug!(mime, "ignoring unsupported clipboard flavour"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("clipboard JSON is not a block list")]
    NotBlocks,
}

/// Which flavour a paste was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    Structured,
    Html,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedBlocks {
    pub source: PasteSource,
    pub blocks: Vec<Block>,
}

/// Builds the clipboard payload for the selected blocks, in document order.
/// Nothing is written for an empty selection.
pub fn copy_blocks(document: &Document, selection: &SelectionSet) -> Option<ClipboardData> {
    if selection.is_empty() {
        return None;
    }
    let blocks: Vec<Block> = document
        .blocks()
        .iter()
        .filter(|block| selection.contains(&block.id))
        .cloned()
        .collect();
    if blocks.is_empty() {
        return None;
    }

    let text = blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n");
    let json = serde_json::to_string(&blocks).ok();
    debug!(blocks = blocks.len(), "copied blocks");
    Some(ClipboardData {
        json,
        html: Some(doc::blocks_to_html(&blocks)),
        text: Some(text),
    })
}

/// Reads pasted blocks from the richest usable flavour. `None` leaves the
/// paste to the text surface.
pub fn read_paste(data: &ClipboardData) -> Option<PastedBlocks> {
    if let Some(json) = data.json.as_deref().filter(|s| !s.is_empty()) {
        match parse_structured(json) {
            Ok(blocks) => {
                return Some(PastedBlocks {
                    source: PasteSource::Structured,
                    blocks,
                });
            }
            Err(err) => debug!(%err, "ignoring clipboard JSON"),
        }
    }

    if let Some(markup) = data.html.as_deref().filter(|s| !s.is_empty()) {
        let blocks = parse_html_blocks(markup);
        if !blocks.is_empty() {
            return Some(PastedBlocks {
                source: PasteSource::Html,
                blocks,
            });
        }
    }

    if let Some(text) = data.text.as_deref() {
        let blocks = parse_text_lines(text);
        if !blocks.is_empty() {
            return Some(PastedBlocks {
                source: PasteSource::PlainText,
                blocks,
            });
        }
    }
    None
}

/// Accepts a non-empty JSON array whose first element has a truthy `id` and a
/// string `type`. Every block gets a fresh id.
pub fn parse_structured(json: &str) -> Result<Vec<Block>, ClipboardError> {
    let parsed: Value = serde_json::from_str(json)?;
    let Value::Array(items) = &parsed else {
        return Err(ClipboardError::NotBlocks);
    };
    let Some(first) = items.first() else {
        return Err(ClipboardError::NotBlocks);
    };
    if !is_truthy(&first["id"]) || !first["type"].is_string() {
        return Err(ClipboardError::NotBlocks);
    }
    let blocks: Vec<Block> = serde_json::from_value(parsed)?;
    Ok(blocks
        .into_iter()
        .map(|block| Block::new(block.block_type, block.content))
        .collect())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One block per `p`, `h1`-`h3` and `li` element, and per `div` that holds
/// no block-level elements. `li` becomes a numbered item under `ol` and a
/// bullet otherwise. Elements with blank content are skipped.
pub fn parse_html_blocks(markup: &str) -> Vec<Block> {
    let nodes = html::parse_fragment(markup);
    let mut blocks = Vec::new();
    collect_html_blocks(&nodes, None, &mut blocks);
    blocks
}

fn collect_html_blocks(nodes: &[Node], parent: Option<&str>, out: &mut Vec<Block>) {
    for node in nodes {
        let Node::Element(element) = node else {
            continue;
        };
        let block_type = match element.tag.as_str() {
            "p" => Some(BlockType::Text),
            "h1" => Some(BlockType::H1),
            "h2" => Some(BlockType::H2),
            "h3" => Some(BlockType::H3),
            "li" if parent == Some("ol") => Some(BlockType::Number),
            "li" => Some(BlockType::Bullet),
            "div" if !has_block_descendant(&element.children) => Some(BlockType::Text),
            _ => None,
        };
        match block_type {
            Some(block_type) => {
                let inner = element.inner_html();
                let inner = inner.trim();
                if !inner.is_empty() {
                    out.push(Block::new(block_type, codec::from_markup(inner)));
                }
            }
            None if element.tag == "head" => {}
            None => collect_html_blocks(&element.children, Some(&element.tag), out),
        }
    }
}

fn has_block_descendant(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(element) => {
            matches!(element.tag.as_str(), "p" | "h1" | "h2" | "h3" | "li" | "div")
                || has_block_descendant(&element.children)
        }
        Node::Text(_) => false,
    })
}

/// One text block per non-blank line, but only when there are at least two.
pub fn parse_text_lines(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return Vec::new();
    }
    lines
        .into_iter()
        .map(|line| Block::new(BlockType::Text, vec![TextSegment::plain(line)]))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Nothing intercepted; the surface should paste as text.
    Default,
    /// Blocks were written. `focus` gets the caret at its end; `touched` are
    /// the blocks whose surfaces must be refreshed.
    Inserted {
        focus: BlockId,
        touched: Vec<BlockId>,
    },
}

/// Applies pasted blocks at `target`.
///
/// Several blocks replace the selected span when `target` is selected (the
/// span's first id survives), or otherwise overwrite `target` and follow it.
/// A single block is only taken over when `target` is empty and of a
/// different type.
pub fn apply_paste(
    document: &mut Document,
    target: &BlockId,
    pasted: Vec<Block>,
    selection: &SelectionSet,
) -> Result<PasteOutcome, EditError> {
    let index = document.require_index(target)?;
    let mut pasted = pasted.into_iter();
    let Some(first) = pasted.next() else {
        return Err(EditError::EmptyInsert);
    };
    let rest: Vec<Block> = pasted.collect();

    if rest.is_empty() {
        let current = &document.blocks()[index];
        if !current.is_empty() || current.block_type == first.block_type {
            return Ok(PasteOutcome::Default);
        }
        let patch = BlockPatch::block_type(first.block_type).with_content(first.content);
        document.update_block(target, &patch)?;
        return Ok(PasteOutcome::Inserted {
            focus: target.clone(),
            touched: vec![target.clone()],
        });
    }

    let mut touched: Vec<BlockId> = rest.iter().map(|block| block.id.clone()).collect();
    let focus = if selection.contains(target) {
        let span = selection
            .contiguous_span(document)
            .ok_or(EditError::NonContiguousSelection)?;
        let keep = document.blocks()[*span.start()].id.clone();
        let mut replacement = vec![first.with_id(keep.clone())];
        replacement.extend(rest);
        debug!(span = ?span, blocks = replacement.len(), "replacing selected span");
        document.splice(span, replacement);
        keep
    } else {
        let patch = BlockPatch::block_type(first.block_type).with_content(first.content);
        document.update_block(target, &patch)?;
        debug!(blocks = rest.len() + 1, "pasting over block");
        document.insert_blocks_at(index + 1, rest);
        target.clone()
    };
    touched.insert(0, focus.clone());
    Ok(PasteOutcome::Inserted { focus, touched })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> Document {
        Document::from_blocks(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    Block::new(BlockType::Text, vec![TextSegment::plain(*t)])
                        .with_id(BlockId::new(i.to_string()))
                })
                .collect(),
        )
    }

    fn types(blocks: &[Block]) -> Vec<BlockType> {
        blocks.iter().map(|b| b.block_type).collect()
    }

    #[test]
    fn test_copy_requires_selection() {
        let doc = doc(&["a", "b"]);
        assert_eq!(copy_blocks(&doc, &SelectionSet::new()), None);
    }

    #[test]
    fn test_copy_writes_three_flavours_in_document_order() {
        let doc = doc(&["a", "b", "c"]);
        let selection = SelectionSet::from_ids([BlockId::new("2"), BlockId::new("0")]);
        let data = copy_blocks(&doc, &selection).unwrap();
        assert_eq!(data.get(MIME_TEXT), Some("a\nc"));
        assert_eq!(data.get(MIME_HTML), Some("<p>a</p><p>c</p>"));
        let json: Vec<Block> = serde_json::from_str(data.get(MIME_JSON).unwrap()).unwrap();
        assert_eq!(json[0].id, BlockId::new("0"));
        assert_eq!(json[1].id, BlockId::new("2"));
    }

    #[test]
    fn test_structured_paste_refreshes_ids() {
        let blocks = parse_structured(
            r#"[{"id":"x","type":"h2","content":[{"text":"T"}]},{"id":"y","type":"text","content":[]}]"#,
        )
        .unwrap();
        assert_eq!(types(&blocks), vec![BlockType::H2, BlockType::Text]);
        assert!(blocks.iter().all(|b| b.id != BlockId::new("x") && b.id != BlockId::new("y")));
    }

    #[test]
    fn test_structured_paste_shape_checks() {
        assert!(parse_structured("[]").is_err());
        assert!(parse_structured(r#"[{"id":"","type":"text"}]"#).is_err());
        assert!(parse_structured(r#"[{"id":"a","type":3}]"#).is_err());
        assert!(parse_structured(r#"{"id":"a","type":"text"}"#).is_err());
        assert!(parse_structured("nope").is_err());
    }

    #[test]
    fn test_html_heuristics() {
        let blocks = parse_html_blocks(
            "<h1>Title</h1><ol><li>one</li><li><b>two</b></li></ol><ul><li>dot</li></ul><p>  </p><div>loose</div>",
        );
        assert_eq!(
            types(&blocks),
            vec![
                BlockType::H1,
                BlockType::Number,
                BlockType::Number,
                BlockType::Bullet,
                BlockType::Text
            ]
        );
        assert_eq!(blocks[2].content, vec![TextSegment::bold("two")]);
        assert_eq!(blocks[4].plain_text(), "loose");
    }

    #[test]
    fn test_html_div_wrapping_paragraphs_is_not_duplicated() {
        let blocks = parse_html_blocks(
            "<html><body><!--StartFragment--><div><p>a</p><p>b</p></div><div><div>nested</div></div></body></html>",
        );
        let texts: Vec<String> = blocks.iter().map(Block::plain_text).collect();
        assert_eq!(texts, vec!["a", "b", "nested"]);
    }

    #[test]
    fn test_text_lines_need_two() {
        assert!(parse_text_lines("single line").is_empty());
        let blocks = parse_text_lines("one\r\n\n  two  \nthree");
        let texts: Vec<String> = blocks.iter().map(Block::plain_text).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_read_paste_priority() {
        let data = ClipboardData {
            json: Some(r#"[{"id":"a","type":"h3","content":[{"text":"J"}]}]"#.into()),
            html: Some("<p>H1</p><p>H2</p>".into()),
            text: Some("t1\nt2".into()),
        };
        assert_eq!(read_paste(&data).unwrap().source, PasteSource::Structured);

        let data = ClipboardData {
            json: Some("not json".into()),
            ..data
        };
        assert_eq!(read_paste(&data).unwrap().source, PasteSource::Html);

        let data = ClipboardData {
            html: Some("<span>inline only</span>".into()),
            ..data
        };
        assert_eq!(read_paste(&data).unwrap().source, PasteSource::PlainText);

        assert_eq!(read_paste(&ClipboardData::plain("just one")), None);
    }

    #[test]
    fn test_single_block_adopted_only_by_empty_block_of_other_type() {
        let mut document = doc(&["", "full"]);
        let pasted = vec![Block::new(BlockType::H1, vec![TextSegment::plain("Head")])];
        let none = SelectionSet::new();
        let outcome = apply_paste(&mut document, &BlockId::new("1"), pasted.clone(), &none);
        assert_eq!(outcome, Ok(PasteOutcome::Default));

        let outcome = apply_paste(&mut document, &BlockId::new("0"), pasted, &none);
        assert!(matches!(outcome, Ok(PasteOutcome::Inserted { .. })));
        assert_eq!(document.blocks()[0].block_type, BlockType::H1);
        assert_eq!(document.blocks()[0].plain_text(), "Head");

        let same_type = vec![Block::new(BlockType::Text, vec![TextSegment::plain("x")])];
        let mut document = doc(&[""]);
        let outcome = apply_paste(&mut document, &BlockId::new("0"), same_type, &none);
        assert_eq!(outcome, Ok(PasteOutcome::Default));
    }

    #[test]
    fn test_multi_paste_over_unselected_block() {
        let mut doc = doc(&["a", "b", "c"]);
        let pasted = parse_text_lines("x\ny\nz");
        let outcome = apply_paste(&mut doc, &BlockId::new("1"), pasted, &SelectionSet::new()).unwrap();
        assert_eq!(doc.to_plain_text(), "a\nx\ny\nz\nc");
        let PasteOutcome::Inserted { focus, touched } = outcome else {
            panic!("expected insertion");
        };
        assert_eq!(focus, BlockId::new("1"));
        assert_eq!(touched.len(), 3);
    }

    #[test]
    fn test_multi_paste_replaces_selected_span() {
        let mut doc = doc(&["a", "b", "c", "d"]);
        let selection = SelectionSet::from_ids([BlockId::new("1"), BlockId::new("2")]);
        let pasted = parse_text_lines("x\ny\nz");
        let outcome = apply_paste(&mut doc, &BlockId::new("2"), pasted, &selection).unwrap();
        assert_eq!(doc.to_plain_text(), "a\nx\ny\nz\nd");
        assert_eq!(doc.blocks()[1].id, BlockId::new("1"));
        assert!(matches!(outcome, PasteOutcome::Inserted { focus, .. } if focus == BlockId::new("1")));
    }

    #[test]
    fn test_non_contiguous_span_rejected() {
        let mut doc = doc(&["a", "b", "c"]);
        let before = doc.clone();
        let selection = SelectionSet::from_ids([BlockId::new("0"), BlockId::new("2")]);
        let pasted = parse_text_lines("x\ny");
        assert_eq!(
            apply_paste(&mut doc, &BlockId::new("0"), pasted, &selection),
            Err(EditError::NonContiguousSelection)
        );
        assert_eq!(doc, before);
    }
}
