//! Reading the serialized value a host hands to the editor.
//!
//! The canonical value is a JSON array of blocks. Hosts also pass older
//! values: a bare string of text, an empty string, or JSON that no longer
//! parses. [`Document::from_value_lossy`] accepts all of them.

use serde_json::Value;
use tracing::warn;

use super::{Block, BlockId, Document};
use crate::codec::TextSegment;

/// Id given to the single block built from a plain-text legacy value.
pub const LEGACY_BLOCK_ID: &str = "legacy";

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document is not an array of blocks")]
    NotAnArray,
    #[error("document has no blocks")]
    Empty,
}

impl Document {
    /// Strictly parses a serialized block array.
    pub fn parse_value(value: &str) -> Result<Self, ValueError> {
        let parsed: Value = serde_json::from_str(value)?;
        let Value::Array(items) = parsed else {
            return Err(ValueError::NotAnArray);
        };
        if items.is_empty() {
            return Err(ValueError::Empty);
        }
        let blocks: Vec<Block> = serde_json::from_value(Value::Array(items))?;
        Ok(Self::from_blocks(blocks))
    }

    /// Reads any inbound value without failing. Blank input and JSON that
    /// does not describe blocks fall back to the initial document; any other
    /// string becomes a single text block holding it verbatim.
    pub fn from_value_lossy(value: &str) -> Self {
        let trimmed = value.trim_start();
        if trimmed.is_empty() {
            return Self::new();
        }
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return Self::parse_value(trimmed).unwrap_or_else(|err| {
                warn!(%err, "unreadable document value; starting empty");
                Self::new()
            });
        }
        Self::from_blocks(vec![
            Block::new(super::BlockType::Text, vec![TextSegment::plain(value)])
                .with_id(BlockId::new(LEGACY_BLOCK_ID)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{BlockType, INITIAL_BLOCK_ID};

    #[test]
    fn test_parse_value_reads_blocks() {
        let doc = Document::parse_value(
            r#"[{"id":"a","type":"h1","content":[{"text":"Title","bold":true}]},
                {"id":"b","type":"number","content":[]}]"#,
        )
        .unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.blocks()[0].block_type, BlockType::H1);
        assert_eq!(doc.blocks()[0].content, vec![TextSegment::bold("Title")]);
        assert_eq!(doc.blocks()[1].content, vec![TextSegment::default()]);
    }

    #[test]
    fn test_parse_value_errors() {
        assert!(matches!(Document::parse_value("[]"), Err(ValueError::Empty)));
        assert!(matches!(Document::parse_value("{}"), Err(ValueError::NotAnArray)));
        assert!(matches!(Document::parse_value("[{"), Err(ValueError::Json(_))));
        assert!(matches!(
            Document::parse_value(r#"[{"id":"a","type":"quote","content":[]}]"#),
            Err(ValueError::Json(_))
        ));
    }

    #[test]
    fn test_legacy_string_content_is_markup() {
        let doc = Document::parse_value(r#"[{"id":7,"type":"text","content":"a<b>b</b>"}]"#)
            .unwrap();
        assert_eq!(doc.blocks()[0].id.as_str(), "7");
        assert_eq!(
            doc.blocks()[0].content,
            vec![TextSegment::plain("a"), TextSegment::bold("b")]
        );
    }

    #[test]
    fn test_lossy_fallbacks() {
        assert_eq!(Document::from_value_lossy(""), Document::new());
        assert_eq!(Document::from_value_lossy("   "), Document::new());
        assert_eq!(Document::from_value_lossy("[]"), Document::new());
        assert_eq!(Document::from_value_lossy("{\"a\":1}"), Document::new());
        assert_eq!(Document::from_value_lossy("[not json"), Document::new());
        assert_eq!(
            Document::from_value_lossy("")
                .blocks()[0]
                .id
                .as_str(),
            INITIAL_BLOCK_ID
        );
    }

    #[test]
    fn test_lossy_plain_text_becomes_legacy_block() {
        let doc = Document::from_value_lossy("Old <notes>");
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].id.as_str(), LEGACY_BLOCK_ID);
        assert_eq!(doc.blocks()[0].plain_text(), "Old <notes>");
    }
}
