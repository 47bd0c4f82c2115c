//! Block document model and editing API.
//!
//! A [`Document`] is an ordered, never-empty list of [`Block`]s. Each block
//! has a stable id, a [`BlockType`] and styled content. Structural edits
//! (split, merge, move) live in [`block_ops`]; reading serialized values from
//! the host lives in [`value`].

use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;
use uuid::Uuid;

use crate::codec::{self, TextSegment};

pub mod block_ops;
pub mod value;

pub use block_ops::{DropSide, MergeOutcome, SplitOutcome};
pub use value::ValueError;

/// Id of the block a fresh document starts with.
pub const INITIAL_BLOCK_ID: &str = "1";

/// Opaque block identifier, unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "IdRepr")]
pub struct BlockId(String);

/// Hosts sometimes hand over numeric ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(serde_json::Number),
}

impl From<IdRepr> for BlockId {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Text(text) => Self(text),
            IdRepr::Number(number) => Self(number.to_string()),
        }
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn fresh() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Text,
    H1,
    H2,
    H3,
    Bullet,
    Number,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Text,
        BlockType::H1,
        BlockType::H2,
        BlockType::H3,
        BlockType::Bullet,
        BlockType::Number,
    ];

    /// Serialized name, also accepted as a slash-menu query.
    pub fn key(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::Bullet => "bullet",
            BlockType::Number => "number",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockType::Text => "Text",
            BlockType::H1 => "Heading 1",
            BlockType::H2 => "Heading 2",
            BlockType::H3 => "Heading 3",
            BlockType::Bullet => "Bulleted list",
            BlockType::Number => "Numbered list",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BlockType::Text => "Just start writing with plain text",
            BlockType::H1 => "Big section heading",
            BlockType::H2 => "Medium section heading",
            BlockType::H3 => "Small section heading",
            BlockType::Bullet => "Create a simple bulleted list",
            BlockType::Number => "Create a list with numbering",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockType::Bullet | BlockType::Number)
    }

    pub fn html_tag(self) -> &'static str {
        match self {
            BlockType::Text => "p",
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::Bullet | BlockType::Number => "li",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default, deserialize_with = "codec::deserialize_content")]
    pub content: Vec<TextSegment>,
    /// Carried through for hosts that track a checked state; never edited here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Block {
    /// A block with a fresh id and normalized content.
    pub fn new(block_type: BlockType, content: Vec<TextSegment>) -> Self {
        Self {
            id: BlockId::fresh(),
            block_type,
            content: codec::normalize(content),
            completed: None,
        }
    }

    pub fn empty(block_type: BlockType) -> Self {
        Self::new(block_type, Vec::new())
    }

    pub fn initial() -> Self {
        Self {
            id: BlockId::new(INITIAL_BLOCK_ID),
            ..Self::empty(BlockType::Text)
        }
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = id;
        self
    }

    pub fn with_fresh_id(self) -> Self {
        self.with_id(BlockId::fresh())
    }

    pub fn plain_text(&self) -> String {
        codec::plain_text(&self.content)
    }

    pub fn markup(&self) -> String {
        codec::to_markup(&self.content)
    }

    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|segment| segment.text.is_empty())
    }
}

/// A partial update applied by [`Document::update_block`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPatch {
    pub block_type: Option<BlockType>,
    pub content: Option<Vec<TextSegment>>,
    pub completed: Option<Option<bool>>,
}

impl BlockPatch {
    pub fn block_type(block_type: BlockType) -> Self {
        Self {
            block_type: Some(block_type),
            ..Self::default()
        }
    }

    pub fn content(content: Vec<TextSegment>) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: Vec<TextSegment>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.block_type.is_none() && self.content.is_none() && self.completed.is_none()
    }

    fn apply(&self, block: &mut Block) {
        if let Some(block_type) = self.block_type {
            block.block_type = block_type;
        }
        if let Some(content) = &self.content {
            block.content = codec::normalize(content.clone());
        }
        if let Some(completed) = self.completed {
            block.completed = completed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),
    #[error("cannot remove the only block")]
    LastBlock,
    #[error("selected blocks are not contiguous")]
    NonContiguousSelection,
    #[error("nothing to insert")]
    EmptyInsert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::initial()],
        }
    }

    /// Builds a document from blocks, normalizing content. An empty list
    /// yields the initial single-block document.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::new();
        }
        let blocks = blocks
            .into_iter()
            .map(|mut block| {
                block.content = codec::normalize(std::mem::take(&mut block.content));
                block
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|block| block.id.clone()).collect()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    pub(crate) fn require_index(&self, id: &BlockId) -> Result<usize, EditError> {
        self.index_of(id)
            .ok_or_else(|| EditError::BlockNotFound(id.clone()))
    }

    pub fn previous(&self, id: &BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn next(&self, id: &BlockId) -> Option<&Block> {
        let index = self.index_of(id)?;
        self.blocks.get(index + 1)
    }

    /// Inserts a block with a fresh id directly after `after`. An unknown
    /// `after` inserts at the front.
    pub fn insert_block_after(
        &mut self,
        after: &BlockId,
        block_type: BlockType,
        content: Vec<TextSegment>,
    ) -> BlockId {
        let index = self.index_of(after).map(|i| i + 1).unwrap_or(0);
        let block = Block::new(block_type, content);
        let id = block.id.clone();
        self.blocks.insert(index, block);
        debug!(block = %id, index, "inserted block");
        id
    }

    /// Removes one block and returns the id of the block that preceded it.
    pub fn remove_block(&mut self, id: &BlockId) -> Result<Option<BlockId>, EditError> {
        if self.blocks.len() <= 1 {
            return Err(EditError::LastBlock);
        }
        let index = self.require_index(id)?;
        self.blocks.remove(index);
        debug!(block = %id, index, "removed block");
        Ok(index.checked_sub(1).map(|i| self.blocks[i].id.clone()))
    }

    /// Removes every listed block. When nothing would remain a fresh empty
    /// text block is added. Returns the block to focus afterwards: the one
    /// above the first removed block, or the first block.
    pub fn remove_blocks(&mut self, ids: &[BlockId]) -> Option<BlockId> {
        let doomed: HashSet<&BlockId> = ids.iter().collect();
        let first = self.blocks.iter().position(|b| doomed.contains(&b.id))?;
        let before = self.blocks.len();
        self.blocks.retain(|block| !doomed.contains(&block.id));
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty(BlockType::Text));
        }
        debug!(removed = before - self.blocks.len(), "removed blocks");
        let focus = first.saturating_sub(1).min(self.blocks.len() - 1);
        Some(self.blocks[focus].id.clone())
    }

    pub fn update_block(&mut self, id: &BlockId, patch: &BlockPatch) -> Result<(), EditError> {
        let index = self.require_index(id)?;
        patch.apply(&mut self.blocks[index]);
        Ok(())
    }

    /// Applies `patch` to every listed block that exists; returns how many
    /// were updated.
    pub fn update_blocks(&mut self, ids: &[BlockId], patch: &BlockPatch) -> usize {
        let targets: HashSet<&BlockId> = ids.iter().collect();
        let mut updated = 0;
        for block in self.blocks.iter_mut().filter(|b| targets.contains(&b.id)) {
            patch.apply(block);
            updated += 1;
        }
        updated
    }

    /// Replaces the blocks in `span` with `replacement`.
    pub(crate) fn splice(&mut self, span: RangeInclusive<usize>, replacement: Vec<Block>) {
        self.blocks.splice(span, replacement);
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty(BlockType::Text));
        }
    }

    pub(crate) fn insert_blocks_at(&mut self, index: usize, blocks: Vec<Block>) {
        let index = index.min(self.blocks.len());
        self.blocks.splice(index..index, blocks);
    }

    /// One-based position of a numbered item within its run of consecutive
    /// numbered blocks. `None` for other block types.
    pub fn list_number(&self, index: usize) -> Option<usize> {
        let block = self.blocks.get(index)?;
        if block.block_type != BlockType::Number {
            return None;
        }
        let preceding = self.blocks[..index]
            .iter()
            .rev()
            .take_while(|b| b.block_type == BlockType::Number)
            .count();
        Some(preceding + 1)
    }

    /// The serialized value hosts receive: a JSON array of blocks.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.blocks).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.blocks).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_html(&self) -> String {
        blocks_to_html(&self.blocks)
    }

    /// Plain text, one line per block.
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders blocks as HTML. Consecutive list items of one type share a
/// `<ul>` or `<ol>` wrapper.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<BlockType> = None;
    for block in blocks {
        let list = block.block_type.is_list().then_some(block.block_type);
        if open_list != list {
            if let Some(previous) = open_list {
                out.push_str(list_close(previous));
            }
            if let Some(current) = list {
                out.push_str(list_open(current));
            }
            open_list = list;
        }
        let tag = block.block_type.html_tag();
        out.push_str(&format!("<{tag}>{}</{tag}>", block.markup()));
    }
    if let Some(previous) = open_list {
        out.push_str(list_close(previous));
    }
    out
}

fn list_open(block_type: BlockType) -> &'static str {
    if block_type == BlockType::Number { "<ol>" } else { "<ul>" }
}

fn list_close(block_type: BlockType) -> &'static str {
    if block_type == BlockType::Number { "</ol>" } else { "</ul>" }
}
