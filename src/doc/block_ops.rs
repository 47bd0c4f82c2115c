//! Structural block edits: splitting, merging and reordering.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Block, BlockId, BlockType, Document, EditError};
use crate::caret::{self, TextRange};
use crate::codec;

/// Which half of the target block a drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropSide {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The block was split; the caret belongs at the start of `new_block`.
    Split { new_block: BlockId },
    /// An empty list item was turned into a text block instead of splitting.
    ExitedList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The block was appended to `into`; `caret` is the grapheme offset of
    /// the join.
    Merged { into: BlockId, caret: usize },
    /// A list item at the top of the document became a text block.
    ExitedList,
    /// First block, not a list item: nothing to do.
    Unchanged,
}

impl Document {
    /// Moves `ids` as a group next to `target`, keeping their relative
    /// document order. When `target` is itself being moved the group lands at
    /// the target's original index.
    pub fn move_blocks(
        &mut self,
        ids: &[BlockId],
        target: &BlockId,
        side: DropSide,
    ) -> Result<(), EditError> {
        let target_index = self.require_index(target)?;
        if !self.blocks.iter().any(|block| ids.contains(&block.id)) {
            return Ok(());
        }

        let (moving, mut remaining): (Vec<Block>, Vec<Block>) = self
            .blocks
            .drain(..)
            .partition(|block| ids.contains(&block.id));

        let insert_at = match remaining.iter().position(|block| &block.id == target) {
            Some(index) => match side {
                DropSide::Above => index,
                DropSide::Below => index + 1,
            },
            None => target_index.min(remaining.len()),
        };
        debug!(moved = moving.len(), insert_at, "moving blocks");
        remaining.splice(insert_at..insert_at, moving);
        self.blocks = remaining;
        Ok(())
    }

    /// Splits a block around `range`: text before the range stays, text after
    /// it moves to a new block inserted below. The new block continues a list
    /// and is plain text otherwise. An empty list item leaves the list instead.
    pub fn split_block(&mut self, id: &BlockId, range: TextRange) -> Result<SplitOutcome, EditError> {
        let index = self.require_index(id)?;
        let block = &self.blocks[index];

        if block.block_type.is_list() && block.plain_text().trim().is_empty() {
            self.blocks[index].block_type = BlockType::Text;
            return Ok(SplitOutcome::ExitedList);
        }

        let (before, _) = caret::split_at(&block.content, range.start);
        let (_, after) = caret::split_at(&block.content, range.end);
        let new_type = if block.block_type.is_list() {
            block.block_type
        } else {
            BlockType::Text
        };

        self.blocks[index].content = codec::normalize(before);
        let new_block = Block::new(new_type, after);
        let new_id = new_block.id.clone();
        self.blocks.insert(index + 1, new_block);
        debug!(block = %id, new_block = %new_id, "split block");
        Ok(SplitOutcome::Split { new_block: new_id })
    }

    /// Joins a block onto the end of the one above it and removes it. At the
    /// top of the document a list item becomes text instead.
    pub fn merge_with_previous(&mut self, id: &BlockId) -> Result<MergeOutcome, EditError> {
        let index = self.require_index(id)?;
        if index == 0 {
            let block = &mut self.blocks[0];
            if block.block_type.is_list() {
                block.block_type = BlockType::Text;
                return Ok(MergeOutcome::ExitedList);
            }
            return Ok(MergeOutcome::Unchanged);
        }

        let current = self.blocks.remove(index);
        let previous = &mut self.blocks[index - 1];
        let caret = caret::text_len(&previous.content);
        let joined = format!("{}{}", previous.markup(), current.markup());
        previous.content = codec::from_markup(&joined);
        debug!(block = %id, into = %previous.id, caret, "merged block");
        Ok(MergeOutcome::Merged {
            into: previous.id.clone(),
            caret,
        })
    }

    /// Turns a list item into a text block; other types are left alone.
    pub fn exit_list(&mut self, id: &BlockId) -> Result<bool, EditError> {
        let index = self.require_index(id)?;
        let block = &mut self.blocks[index];
        if !block.block_type.is_list() {
            return Ok(false);
        }
        block.block_type = BlockType::Text;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextSegment;
    use crate::doc::BlockPatch;

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

    fn order(doc: &Document) -> Vec<String> {
        doc.blocks().iter().map(|b| b.id.to_string()).collect()
    }

    fn ids(raw: &[&str]) -> Vec<BlockId> {
        raw.iter().map(|s| BlockId::new(*s)).collect()
    }

    #[test]
    fn test_move_group_below_target() {
        let mut doc = doc(&["a", "b", "c", "d"]);
        doc.move_blocks(&ids(&["0", "2"]), &BlockId::new("3"), DropSide::Below)
            .unwrap();
        assert_eq!(order(&doc), vec!["1", "3", "0", "2"]);
    }

    #[test]
    fn test_move_uses_document_order_not_selection_order() {
        let mut doc = doc(&["a", "b", "c", "d"]);
        doc.move_blocks(&ids(&["3", "1"]), &BlockId::new("0"), DropSide::Above)
            .unwrap();
        assert_eq!(order(&doc), vec!["1", "3", "0", "2"]);
    }

    #[test]
    fn test_move_onto_moving_block_falls_back_to_index() {
        let mut doc = doc(&["a", "b", "c", "d"]);
        doc.move_blocks(&ids(&["0", "1"]), &BlockId::new("1"), DropSide::Below)
            .unwrap();
        assert_eq!(order(&doc), vec!["2", "0", "1", "3"]);
    }

    #[test]
    fn test_move_unknown_target() {
        let mut doc = doc(&["a", "b"]);
        assert_eq!(
            doc.move_blocks(&ids(&["0"]), &BlockId::new("x"), DropSide::Above),
            Err(EditError::BlockNotFound(BlockId::new("x")))
        );
        assert_eq!(order(&doc), vec!["0", "1"]);
    }

    #[test]
    fn test_split_middle() {
        let mut doc = doc(&["hello"]);
        let outcome = doc.split_block(&BlockId::new("0"), TextRange::collapsed(2)).unwrap();
        let SplitOutcome::Split { new_block } = outcome else {
            panic!("expected a split");
        };
        assert_eq!(doc.blocks()[0].plain_text(), "he");
        assert_eq!(doc.get(&new_block).unwrap().plain_text(), "llo");
        assert_eq!(doc.get(&new_block).unwrap().block_type, BlockType::Text);
    }

    #[test]
    fn test_split_discards_selected_range() {
        let mut doc = doc(&["hello"]);
        doc.split_block(&BlockId::new("0"), TextRange::new(1, 4)).unwrap();
        assert_eq!(doc.to_plain_text(), "h\no");
    }

    #[test]
    fn test_split_heading_continues_as_text_and_list_continues() {
        let mut doc = doc(&["ab", "cd"]);
        doc.update_block(&BlockId::new("0"), &BlockPatch::block_type(BlockType::H2))
            .unwrap();
        doc.update_block(&BlockId::new("1"), &BlockPatch::block_type(BlockType::Bullet))
            .unwrap();
        doc.split_block(&BlockId::new("0"), TextRange::collapsed(2)).unwrap();
        doc.split_block(&BlockId::new("1"), TextRange::collapsed(1)).unwrap();
        let types: Vec<_> = doc.blocks().iter().map(|b| b.block_type).collect();
        assert_eq!(
            types,
            vec![BlockType::H2, BlockType::Text, BlockType::Bullet, BlockType::Bullet]
        );
        assert!(doc.blocks()[1].is_empty());
    }

    #[test]
    fn test_split_empty_list_item_exits_list() {
        let mut doc = doc(&["  "]);
        let id = BlockId::new("0");
        doc.update_block(&id, &BlockPatch::block_type(BlockType::Number))
            .unwrap();
        assert_eq!(
            doc.split_block(&id, TextRange::collapsed(0)),
            Ok(SplitOutcome::ExitedList)
        );
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Text);
    }

    #[test]
    fn test_merge_keeps_styles_and_reports_caret() {
        let mut doc = Document::from_blocks(vec![
            Block::new(BlockType::Text, vec![TextSegment::bold("ab")]).with_id(BlockId::new("0")),
            Block::new(BlockType::Bullet, vec![TextSegment::plain("cd")]).with_id(BlockId::new("1")),
        ]);
        let outcome = doc.merge_with_previous(&BlockId::new("1")).unwrap();
        assert_eq!(
            outcome,
            MergeOutcome::Merged {
                into: BlockId::new("0"),
                caret: 2
            }
        );
        assert_eq!(
            doc.blocks()[0].content,
            vec![TextSegment::bold("ab"), TextSegment::plain("cd")]
        );
        assert_eq!(doc.blocks()[0].block_type, BlockType::Text);
    }

    #[test]
    fn test_merge_first_block() {
        let mut doc = doc(&["a"]);
        let id = BlockId::new("0");
        assert_eq!(doc.merge_with_previous(&id), Ok(MergeOutcome::Unchanged));
        doc.update_block(&id, &BlockPatch::block_type(BlockType::Bullet))
            .unwrap();
        assert_eq!(doc.merge_with_previous(&id), Ok(MergeOutcome::ExitedList));
        assert_eq!(doc.blocks()[0].block_type, BlockType::Text);
    }

    #[test]
    fn test_split_then_merge_restores_content() {
        let original = vec![TextSegment::plain("ab"), TextSegment::underline("cd")];
        let mut doc = Document::from_blocks(vec![
            Block::new(BlockType::Text, original.clone()).with_id(BlockId::new("0")),
        ]);
        let SplitOutcome::Split { new_block } =
            doc.split_block(&BlockId::new("0"), TextRange::collapsed(3)).unwrap()
        else {
            panic!("expected a split");
        };
        doc.merge_with_previous(&new_block).unwrap();
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].content, original);
    }
}
