use blockdoc::caret::TextRange;
use blockdoc::codec::TextSegment;
use blockdoc::doc::{
    Block, BlockId, BlockPatch, BlockType, Document, DropSide, EditError, MergeOutcome,
    SplitOutcome,
};
use blockdoc_naive_oracle as oracle;
use proptest::prelude::*;
use proptest::sample::subsequence;
mod proptest_config;

fn numbered_doc(count: usize) -> Document {
    Document::from_blocks(
        (0..count)
            .map(|i| {
                Block::new(BlockType::Text, vec![TextSegment::plain(format!("b{i}"))])
                    .with_id(BlockId::new(i.to_string()))
            })
            .collect(),
    )
}

fn id_strings(doc: &Document) -> Vec<String> {
    doc.blocks().iter().map(|b| b.id.as_str().to_string()).collect()
}

fn side() -> impl Strategy<Value = DropSide> {
    prop_oneof![Just(DropSide::Above), Just(DropSide::Below)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]

    #[test]
    fn move_matches_oracle(
        count in 1usize..8,
        picks in subsequence((0..8usize).collect::<Vec<_>>(), 0..4),
        target in 0usize..8,
        side in side(),
    ) {
        let mut doc = numbered_doc(count);
        let before = id_strings(&doc);
        let moving: Vec<String> = picks.iter().filter(|i| **i < count).map(|i| i.to_string()).collect();
        let target = (target % count).to_string();
        let ids: Vec<BlockId> = moving.iter().map(|s| BlockId::new(s.as_str())).collect();

        doc.move_blocks(&ids, &BlockId::new(target.as_str()), side).unwrap();
        let after = id_strings(&doc);
        prop_assert_eq!(&after, &oracle::move_ids(&before, &moving, &target, side));

        let mut sorted_before = before.clone();
        let mut sorted_after = after.clone();
        sorted_before.sort();
        sorted_after.sort();
        prop_assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn split_then_merge_restores_text(text in "[a-z]{0,12}", at in 0usize..14) {
        let block = Block::new(BlockType::Text, vec![TextSegment::plain(text.clone())])
            .with_id(BlockId::new("a"));
        let mut doc = Document::from_blocks(vec![block]);
        let id = BlockId::new("a");
        let SplitOutcome::Split { new_block } = doc.split_block(&id, TextRange::collapsed(at)).unwrap() else {
            panic!("text blocks always split");
        };
        prop_assert_eq!(doc.block_count(), 2);
        let merged = doc.merge_with_previous(&new_block).unwrap();
        prop_assert_eq!(merged, MergeOutcome::Merged { into: id.clone(), caret: at.min(text.len()) });
        prop_assert_eq!(doc.get(&id).unwrap().plain_text(), text);
    }

    #[test]
    fn removal_never_empties_document(count in 1usize..6, picks in subsequence((0..6usize).collect::<Vec<_>>(), 0..6)) {
        let mut doc = numbered_doc(count);
        let ids: Vec<BlockId> = picks.iter().map(|i| BlockId::new(i.to_string())).collect();
        doc.remove_blocks(&ids);
        prop_assert!(doc.block_count() >= 1);
    }
}

#[test]
fn test_split_list_item_continues_list() {
    let mut doc = Document::from_blocks(vec![
        Block::new(BlockType::Number, vec![TextSegment::plain("one")]).with_id(BlockId::new("n")),
    ]);
    let outcome = doc.split_block(&BlockId::new("n"), TextRange::collapsed(3)).unwrap();
    let SplitOutcome::Split { new_block } = outcome else {
        panic!("expected a split");
    };
    assert_eq!(doc.get(&new_block).unwrap().block_type, BlockType::Number);
    assert_eq!(doc.list_number(1), Some(2));

    assert_eq!(doc.split_block(&new_block, TextRange::collapsed(0)).unwrap(), SplitOutcome::ExitedList);
    assert_eq!(doc.get(&new_block).unwrap().block_type, BlockType::Text);
    assert_eq!(doc.block_count(), 2);
}

#[test]
fn test_heading_split_yields_text() {
    let mut doc = Document::from_blocks(vec![
        Block::new(BlockType::H2, vec![TextSegment::plain("Head")]).with_id(BlockId::new("h")),
    ]);
    doc.split_block(&BlockId::new("h"), TextRange::collapsed(4)).unwrap();
    assert_eq!(doc.blocks()[1].block_type, BlockType::Text);
    assert!(doc.blocks()[1].is_empty());
}

#[test]
fn test_last_block_cannot_be_removed() {
    let mut doc = Document::new();
    let id = doc.blocks()[0].id.clone();
    assert_eq!(doc.remove_block(&id), Err(EditError::LastBlock));
}

#[test]
fn test_update_unknown_block() {
    let mut doc = Document::new();
    let missing = BlockId::new("missing");
    assert_eq!(
        doc.update_block(&missing, &BlockPatch::block_type(BlockType::H1)),
        Err(EditError::BlockNotFound(missing))
    );
}

#[test]
fn test_value_variants() {
    assert_eq!(Document::from_value_lossy("").ids(), vec![BlockId::new("1")]);
    assert_eq!(Document::from_value_lossy("[]").ids(), vec![BlockId::new("1")]);
    assert_eq!(Document::from_value_lossy("{not json").ids(), vec![BlockId::new("1")]);

    let legacy = Document::from_value_lossy("old <b>notes</b>");
    assert_eq!(legacy.ids(), vec![BlockId::new("legacy")]);
    assert_eq!(legacy.blocks()[0].plain_text(), "old <b>notes</b>");

    let numeric = Document::from_value_lossy(r#"[{"id":7,"type":"h3","content":"<b>x</b>"}]"#);
    assert_eq!(numeric.ids(), vec![BlockId::new("7")]);
    assert_eq!(numeric.blocks()[0].content, vec![TextSegment::bold("x")]);
}

#[test]
fn test_serialized_shape() {
    let doc = Document::from_blocks(vec![
        Block::new(BlockType::Bullet, vec![TextSegment::plain("a"), TextSegment::bold("b")])
            .with_id(BlockId::new("x")),
    ]);
    let value: serde_json::Value = serde_json::from_str(&doc.to_json()).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "id": "x",
            "type": "bullet",
            "content": [{"text": "a"}, {"text": "b", "bold": true}]
        }])
    );
    assert_eq!(Document::parse_value(&doc.to_json()).unwrap(), doc);
}
