use blockdoc::caret;
use blockdoc::codec::{self, Attributes, TextSegment};
use blockdoc_naive_oracle as oracle;
use proptest::collection::vec;
use proptest::prelude::*;
mod proptest_config;

fn attributes() -> impl Strategy<Value = Attributes> {
    (any::<bool>(), any::<bool>()).prop_map(|(bold, underline)| Attributes { bold, underline })
}

fn segment() -> impl Strategy<Value = TextSegment> {
    ("[a-z <>&\"']{0,6}", attributes()).prop_map(|(text, attrs)| TextSegment::styled(text, attrs))
}

fn segments() -> impl Strategy<Value = Vec<TextSegment>> {
    vec(segment(), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]

    #[test]
    fn normalize_matches_oracle(runs in segments()) {
        let normalized = codec::normalize(runs.clone());
        prop_assert_eq!(&normalized, &oracle::normalize(&runs));
        prop_assert!(codec::is_normalized(&normalized));
        prop_assert_eq!(codec::plain_text(&normalized), codec::plain_text(&runs));
    }

    #[test]
    fn markup_preserves_normalized_runs(runs in segments()) {
        let normalized = codec::normalize(runs);
        let markup = codec::to_markup(&normalized);
        prop_assert_eq!(codec::from_markup(&markup), normalized);
    }

    #[test]
    fn split_matches_oracle(runs in segments(), offset in 0usize..50) {
        let runs = codec::normalize(runs);
        let (before, after) = caret::split_at(&runs, offset);
        let (expected_before, expected_after) = oracle::split(&runs, offset);
        prop_assert_eq!(codec::normalize(before), expected_before);
        prop_assert_eq!(codec::normalize(after), expected_after);
    }

    #[test]
    fn insert_matches_oracle(runs in segments(), offset in 0usize..50, text in "[a-z]{1,4}") {
        let runs = codec::normalize(runs);
        prop_assert_eq!(
            caret::insert_text(&runs, offset, &text),
            oracle::insert(&runs, offset, &text)
        );
    }

    #[test]
    fn delete_then_length_adds_up(runs in segments(), a in 0usize..40, b in 0usize..40) {
        let runs = codec::normalize(runs);
        let len = caret::text_len(&runs);
        let range = caret::TextRange::new(a, b).clamp(len);
        let left = caret::delete_range(&runs, range);
        prop_assert_eq!(caret::text_len(&left), len - range.len());
        prop_assert!(codec::is_normalized(&left));
    }

    #[test]
    fn position_and_offset_agree(runs in segments(), offset in 0usize..50) {
        let runs = codec::normalize(runs);
        let clamped = offset.min(caret::text_len(&runs));
        let position = caret::position_at(&runs, offset);
        prop_assert_eq!(caret::offset_of(&runs, position), clamped);
    }
}
