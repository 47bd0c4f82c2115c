//! Caret and range mapping between linear offsets and positions in runs.
//!
//! Offsets count grapheme clusters across the concatenated plain text of a
//! block's runs, so a caret never lands inside a combining sequence or an
//! emoji. A [`RunPosition`] addresses the same place as a run index plus a
//! byte offset into that run's text.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::codec::{self, TextSegment};

/// A linear selection inside one block, `start <= end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn collapsed(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    pub fn clamp(self, max: usize) -> Self {
        Self::new(self.start.min(max), self.end.min(max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPosition {
    pub run: usize,
    pub byte: usize,
}

pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

pub fn text_len(runs: &[TextSegment]) -> usize {
    runs.iter().map(|run| grapheme_len(&run.text)).sum()
}

fn byte_index(text: &str, graphemes: usize) -> usize {
    text.grapheme_indices(true)
        .nth(graphemes)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Locates `offset` in the runs. Offsets past the end clamp to the end; an
/// offset on a run boundary resolves to the end of the left run.
pub fn position_at(runs: &[TextSegment], offset: usize) -> RunPosition {
    let mut walked = 0;
    for (index, run) in runs.iter().enumerate() {
        let len = grapheme_len(&run.text);
        if walked + len >= offset {
            return RunPosition {
                run: index,
                byte: byte_index(&run.text, offset - walked),
            };
        }
        walked += len;
    }
    match runs.len() {
        0 => RunPosition { run: 0, byte: 0 },
        n => RunPosition {
            run: n - 1,
            byte: runs[n - 1].text.len(),
        },
    }
}

/// Linear offset of a run position; the inverse of [`position_at`].
pub fn offset_of(runs: &[TextSegment], position: RunPosition) -> usize {
    let before: usize = runs
        .iter()
        .take(position.run)
        .map(|run| grapheme_len(&run.text))
        .sum();
    let within = runs
        .get(position.run)
        .and_then(|run| run.text.get(..position.byte.min(run.text.len())))
        .map(grapheme_len)
        .unwrap_or(0);
    before + within
}

/// Splits the runs at `offset`. Neither side is normalized.
pub fn split_at(runs: &[TextSegment], offset: usize) -> (Vec<TextSegment>, Vec<TextSegment>) {
    if runs.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let position = position_at(runs, offset);
    let run = &runs[position.run];

    let mut before = runs[..position.run].to_vec();
    before.push(TextSegment {
        text: run.text[..position.byte].to_string(),
        ..run.clone()
    });

    let mut after = vec![TextSegment {
        text: run.text[position.byte..].to_string(),
        ..run.clone()
    }];
    after.extend_from_slice(&runs[position.run + 1..]);

    (before, after)
}

/// The runs covered by `range`, normalized.
pub fn slice(runs: &[TextSegment], range: TextRange) -> Vec<TextSegment> {
    let (_, tail) = split_at(runs, range.start);
    let (inner, _) = split_at(&tail, range.len());
    codec::normalize(inner)
}

pub fn delete_range(runs: &[TextSegment], range: TextRange) -> Vec<TextSegment> {
    let (mut before, _) = split_at(runs, range.start);
    let (_, after) = split_at(runs, range.end);
    before.extend(after);
    codec::normalize(before)
}

/// Inserts plain `text` at `offset`. The inserted text takes the attributes
/// of the run to its left, or of the first run at offset zero.
pub fn insert_text(runs: &[TextSegment], offset: usize, text: &str) -> Vec<TextSegment> {
    let mut out = runs.to_vec();
    if out.is_empty() {
        out.push(TextSegment::default());
    }
    let position = position_at(&out, offset);
    out[position.run].text.insert_str(position.byte, text);
    codec::normalize(out)
}

/// Grapheme offset at which the last occurrence of `needle` starts in the
/// plain text of `runs`.
pub fn find_last(runs: &[TextSegment], needle: &str) -> Option<usize> {
    let plain = codec::plain_text(runs);
    let byte = plain.rfind(needle)?;
    Some(grapheme_len(&plain[..byte]))
}

pub fn is_at_start(range: TextRange) -> bool {
    range.start == 0
}

pub fn is_at_end(runs: &[TextSegment], range: TextRange) -> bool {
    range.end >= text_len(runs)
}
