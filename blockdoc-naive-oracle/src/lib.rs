//! A naive, simple oracle implementation for differential testing.
//!
//! Everything here works one character at a time and favours obviousness
//! over speed. Inputs are expected to be free of multi-codepoint grapheme
//! clusters, so characters and graphemes coincide.
use blockdoc::codec::{Attributes, TextSegment};
use blockdoc::doc::DropSide;

/// One character and the attributes it carries.
pub type StyledChar = (char, Attributes);

pub fn explode(segments: &[TextSegment]) -> Vec<StyledChar> {
    let mut out = Vec::new();
    for segment in segments {
        for ch in segment.text.chars() {
            out.push((ch, segment.attributes()));
        }
    }
    out
}

/// Regroups characters into maximal runs of equal attributes.
pub fn implode(chars: &[StyledChar]) -> Vec<TextSegment> {
    let mut out: Vec<TextSegment> = Vec::new();
    for &(ch, attrs) in chars {
        let extend = match out.last() {
            Some(last) => last.attributes() == attrs,
            None => false,
        };
        if extend {
            let last = out.len() - 1;
            out[last].text.push(ch);
        } else {
            out.push(TextSegment::styled(ch.to_string(), attrs));
        }
    }
    if out.is_empty() {
        out.push(TextSegment::default());
    }
    out
}

pub fn normalize(segments: &[TextSegment]) -> Vec<TextSegment> {
    implode(&explode(segments))
}

/// Runs before and after `offset`.
pub fn split(segments: &[TextSegment], offset: usize) -> (Vec<TextSegment>, Vec<TextSegment>) {
    let chars = explode(segments);
    let offset = offset.min(chars.len());
    (implode(&chars[..offset]), implode(&chars[offset..]))
}

/// Inserts `text` at `offset`, styled like the character before it.
pub fn insert(segments: &[TextSegment], offset: usize, text: &str) -> Vec<TextSegment> {
    let mut chars = explode(segments);
    let offset = offset.min(chars.len());
    let attrs = if offset == 0 {
        chars.first().map(|c| c.1).unwrap_or(Attributes::PLAIN)
    } else {
        chars[offset - 1].1
    };
    let mut at = offset;
    for ch in text.chars() {
        chars.insert(at, (ch, attrs));
        at += 1;
    }
    implode(&chars)
}

/// Reorders `order` the way a drop of `moving` next to `target` should.
pub fn move_ids(order: &[String], moving: &[String], target: &str, side: DropSide) -> Vec<String> {
    let Some(target_index) = order.iter().position(|id| id == target) else {
        return order.to_vec();
    };
    let group: Vec<String> = order
        .iter()
        .filter(|id| moving.contains(id))
        .cloned()
        .collect();
    if group.is_empty() {
        return order.to_vec();
    }

    let mut out = Vec::new();
    let mut placed = false;
    for id in order {
        if moving.contains(id) {
            continue;
        }
        if id == target && side == DropSide::Above {
            out.extend(group.iter().cloned());
            placed = true;
        }
        out.push(id.clone());
        if id == target && side == DropSide::Below {
            out.extend(group.iter().cloned());
            placed = true;
        }
    }
    if !placed {
        let at = target_index.min(out.len());
        for (i, id) in group.into_iter().enumerate() {
            out.insert(at + i, id);
        }
    }
    out
}
