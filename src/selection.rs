//! Block-granularity selection: rectangle selection, drag state and drop
//! placement.
//!
//! Geometry is in content coordinates: relative to the editor content's
//! top-left corner, with the vertical scroll offset added, so rectangles stay
//! stable while the content scrolls.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::doc::{BlockId, Document, DropSide};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle spanned by two corners, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Intersection with touching edges counted as overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// Converts viewport pointer positions to content coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Top-left of the content area in viewport coordinates.
    pub origin: Point,
    pub scroll_top: f64,
}

impl Viewport {
    pub fn to_content(&self, client: Point) -> Point {
        Point {
            x: client.x - self.origin.x,
            y: client.y - self.origin.y + self.scroll_top,
        }
    }
}

/// Where a block is laid out, in content coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockBounds {
    pub id: BlockId,
    pub rect: Rect,
}

impl BlockBounds {
    pub fn new(id: BlockId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// The set of selected blocks. Membership is what matters; use
/// [`SelectionSet::ordered_in`] when document order is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<BlockId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = BlockId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn insert(&mut self, id: BlockId) {
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockId> {
        self.ids.iter()
    }

    /// Drops ids that no longer exist in `doc`.
    pub fn retain_existing(&mut self, doc: &Document) {
        self.ids.retain(|id| doc.index_of(id).is_some());
    }

    /// Selected ids in document order.
    pub fn ordered_in(&self, doc: &Document) -> Vec<BlockId> {
        doc.blocks()
            .iter()
            .filter(|block| self.contains(&block.id))
            .map(|block| block.id.clone())
            .collect()
    }

    /// The index span of the selection when it forms one unbroken run of
    /// blocks.
    pub fn contiguous_span(&self, doc: &Document) -> Option<RangeInclusive<usize>> {
        let indices: Vec<usize> = self.ids.iter().filter_map(|id| doc.index_of(id)).collect();
        let first = *indices.iter().min()?;
        let last = *indices.iter().max()?;
        (last - first + 1 == indices.len()).then_some(first..=last)
    }
}

/// Every block whose bounds touch `rect`.
pub fn blocks_in_rect(rect: &Rect, layout: &[BlockBounds]) -> SelectionSet {
    SelectionSet::from_ids(
        layout
            .iter()
            .filter(|bounds| rect.intersects(&bounds.rect))
            .map(|bounds| bounds.id.clone()),
    )
}

/// An in-progress rectangle selection started on empty canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RectSelection {
    origin: Point,
    rect: Rect,
}

impl RectSelection {
    pub fn start(origin: Point) -> Self {
        Self {
            origin,
            rect: Rect::from_points(origin, origin),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Stretches the rectangle to `pointer` and returns the blocks it now
    /// touches, which replace the live selection.
    pub fn update(&mut self, pointer: Point, layout: &[BlockBounds]) -> SelectionSet {
        self.rect = Rect::from_points(self.origin, pointer);
        blocks_in_rect(&self.rect, layout)
    }
}

impl DropSide {
    /// Upper half of the hovered block drops above it, lower half below.
    pub fn from_pointer(bounds: &Rect, pointer_y: f64) -> Self {
        if pointer_y < bounds.mid_y() {
            DropSide::Above
        } else {
            DropSide::Below
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub block_id: BlockId,
    pub side: DropSide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub dragged: BlockId,
    pub over: Option<DropTarget>,
}

/// What a pointer press landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty editor canvas, including block padding outside the text.
    Canvas,
    /// A block's drag handle or plus button.
    BlockActions,
    /// Any open menu or popover.
    Menu,
    /// The editable text of a block.
    Text(BlockId),
}
