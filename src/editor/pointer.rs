//! Pointer handling: rectangle selection, block clicks and drag reordering.

use tracing::debug;

use super::{Editor, Modifiers};
use crate::doc::{BlockId, DropSide};
use crate::selection::{
    BlockBounds, DragState, DropTarget, Point, PointerTarget, Rect, RectSelection,
};

impl Editor {
    /// Pointer pressed at `at`, in content coordinates.
    ///
    /// On empty canvas, or on text with Shift held, this starts a rectangle
    /// selection. A plain press on text clears the block selection and leaves
    /// the press to the text surface.
    pub fn pointer_down(&mut self, target: PointerTarget, at: Point, modifiers: Modifiers) {
        if self.config.disabled {
            return;
        }
        match target {
            PointerTarget::BlockActions | PointerTarget::Menu => return,
            PointerTarget::Text(id) if !modifiers.shift => {
                self.selection.clear();
                if self.surfaces.contains_key(&id) {
                    self.set_focus(Some(id));
                }
                return;
            }
            PointerTarget::Text(_) | PointerTarget::Canvas => {}
        }
        if !modifiers.shift {
            self.selection.clear();
        }
        self.set_focus(None);
        self.rect_select = Some(RectSelection::start(at));
    }

    /// Pointer moved to `at`; while a rectangle is being drawn the blocks it
    /// touches become the selection.
    pub fn pointer_move(&mut self, at: Point, layout: &[BlockBounds]) {
        let Some(rect) = self.rect_select.as_mut() else {
            return;
        };
        self.selection = rect.update(at, layout);
    }

    pub fn pointer_up(&mut self) {
        if self.rect_select.take().is_some() {
            debug!(selected = self.selection.len(), "rectangle selection finished");
        }
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.rect_select.as_ref().map(RectSelection::rect)
    }

    /// A click on a block outside the current block selection clears it.
    pub fn click_block(&mut self, block_id: &BlockId) {
        if !self.selection.is_empty() && !self.selection.contains(block_id) {
            self.selection.clear();
        }
    }

    /// Dragging starts on a block's handle. An unselected block becomes the
    /// whole selection; a selected one drags the selection with it.
    pub fn drag_start(&mut self, block_id: &BlockId) {
        if self.config.disabled || self.document.index_of(block_id).is_none() {
            return;
        }
        if !self.selection.contains(block_id) {
            self.selection.clear();
            self.selection.insert(block_id.clone());
        }
        self.drag = Some(DragState {
            dragged: block_id.clone(),
            over: None,
        });
    }

    /// The drag hovers `target`, laid out at `bounds`.
    pub fn drag_over(&mut self, target: &BlockId, bounds: &Rect, pointer_y: f64) -> Option<DropSide> {
        let drag = self.drag.as_mut()?;
        let side = DropSide::from_pointer(bounds, pointer_y);
        drag.over = Some(DropTarget {
            block_id: target.clone(),
            side,
        });
        Some(side)
    }

    /// Drops on the hovered target. Returns whether blocks moved.
    pub fn drop_blocks(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let Some(over) = drag.over else {
            return false;
        };
        let ids = if self.selection.is_empty() {
            vec![drag.dragged]
        } else {
            self.selection.ordered_in(&self.document)
        };
        match self.document.move_blocks(&ids, &over.block_id, over.side) {
            Ok(()) => {
                self.selection.clear();
                self.commit();
                true
            }
            Err(err) => {
                debug!(%err, "drop ignored");
                false
            }
        }
    }

    pub fn drag_end(&mut self) {
        self.drag = None;
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }
}
