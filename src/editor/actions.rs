//! Block-level commands: insertion and removal, the block selection, the
//! drag-handle menu, the plus button, and the clipboard.

use tracing::debug;

use super::{CaretPlacement, Editor};
use crate::clipboard::{self, ClipboardData, PasteOutcome};
use crate::codec::TextSegment;
use crate::doc::{BlockId, BlockPatch, BlockType};
use crate::menu::BlockMenu;

impl Editor {
    /// Inserts a block after `after` and places the caret in it once it is
    /// rendered.
    pub fn insert_block(
        &mut self,
        after: &BlockId,
        block_type: BlockType,
        content: Vec<TextSegment>,
        caret_at_start: bool,
    ) -> BlockId {
        let id = self.document.insert_block_after(after, block_type, content);
        self.commit();
        let placement = if caret_at_start {
            CaretPlacement::Start
        } else {
            CaretPlacement::End
        };
        self.request_caret(id.clone(), placement);
        id
    }

    /// Removes one block and moves the caret to the end of the block above.
    /// The last remaining block is never removed.
    pub fn remove_block(&mut self, block_id: &BlockId) -> bool {
        match self.document.remove_block(block_id) {
            Ok(previous) => {
                self.selection.retain_existing(&self.document);
                self.commit();
                if let Some(previous) = previous {
                    self.request_caret(previous, CaretPlacement::End);
                }
                true
            }
            Err(err) => {
                debug!(%err, "remove ignored");
                false
            }
        }
    }

    pub fn update_block(&mut self, block_id: &BlockId, patch: &BlockPatch) -> bool {
        let updated = self.document.update_block(block_id, patch).is_ok();
        if updated {
            self.commit();
        }
        updated
    }

    /// Selects every block and gives up text focus.
    pub fn select_all_blocks(&mut self) {
        self.selection = crate::selection::SelectionSet::from_ids(self.document.ids());
        self.set_focus(None);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Removes every selected block and focuses the block above the first of
    /// them.
    pub fn delete_selected(&mut self) {
        let ids = self.selection.ordered_in(&self.document);
        let Some(focus) = self.document.remove_blocks(&ids) else {
            return;
        };
        self.selection.clear();
        self.commit();
        self.request_caret(focus, CaretPlacement::Start);
    }

    /// The plus button: adds an empty text block below and opens the slash
    /// menu on it after it renders.
    pub fn add_block_below(&mut self, block_id: &BlockId) -> BlockId {
        let id = self.insert_block(block_id, BlockType::Text, Vec::new(), false);
        self.pending_slash = Some(id.clone());
        id
    }

    pub fn open_block_menu(&mut self, block_id: &BlockId) {
        if self.document.index_of(block_id).is_some() {
            self.block_menu = BlockMenu::Open {
                block_id: block_id.clone(),
                transforming: false,
            };
        }
    }

    /// Switches the open block menu to its "turn into" list.
    pub fn begin_transform(&mut self) {
        if let BlockMenu::Open { transforming, .. } = &mut self.block_menu {
            *transforming = true;
        }
    }

    pub fn close_block_menu(&mut self) {
        self.block_menu = BlockMenu::Closed;
    }

    /// Blocks a block-menu command applies to: the whole selection when the
    /// menu's block is part of it, otherwise the block alone.
    fn block_menu_targets(&self) -> Option<(BlockId, Vec<BlockId>)> {
        let block_id = self.block_menu.block_id()?.clone();
        let targets = if self.selection.contains(&block_id) {
            self.selection.ordered_in(&self.document)
        } else {
            vec![block_id.clone()]
        };
        Some((block_id, targets))
    }

    pub fn transform_from_menu(&mut self, block_type: BlockType) {
        let Some((_, targets)) = self.block_menu_targets() else {
            return;
        };
        let updated = self
            .document
            .update_blocks(&targets, &BlockPatch::block_type(block_type));
        debug!(updated, %block_type, "transformed blocks");
        self.close_block_menu();
        if updated > 0 {
            self.commit();
        }
    }

    pub fn delete_from_menu(&mut self) {
        let Some((block_id, _)) = self.block_menu_targets() else {
            return;
        };
        self.close_block_menu();
        if self.selection.contains(&block_id) {
            self.delete_selected();
        } else {
            self.remove_block(&block_id);
        }
    }

    /// Clipboard payload for the selected blocks; `None` leaves copying to
    /// the text surface.
    pub fn copy(&self) -> Option<ClipboardData> {
        clipboard::copy_blocks(&self.document, &self.selection)
    }

    /// A paste into `target`. Returns `true` when the editor consumed it and
    /// the surface must not paste on its own.
    pub fn paste(&mut self, target: &BlockId, data: &ClipboardData) -> bool {
        if self.config.disabled {
            return true;
        }
        let Some(pasted) = clipboard::read_paste(data) else {
            return false;
        };
        debug!(source = ?pasted.source, blocks = pasted.blocks.len(), "paste");
        self.absorb_surface(target);
        match clipboard::apply_paste(&mut self.document, target, pasted.blocks, &self.selection) {
            Ok(PasteOutcome::Default) => false,
            Ok(PasteOutcome::Inserted { focus, touched }) => {
                self.selection.clear();
                self.commit();
                for id in &touched {
                    self.push_surface(id);
                }
                self.request_caret(focus, CaretPlacement::End);
                true
            }
            Err(err) => {
                debug!(%err, "paste rejected");
                true
            }
        }
    }

    /// Pastes into the focused block, inserting the plain text into the
    /// surface when the editor leaves the paste to it.
    pub fn paste_into_focus(&mut self, data: &ClipboardData) {
        let Some(target) = self.focus.clone() else {
            return;
        };
        if !self.paste(&target, data)
            && let Some(text) = data.text.as_deref()
            && let Some(surface) = self.surfaces.get_mut(&target)
        {
            surface.insert_text(text);
            self.input(&target);
        }
        self.after_render();
    }
}
