//! Keyboard and text-input handling.

use std::str::FromStr;

use tracing::debug;

use super::{CaretPlacement, Editor, Surface};
use crate::caret::{self, TextRange};
use crate::doc::{BlockId, BlockPatch, MergeOutcome, SplitOutcome};
use crate::menu::{self, MenuKey, MenuKind, MenuResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(ch));
        }
        match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "backspace" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            "space" => Ok(Key::Char(' ')),
            "up" | "arrowup" => Ok(Key::ArrowUp),
            "down" | "arrowdown" => Ok(Key::ArrowDown),
            "left" | "arrowleft" => Ok(Key::ArrowLeft),
            "right" | "arrowright" => Ok(Key::ArrowRight),
            _ => Err(UnknownKey(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the host should do with a key event after the editor saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not consumed; the surface applies its default behaviour.
    Default,
    /// Consumed; the surface must not apply its default behaviour.
    Handled,
    /// Consumed, and outer handlers must not see it either.
    Stopped,
}

impl Editor {
    /// Window-level key handling that runs before any block sees the key:
    /// Escape leaves fullscreen unless a menu or block selection is active.
    pub fn capture_key_down(&mut self, key: Key) -> KeyOutcome {
        if key == Key::Escape
            && self.fullscreen == super::FullscreenState::Fullscreen
            && !self.slash.is_open()
            && !self.mention.is_open()
            && self.selection.is_empty()
        {
            self.exit_fullscreen();
            return KeyOutcome::Stopped;
        }
        KeyOutcome::Default
    }

    /// Window-level shortcuts that see keys after the block: undo and redo.
    pub fn window_key_down(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        if !modifiers.is_command() {
            return KeyOutcome::Default;
        }
        match key {
            Key::Char('z' | 'Z') if modifiers.shift => {
                self.redo();
                KeyOutcome::Handled
            }
            Key::Char('z') => {
                self.undo();
                KeyOutcome::Handled
            }
            Key::Char('y') => {
                self.redo();
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Default,
        }
    }

    /// A key pressed while `block_id` holds focus.
    pub fn key_down(&mut self, block_id: &BlockId, key: Key, modifiers: Modifiers) -> KeyOutcome {
        if self.config.disabled || self.document.index_of(block_id).is_none() {
            return KeyOutcome::Default;
        }
        self.absorb_surface(block_id);

        if modifiers.is_command() && key == Key::Char('a') {
            let whole_block = self
                .surfaces
                .get(block_id)
                .is_none_or(Surface::is_fully_selected);
            if whole_block {
                self.select_all_blocks();
                return KeyOutcome::Handled;
            }
            return KeyOutcome::Default;
        }

        for kind in [MenuKind::Slash, MenuKind::Mention] {
            if self.menu(kind).is_open()
                && let Some(outcome) = self.menu_key(kind, key)
            {
                return outcome;
            }
        }

        if let Some(outcome) = self.selection_key(key) {
            return outcome;
        }

        let range = self
            .surfaces
            .get(block_id)
            .map(Surface::selection)
            .unwrap_or_default();

        match key {
            Key::ArrowUp if caret::is_at_start(range) => {
                if let Some(previous) = self.document.previous(block_id).map(|b| b.id.clone()) {
                    self.focus(&previous, CaretPlacement::End);
                    return KeyOutcome::Handled;
                }
            }
            Key::ArrowDown => {
                let at_end = self
                    .surfaces
                    .get(block_id)
                    .is_some_and(|surface| caret::is_at_end(surface.runs(), range));
                if at_end && let Some(next) = self.document.next(block_id).map(|b| b.id.clone()) {
                    self.focus(&next, CaretPlacement::Start);
                    return KeyOutcome::Handled;
                }
            }
            Key::Enter if !modifiers.shift => {
                self.split(block_id, range);
                return KeyOutcome::Handled;
            }
            Key::Backspace if range.is_collapsed() && caret::is_at_start(range) => {
                if self.merge_backward(block_id) {
                    return KeyOutcome::Handled;
                }
            }
            Key::Char('/') if !modifiers.is_command() => self.open_menu(MenuKind::Slash, block_id),
            Key::Char('@') if !modifiers.is_command() => self.open_menu(MenuKind::Mention, block_id),
            _ => {}
        }
        KeyOutcome::Default
    }

    /// Escape and Backspace/Delete act on the block selection when there is
    /// one, wherever focus is.
    pub(super) fn selection_key(&mut self, key: Key) -> Option<KeyOutcome> {
        if self.selection.is_empty() {
            return None;
        }
        match key {
            Key::Escape => {
                self.selection.clear();
                Some(KeyOutcome::Stopped)
            }
            Key::Backspace | Key::Delete => {
                self.delete_selected();
                Some(KeyOutcome::Handled)
            }
            _ => None,
        }
    }

    fn menu_key(&mut self, kind: MenuKind, key: Key) -> Option<KeyOutcome> {
        let menu_key = match key {
            Key::ArrowUp => MenuKey::Up,
            Key::ArrowDown => MenuKey::Down,
            Key::Enter => MenuKey::Enter,
            Key::Escape => MenuKey::Escape,
            _ => return None,
        };
        let count = self.option_count(kind);
        let outcome = match self.menu_mut(kind).handle_key(menu_key, count) {
            MenuResponse::Moved(_) | MenuResponse::Ignored => KeyOutcome::Handled,
            MenuResponse::Commit(index) => {
                self.commit_menu(kind, index);
                KeyOutcome::Handled
            }
            MenuResponse::Closed => KeyOutcome::Stopped,
        };
        Some(outcome)
    }

    /// The surface of `block_id` changed: refresh open menu queries and store
    /// the new content.
    pub fn input(&mut self, block_id: &BlockId) {
        if self.config.disabled {
            return;
        }
        let Some(surface) = self.surfaces.get(block_id) else {
            return;
        };
        let plain = surface.plain_text();
        let content = surface.segments();
        self.slash.refresh(block_id, &plain);
        self.mention.refresh(block_id, &plain);

        if self.document.get(block_id).is_some_and(|b| b.content == content) {
            return;
        }
        match self.document.update_block(block_id, &BlockPatch::content(content)) {
            Ok(()) => self.commit(),
            Err(err) => debug!(%err, "input ignored"),
        }
    }

    fn split(&mut self, block_id: &BlockId, range: TextRange) {
        match self.document.split_block(block_id, range) {
            Ok(SplitOutcome::Split { new_block }) => {
                self.push_surface(block_id);
                self.commit();
                self.request_caret(new_block, CaretPlacement::Start);
            }
            Ok(SplitOutcome::ExitedList) => self.commit(),
            Err(err) => debug!(%err, "split ignored"),
        }
    }

    fn merge_backward(&mut self, block_id: &BlockId) -> bool {
        match self.document.merge_with_previous(block_id) {
            Ok(MergeOutcome::Merged { into, caret }) => {
                if self.focus.as_ref() == Some(block_id) {
                    self.focus = None;
                }
                self.push_surface(&into);
                self.commit();
                self.request_caret(into, CaretPlacement::Offset(caret));
                true
            }
            Ok(MergeOutcome::ExitedList) => {
                self.commit();
                true
            }
            Ok(MergeOutcome::Unchanged) => false,
            Err(err) => {
                debug!(%err, "merge ignored");
                false
            }
        }
    }

    /// Opens a command menu at the caret of `block_id`, closing the other one.
    pub(super) fn open_menu(&mut self, kind: MenuKind, block_id: &BlockId) {
        let anchor = self
            .surfaces
            .get(block_id)
            .map(|surface| surface.selection().start)
            .unwrap_or(0);
        let other = match kind {
            MenuKind::Slash => MenuKind::Mention,
            MenuKind::Mention => MenuKind::Slash,
        };
        self.menu_mut(other).close();
        self.menu_mut(kind).open(block_id.clone(), anchor);
        debug!(?kind, block = %block_id, "opened menu");
    }

    /// Applies the option at `index`: removes the trigger and query from the
    /// block, then converts the block type or inserts a mention token.
    pub fn commit_menu(&mut self, kind: MenuKind, index: usize) {
        let Some(open) = self.menu(kind).current().cloned() else {
            return;
        };
        if !self.surfaces.contains_key(&open.block_id) {
            debug!(block = %open.block_id, "menu block is gone");
            self.menu_mut(kind).close();
            return;
        }
        match kind {
            MenuKind::Slash => {
                let Some(block_type) = menu::slash_options(&open.query).get(index).copied() else {
                    return;
                };
                let Some(surface) = self.surfaces.get_mut(&open.block_id) else {
                    return;
                };
                if let Some(span) = menu::trigger_span(surface.runs(), kind.trigger(), &open.query) {
                    surface.delete_range(span);
                }
                let patch = BlockPatch::block_type(block_type).with_content(surface.segments());
                self.slash.close();
                self.apply_patch(&open.block_id, &patch);
            }
            MenuKind::Mention => {
                let Some(token) = menu::filter_mentions(&self.mentionables, &open.query)
                    .get(index)
                    .map(|entity| menu::mention_token(&entity.id))
                else {
                    return;
                };
                let Some(surface) = self.surfaces.get_mut(&open.block_id) else {
                    return;
                };
                if let Some(span) = menu::trigger_span(surface.runs(), kind.trigger(), &open.query) {
                    surface.delete_range(span);
                    surface.insert_text(&token);
                }
                let patch = BlockPatch::content(surface.segments());
                self.mention.close();
                self.apply_patch(&open.block_id, &patch);
            }
        }
    }

    /// Drives one key press the way a platform text surface would: the
    /// editor's handlers run first and, when they leave the key alone, its
    /// default editing effect is applied to the focused surface.
    pub fn press(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        let mut outcome = self.capture_key_down(key);
        if outcome == KeyOutcome::Default {
            outcome = match self.focus.clone() {
                Some(id) => self.key_down(&id, key, modifiers),
                None => self.selection_key(key).unwrap_or(KeyOutcome::Default),
            };
        }
        if outcome != KeyOutcome::Stopped {
            let window = self.window_key_down(key, modifiers);
            if window != KeyOutcome::Default {
                outcome = window;
            }
        }
        if outcome == KeyOutcome::Default
            && !self.config.disabled
            && let Some(id) = self.focus.clone()
        {
            self.apply_default(&id, key, modifiers);
        }
        self.after_render();
        outcome
    }

    /// Types each character of `text` through [`Editor::press`].
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let key = if ch == '\n' { Key::Enter } else { Key::Char(ch) };
            self.press(key, Modifiers::NONE);
        }
    }

    fn apply_default(&mut self, block_id: &BlockId, key: Key, modifiers: Modifiers) {
        let Some(surface) = self.surfaces.get_mut(block_id) else {
            return;
        };
        let range = surface.selection();
        let changed = match key {
            Key::Char('a') if modifiers.is_command() => {
                surface.select_all();
                false
            }
            Key::Char(_) if modifiers.is_command() => false,
            Key::Char(ch) => {
                surface.insert_text(ch.encode_utf8(&mut [0; 4]));
                true
            }
            Key::Enter => {
                surface.insert_text("\n");
                true
            }
            Key::Backspace => {
                surface.delete_backward();
                true
            }
            Key::Delete => {
                surface.delete_forward();
                true
            }
            Key::ArrowLeft => {
                let to = if range.is_collapsed() { range.start.saturating_sub(1) } else { range.start };
                surface.set_selection(TextRange::collapsed(to));
                false
            }
            Key::ArrowRight => {
                let to = if range.is_collapsed() { range.end + 1 } else { range.end };
                surface.set_selection(TextRange::collapsed(to));
                false
            }
            Key::ArrowUp => {
                surface.caret_to_start();
                false
            }
            Key::ArrowDown => {
                surface.caret_to_end();
                false
            }
            Key::Escape | Key::Tab => false,
        };
        if changed {
            self.input(block_id);
        }
    }
}
