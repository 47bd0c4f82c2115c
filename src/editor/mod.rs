//! The editing session: one document, its block surfaces, and every piece of
//! interaction state layered over it.
//!
//! An [`Editor`] owns the [`Document`] and keeps a [`Surface`] per block. Host
//! events (keys, input, pointer, clipboard) arrive as method calls; every
//! change to the document is published to the host as the serialized block
//! array and schedules a history capture.
//!
//! Some effects only make sense once the host has rendered the new blocks,
//! such as moving the caret into a block that was just created. Those are
//! queued and run by [`Editor::after_render`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::caret::TextRange;
use crate::config::EditorConfig;
use crate::doc::{Block, BlockId, BlockPatch, BlockType, Document};
use crate::history::{Clock, History, Snapshot, SystemClock};
use crate::menu::{self, BlockMenu, CommandMenu, MenuKind, Mentionable};
use crate::selection::{DragState, RectSelection, SelectionSet};

mod actions;
mod keys;
mod pointer;
mod surface;

pub use keys::{Key, KeyOutcome, Modifiers, UnknownKey};
pub use surface::Surface;

/// Receives the serialized block array after every change.
pub type Publisher = Box<dyn FnMut(&str)>;

/// Where the caret lands when a block receives focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPlacement {
    Start,
    End,
    /// Grapheme offset, clamped to the content.
    Offset(usize),
}

impl CaretPlacement {
    fn apply(self, surface: &mut Surface) {
        match self {
            CaretPlacement::Start => surface.caret_to_start(),
            CaretPlacement::End => surface.caret_to_end(),
            CaretPlacement::Offset(offset) => surface.set_selection(TextRange::collapsed(offset)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FullscreenState {
    #[default]
    Inline,
    Fullscreen,
    /// Leaving fullscreen; the exit animation runs until `until`.
    Exiting { until: Instant },
}

pub struct Editor {
    config: EditorConfig,
    document: Document,
    surfaces: HashMap<BlockId, Surface>,
    focus: Option<BlockId>,
    history: History,
    slash: CommandMenu,
    mention: CommandMenu,
    block_menu: BlockMenu,
    pending_slash: Option<BlockId>,
    pending_caret: Option<(BlockId, CaretPlacement)>,
    selection: SelectionSet,
    rect_select: Option<RectSelection>,
    drag: Option<DragState>,
    fullscreen: FullscreenState,
    mentionables: Vec<Mentionable>,
    publisher: Publisher,
    clock: Rc<dyn Clock>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("focus", &self.focus)
            .field("selection", &self.selection)
            .field("fullscreen", &self.fullscreen)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Opens `value`, the host's serialized block array, with the default
    /// configuration.
    pub fn new(value: &str, publisher: impl FnMut(&str) + 'static) -> Self {
        Self::with_config(value, EditorConfig::default(), publisher)
    }

    pub fn with_config(
        value: &str,
        config: EditorConfig,
        publisher: impl FnMut(&str) + 'static,
    ) -> Self {
        Self::open(Document::from_value_lossy(value), config, publisher)
    }

    /// Opens an already-built block array. An empty array opens the initial
    /// single-block document.
    pub fn from_blocks(
        blocks: Vec<Block>,
        config: EditorConfig,
        publisher: impl FnMut(&str) + 'static,
    ) -> Self {
        Self::open(Document::from_blocks(blocks), config, publisher)
    }

    fn open(
        document: Document,
        config: EditorConfig,
        publisher: impl FnMut(&str) + 'static,
    ) -> Self {
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let mut history = History::new(config.history_limit, config.history_debounce);
        history.schedule(clock.now());
        let mut editor = Self {
            document,
            surfaces: HashMap::new(),
            focus: None,
            history,
            slash: CommandMenu::new(MenuKind::Slash),
            mention: CommandMenu::new(MenuKind::Mention),
            block_menu: BlockMenu::Closed,
            pending_slash: None,
            pending_caret: None,
            selection: SelectionSet::new(),
            rect_select: None,
            drag: None,
            fullscreen: FullscreenState::Inline,
            mentionables: Vec::new(),
            publisher: Box::new(publisher),
            clock,
            config,
        };
        editor.reconcile();
        debug!(blocks = editor.document.block_count(), "editor opened");
        editor
    }

    /// Replaces the time source. The pending history capture is rescheduled
    /// against the new clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self.history.schedule(self.clock.now());
        self
    }

    pub fn with_mentionables(mut self, mentionables: Vec<Mentionable>) -> Self {
        self.mentionables = mentionables;
        self
    }

    pub fn set_mentionables(&mut self, mentionables: Vec<Mentionable>) {
        self.mentionables = mentionables;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self, block_id: &BlockId) -> Option<&Surface> {
        self.surfaces.get(block_id)
    }

    /// Mutable surface access for hosts that edit text directly. Call
    /// [`Editor::input`] afterwards.
    pub fn surface_mut(&mut self, block_id: &BlockId) -> Option<&mut Surface> {
        self.surfaces.get_mut(block_id)
    }

    pub fn focused(&self) -> Option<&BlockId> {
        self.focus.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn slash_menu(&self) -> &CommandMenu {
        &self.slash
    }

    pub fn mention_menu(&self) -> &CommandMenu {
        &self.mention
    }

    pub fn block_menu(&self) -> &BlockMenu {
        &self.block_menu
    }

    pub fn fullscreen(&self) -> FullscreenState {
        self.fullscreen
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen == FullscreenState::Fullscreen
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Options of the open slash menu, empty when it is closed.
    pub fn slash_options(&self) -> Vec<BlockType> {
        self.slash.query().map(menu::slash_options).unwrap_or_default()
    }

    pub fn mention_options(&self) -> Vec<&Mentionable> {
        match self.mention.query() {
            Some(query) => menu::filter_mentions(&self.mentionables, query),
            None => Vec::new(),
        }
    }

    /// Placeholder for `block_id`: only the first block shows one, and only
    /// while it is empty.
    pub fn placeholder(&self, block_id: &BlockId) -> Option<&str> {
        let first = self.document.blocks().first()?;
        (first.id == *block_id && first.is_empty()).then_some(self.config.placeholder.as_str())
    }

    /// Ordinal shown before a numbered list item.
    pub fn list_number(&self, block_id: &BlockId) -> Option<usize> {
        self.document.list_number(self.document.index_of(block_id)?)
    }

    /// The host pushed a new value. Unchanged values are ignored; a changed
    /// value replaces the document without being published back.
    pub fn set_value(&mut self, value: &str) {
        self.replace_document(Document::from_value_lossy(value));
    }

    /// [`Editor::set_value`] for a host that holds blocks rather than JSON.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        self.replace_document(Document::from_blocks(blocks));
    }

    fn replace_document(&mut self, document: Document) {
        if document == self.document {
            return;
        }
        debug!(blocks = document.block_count(), "value replaced by host");
        self.document = document;
        self.selection.retain_existing(&self.document);
        self.history.schedule(self.clock.now());
        self.reconcile();
    }

    /// Focuses `block_id` and places the caret. Returns `false` if the block
    /// has no surface.
    pub fn focus(&mut self, block_id: &BlockId, placement: CaretPlacement) -> bool {
        if !self.surfaces.contains_key(block_id) {
            return false;
        }
        self.set_focus(Some(block_id.clone()));
        if let Some(surface) = self.surfaces.get_mut(block_id) {
            placement.apply(surface);
        }
        true
    }

    pub fn blur(&mut self) {
        self.set_focus(None);
    }

    /// The host moved the caret or text selection inside `block_id`.
    pub fn set_text_selection(&mut self, block_id: &BlockId, range: TextRange) {
        if let Some(surface) = self.surfaces.get_mut(block_id) {
            surface.set_selection(range);
        }
    }

    /// Moves focus. A surface losing focus with a pending overwrite catches
    /// up with the model.
    fn set_focus(&mut self, next: Option<BlockId>) {
        if self.focus == next {
            return;
        }
        if let Some(previous) = self.focus.take()
            && let Some(surface) = self.surfaces.get_mut(&previous)
            && surface.is_dirty()
            && let Some(block) = self.document.get(&previous)
        {
            surface.load(&block.content);
        }
        self.focus = next;
    }

    /// Runs effects queued for after the host rendered: pending caret moves,
    /// then a slash menu requested by the plus button.
    pub fn after_render(&mut self) {
        if let Some((block_id, placement)) = self.pending_caret.take() {
            self.focus(&block_id, placement);
        }
        if let Some(block_id) = self.pending_slash.take()
            && self.document.index_of(&block_id).is_some()
        {
            self.focus(&block_id, CaretPlacement::End);
            self.open_menu(MenuKind::Slash, &block_id);
        }
    }

    /// Advances timers: history capture and the fullscreen exit animation.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if self.history.poll(now, &self.document) {
            debug!(depth = self.history.undo_depth(), "history captured");
        }
        if let FullscreenState::Exiting { until } = self.fullscreen
            && until <= now
        {
            self.fullscreen = FullscreenState::Inline;
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.to_document();
        self.selection.retain_existing(&self.document);
        self.close_stale_menus();
        self.publish();
        self.resync_all();
        if let Some(focus) = &self.focus
            && self.document.index_of(focus).is_none()
        {
            self.focus = None;
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        match self.fullscreen {
            FullscreenState::Inline => self.fullscreen = FullscreenState::Fullscreen,
            FullscreenState::Fullscreen => self.exit_fullscreen(),
            FullscreenState::Exiting { .. } => debug!("fullscreen toggle ignored while exiting"),
        }
    }

    pub(crate) fn exit_fullscreen(&mut self) {
        if self.fullscreen == FullscreenState::Fullscreen {
            self.fullscreen = FullscreenState::Exiting {
                until: self.clock.now() + self.config.fullscreen_exit_delay,
            };
        }
    }

    fn publish(&mut self) {
        let json = self.document.to_json();
        (self.publisher)(&json);
    }

    /// Publishes the document, schedules a history capture, and brings the
    /// surfaces in line with the model.
    fn commit(&mut self) {
        self.publish();
        self.history.schedule(self.clock.now());
        self.reconcile();
    }

    /// Creates and drops surfaces to match the blocks. Existing surfaces are
    /// reloaded from the model, except the focused one, which is only marked
    /// for reload so that typing is never interrupted. Menus anchored to a
    /// removed block are closed.
    fn reconcile(&mut self) {
        self.surfaces
            .retain(|id, _| self.document.index_of(id).is_some());
        for block in self.document.blocks() {
            match self.surfaces.get_mut(&block.id) {
                None => {
                    self.surfaces
                        .insert(block.id.clone(), Surface::new(&block.content));
                }
                Some(surface) if surface.segments() == block.content => surface.mark_clean(),
                Some(surface) if self.focus.as_ref() == Some(&block.id) => surface.mark_dirty(),
                Some(surface) => surface.load(&block.content),
            }
        }
        if let Some(focus) = &self.focus
            && !self.surfaces.contains_key(focus)
        {
            self.focus = None;
        }
        self.close_stale_menus();
    }

    /// Overwrites one surface from the model, focused or not.
    fn push_surface(&mut self, block_id: &BlockId) {
        if let Some(block) = self.document.get(block_id)
            && let Some(surface) = self.surfaces.get_mut(block_id)
        {
            surface.load(&block.content);
        }
    }

    fn resync_all(&mut self) {
        self.reconcile();
        let ids = self.document.ids();
        for id in &ids {
            self.push_surface(id);
        }
    }

    fn request_caret(&mut self, block_id: BlockId, placement: CaretPlacement) {
        self.pending_caret = Some((block_id, placement));
    }

    /// Stores text the host wrote into a surface without reporting it.
    fn absorb_surface(&mut self, block_id: &BlockId) {
        let Some(surface) = self.surfaces.get(block_id) else {
            return;
        };
        if surface.is_dirty() {
            return;
        }
        let content = surface.segments();
        if self.document.get(block_id).is_some_and(|b| b.content != content) {
            self.apply_patch(block_id, &BlockPatch::content(content));
        }
    }

    fn apply_patch(&mut self, block_id: &BlockId, patch: &BlockPatch) {
        match self.document.update_block(block_id, patch) {
            Ok(()) => self.commit(),
            Err(err) => debug!(%err, "update ignored"),
        }
    }

    fn menu(&self, kind: MenuKind) -> &CommandMenu {
        match kind {
            MenuKind::Slash => &self.slash,
            MenuKind::Mention => &self.mention,
        }
    }

    fn menu_mut(&mut self, kind: MenuKind) -> &mut CommandMenu {
        match kind {
            MenuKind::Slash => &mut self.slash,
            MenuKind::Mention => &mut self.mention,
        }
    }

    fn option_count(&self, kind: MenuKind) -> usize {
        match kind {
            MenuKind::Slash => self.slash_options().len(),
            MenuKind::Mention => self.mention_options().len(),
        }
    }

    fn close_stale_menus(&mut self) {
        for menu in [&mut self.slash, &mut self.mention] {
            if let Some(open) = menu.current()
                && self.document.index_of(&open.block_id).is_none()
            {
                menu.close();
            }
        }
        if let Some(block_id) = self.block_menu.block_id()
            && self.document.index_of(block_id).is_none()
        {
            self.block_menu = BlockMenu::Closed;
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new("", |_| {})
    }
}
