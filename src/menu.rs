//! Command menus: the `/` block-type menu, the `@` mention menu, and the
//! per-block action menu behind the drag handle.
//!
//! A command menu opens when its trigger character is typed. While open it
//! follows the text after the last trigger in the block as its query, and
//! closes once the trigger is gone.

use serde::{Deserialize, Serialize};

use crate::caret::{self, TextRange};
use crate::codec::TextSegment;
use crate::doc::{BlockId, BlockType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Slash,
    Mention,
}

impl MenuKind {
    pub fn trigger(self) -> char {
        match self {
            MenuKind::Slash => '/',
            MenuKind::Mention => '@',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMenu {
    pub block_id: BlockId,
    pub query: String,
    pub selected_index: usize,
    /// Caret offset in the block when the menu opened.
    pub anchor_offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open(OpenMenu),
}

/// Keys a command menu reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResponse {
    Moved(usize),
    Commit(usize),
    Closed,
    /// Enter with nothing to pick.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMenu {
    kind: MenuKind,
    state: MenuState,
}

impl CommandMenu {
    pub fn new(kind: MenuKind) -> Self {
        Self {
            kind,
            state: MenuState::Closed,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn current(&self) -> Option<&OpenMenu> {
        match &self.state {
            MenuState::Open(open) => Some(open),
            MenuState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open(_))
    }

    pub fn is_open_for(&self, block_id: &BlockId) -> bool {
        self.current().is_some_and(|open| &open.block_id == block_id)
    }

    pub fn query(&self) -> Option<&str> {
        self.current().map(|open| open.query.as_str())
    }

    pub fn open(&mut self, block_id: BlockId, anchor_offset: usize) {
        self.state = MenuState::Open(OpenMenu {
            block_id,
            query: String::new(),
            selected_index: 0,
            anchor_offset,
        });
    }

    pub fn close(&mut self) {
        self.state = MenuState::Closed;
    }

    /// Re-reads the query from the block's plain text after an input. A
    /// changed query resets the highlighted option. Returns whether the menu
    /// is still open.
    pub fn refresh(&mut self, block_id: &BlockId, plain_text: &str) -> bool {
        let trigger = self.kind.trigger();
        let MenuState::Open(open) = &mut self.state else {
            return false;
        };
        if &open.block_id != block_id {
            return true;
        }
        match plain_text.rfind(trigger) {
            Some(at) => {
                let query = &plain_text[at + trigger.len_utf8()..];
                if open.query != query {
                    open.query = query.to_string();
                    open.selected_index = 0;
                }
                true
            }
            None => {
                self.state = MenuState::Closed;
                false
            }
        }
    }

    /// Moves the highlight with wrap-around, commits, or closes.
    pub fn handle_key(&mut self, key: MenuKey, option_count: usize) -> MenuResponse {
        let MenuState::Open(open) = &mut self.state else {
            return MenuResponse::Ignored;
        };
        match key {
            MenuKey::Down if option_count > 0 => {
                open.selected_index = (open.selected_index + 1) % option_count;
                MenuResponse::Moved(open.selected_index)
            }
            MenuKey::Up if option_count > 0 => {
                open.selected_index = (open.selected_index + option_count - 1) % option_count;
                MenuResponse::Moved(open.selected_index)
            }
            MenuKey::Up | MenuKey::Down => MenuResponse::Moved(open.selected_index),
            MenuKey::Enter if open.selected_index < option_count => {
                MenuResponse::Commit(open.selected_index)
            }
            MenuKey::Enter => MenuResponse::Ignored,
            MenuKey::Escape => {
                self.state = MenuState::Closed;
                MenuResponse::Closed
            }
        }
    }
}

/// Block types offered by the slash menu for `query`, matched
/// case-insensitively against the label or the type key.
pub fn slash_options(query: &str) -> Vec<BlockType> {
    let query = query.to_lowercase();
    BlockType::ALL
        .into_iter()
        .filter(|t| t.label().to_lowercase().contains(&query) || t.key().contains(&query))
        .collect()
}

/// Something that can be mentioned with `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentionable {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Mentionable {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
        }
    }
}

pub fn filter_mentions<'a>(entities: &'a [Mentionable], query: &str) -> Vec<&'a Mentionable> {
    let query = query.to_lowercase();
    entities
        .iter()
        .filter(|entity| entity.name.to_lowercase().contains(&query))
        .collect()
}

/// The placeholder text a committed mention leaves in the block.
pub fn mention_token(id: &str) -> String {
    format!("{{{{{id}}}}}")
}

/// The range covering the last `trigger` + `query` in the runs.
pub fn trigger_span(runs: &[TextSegment], trigger: char, query: &str) -> Option<TextRange> {
    let needle = format!("{trigger}{query}");
    let start = caret::find_last(runs, &needle)?;
    Some(TextRange::new(start, start + caret::grapheme_len(&needle)))
}

/// State of the action menu opened from a block's drag handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockMenu {
    #[default]
    Closed,
    Open { block_id: BlockId, transforming: bool },
}

impl BlockMenu {
    pub fn block_id(&self) -> Option<&BlockId> {
        match self {
            BlockMenu::Open { block_id, .. } => Some(block_id),
            BlockMenu::Closed => None,
        }
    }

    pub fn is_transforming(&self) -> bool {
        matches!(self, BlockMenu::Open { transforming: true, .. })
    }
}
