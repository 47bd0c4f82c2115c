//! blockdoc: a block-structured rich-text document model and edit engine.
//!
//! A document is an ordered list of typed blocks (text, headings, list
//! items), each holding runs of styled text. This crate provides everything
//! an editing front end needs below the rendering layer:
//!
//! - **Segment codec** - styled runs to inline markup and back
//! - **Document model** - block CRUD, split/merge, reordering, serialization
//! - **History** - debounced whole-document snapshots with undo/redo
//! - **Caret mapping** - grapheme offsets over styled runs
//! - **Command menus** - `/` block-type and `@` mention menus
//! - **Selection** - rectangle block selection and drag reordering
//! - **Clipboard** - multi-format copy and paste of blocks
//! - **Editor** - the session that ties these to host events
//!
//! # Quick Start
//!
//! ```rust
//! use blockdoc::{BlockId, BlockType, CaretPlacement, Editor, Key, Modifiers};
//!
//! let mut editor = Editor::new("", |json| println!("{json}"));
//! let first = BlockId::new("1");
//! editor.focus(&first, CaretPlacement::End);
//! editor.type_text("/h1");
//! editor.press(Key::Enter, Modifiers::NONE);
//! editor.type_text("Title");
//!
//! let block = &editor.document().blocks()[0];
//! assert_eq!(block.block_type, BlockType::H1);
//! assert_eq!(block.plain_text(), "Title");
//! ```
//!
//! # Features
//!
//! - `cli` (default) - builds the `blockdoc` command-line tool

pub mod caret;
pub mod clipboard;
pub mod codec;
pub mod config;
pub mod doc;
pub mod editor;
pub mod history;
pub mod menu;
pub mod selection;

pub use caret::TextRange;
pub use clipboard::{ClipboardData, ClipboardError, PasteOutcome};
pub use codec::{Attributes, TextSegment};
pub use config::EditorConfig;
pub use doc::{
    Block, BlockId, BlockPatch, BlockType, Document, DropSide, EditError, MergeOutcome,
    SplitOutcome, ValueError,
};
pub use editor::{CaretPlacement, Editor, FullscreenState, Key, KeyOutcome, Modifiers, Surface};
pub use history::{Clock, History, ManualClock, Snapshot, SystemClock};
pub use menu::{CommandMenu, MenuKind, Mentionable};
pub use selection::{Point, Rect, SelectionSet};
