//! Undo/redo history of whole-document snapshots.
//!
//! Edits do not record snapshots directly. Each edit pushes a capture
//! deadline `debounce` into the future; once the deadline passes, the next
//! [`History::poll`] captures the document if it differs from the last
//! snapshot. Replaying a snapshot cancels any pending capture so the replay
//! itself is never recorded.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::doc::{Block, Document};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Source of "now" for debounce and exit timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    blocks: Vec<Block>,
}

impl Snapshot {
    pub fn of(document: &Document) -> Self {
        Self {
            blocks: document.blocks().to_vec(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn to_document(&self) -> Document {
        Document::from_blocks(self.blocks.clone())
    }
}

#[derive(Debug)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    limit: usize,
    debounce: Duration,
    deadline: Option<Instant>,
    last_saved: Option<Snapshot>,
}

impl History {
    pub fn new(limit: usize, debounce: Duration) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit: limit.max(1),
            debounce,
            deadline: None,
            last_saved: None,
        }
    }

    /// Restarts the capture timer.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Captures `current` if the deadline has passed. Returns whether a new
    /// snapshot was recorded.
    ///
    /// Redo entries stay available after an edit until this capture runs;
    /// an edit followed by redo within the debounce window still redoes.
    pub fn poll(&mut self, now: Instant, current: &Document) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return false,
        }
        self.deadline = None;
        self.capture(current)
    }

    /// Records `current` unless it equals the last snapshot. A new snapshot
    /// discards the redo stack; the oldest entries are dropped beyond the
    /// limit.
    pub fn capture(&mut self, current: &Document) -> bool {
        let snapshot = Snapshot::of(current);
        if self.last_saved.as_ref() == Some(&snapshot) {
            return false;
        }
        self.past.push_back(snapshot.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        self.last_saved = Some(snapshot);
        debug!(depth = self.past.len(), "captured snapshot");
        true
    }

    /// Steps back one snapshot. The newest snapshot is always the current
    /// state, so undo needs at least two.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.past.len() <= 1 {
            return None;
        }
        self.deadline = None;
        let current = self.past.pop_back()?;
        self.future.push_front(current);
        let restored = self.past.back()?.clone();
        self.last_saved = Some(restored.clone());
        debug!(depth = self.past.len(), redo = self.future.len(), "undo");
        Some(restored)
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.deadline = None;
        self.past.push_back(next.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.last_saved = Some(next.clone());
        debug!(depth = self.past.len(), redo = self.future.len(), "redo");
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_DEBOUNCE)
    }
}
