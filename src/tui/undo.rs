use crate::model::{Document, Item};

/// Most recent snapshots kept; older ones are evicted first
pub const HISTORY_LIMIT: usize = 50;

/// A full copy of the item list and the list cursor, taken before a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub cursor: usize,
}

/// Bounded undo log of whole-document snapshots. There is no redo: restoring
/// a snapshot does not push anything.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Record the state about to be mutated.
    pub fn record(&mut self, document: &Document, cursor: usize) {
        self.entries.push(Snapshot {
            items: document.snapshot(),
            cursor,
        });
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.drain(..self.entries.len() - HISTORY_LIMIT);
        }
    }

    /// Pop the most recent snapshot. None means there is nothing to undo.
    pub fn undo(&mut self) -> Option<Snapshot> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
