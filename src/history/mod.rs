mod filesystem;
mod storage;

pub use filesystem::FileHistoryStore;
pub use storage::HistoryStore;

use crate::error::Result;
use crate::models::Turn;

pub const DEFAULT_MAX_TURNS: usize = 50;

/// The bounded, append-only conversation log.
///
/// Turns are kept in arrival order. Once the log grows past `max_turns`
/// the oldest turns are dropped, both in memory and on disk, whenever it
/// is persisted.
pub struct History {
    turns: Vec<Turn>,
    max_turns: usize,
    store: Box<dyn HistoryStore>,
}

impl History {
    /// Load whatever the store holds. A missing or corrupt file starts an empty log.
    pub fn load(store: Box<dyn HistoryStore>, max_turns: usize) -> Self {
        let turns = store.load();
        let mut history = Self {
            turns,
            max_turns: max_turns.max(1),
            store,
        };
        history.truncate();
        history
    }

    /// Start from an empty log without reading the store.
    pub fn empty(store: Box<dyn HistoryStore>, max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
            store,
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop the oldest turns past the cap, then overwrite the stored log.
    pub fn persist(&mut self) -> Result<()> {
        self.truncate();
        self.store.save(&self.turns)
    }

    /// Append and persist in one step.
    pub fn record(&mut self, turn: Turn) -> Result<()> {
        self.append(turn);
        self.persist()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn truncate(&mut self) {
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }
}
