use crate::error::Result;
use crate::models::Turn;

/// Trait for history storage backends
pub trait HistoryStore: Send + Sync {
    /// Load every stored turn. Never fails: unreadable data yields an empty log.
    fn load(&self) -> Vec<Turn>;

    /// Overwrite the stored log with `turns`
    fn save(&self, turns: &[Turn]) -> Result<()>;

    /// Remove the stored log
    fn clear(&self) -> Result<()>;
}
