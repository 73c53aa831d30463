use async_trait::async_trait;

use crate::db::error::DbResult;

/// Repository over workspace boards and their membership.
#[async_trait]
pub trait BoardRepo: Send + Sync {
    /// Delete board member rows whose user no longer exists.
    /// The synthetic `system` member is never removed.
    async fn delete_dangling_members(&self) -> DbResult<u64>;

    /// Select up to `limit` IDs of boards with zero remaining members.
    async fn select_empty_board_ids(&self, limit: u32) -> DbResult<Vec<String>>;

    /// Within one transaction, delete the blocks, block history and board
    /// history of `board_ids`, then the boards themselves.
    async fn delete_board_batch(&self, board_ids: &[String]) -> DbResult<BoardCascadeDeleted>;
}

/// Counts from one board cascade batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardCascadeDeleted {
    pub blocks: u64,
    pub block_history: u64,
    pub board_history: u64,
    /// Candidate boards removed; compared against the selected batch size
    /// by the batch driver.
    pub boards: u64,
}

impl BoardCascadeDeleted {
    pub fn dependents(&self) -> u64 {
        self.blocks + self.block_history + self.board_history
    }
}
