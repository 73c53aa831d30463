use async_trait::async_trait;

use crate::db::error::DbResult;

/// Repository over conversation channels.
///
/// Channel deletion itself goes through the channel-removal service, not
/// SQL; this repo finds the candidates and verifies their removal.
#[async_trait]
pub trait ChannelRepo: Send + Sync {
    /// Select up to `limit` IDs of channels with zero remaining members.
    async fn select_empty_channel_ids(&self, limit: u32) -> DbResult<Vec<String>>;

    /// Count how many of `ids` still have a channels row.
    async fn count_remaining(&self, ids: &[String]) -> DbResult<u64>;
}
