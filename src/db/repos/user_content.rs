use async_trait::async_trait;

use crate::db::error::DbResult;

/// Repository over a user's authored content and user-keyed reference rows.
///
/// The post graph (posts, replies, threads, thread memberships, reactions)
/// is unbounded per user and is drained through the batch cursor; the
/// residue tables are small reference tables keyed directly by user ID and
/// are cleared with single conditional deletes.
#[async_trait]
pub trait UserContentRepo: Send + Sync {
    /// Select up to `limit` IDs of posts authored by `user_id`.
    async fn select_post_ids(&self, user_id: &str, limit: u32) -> DbResult<Vec<String>>;

    /// Within one transaction, delete everything hanging off `post_ids`
    /// (threads, thread memberships, reactions, replies) and then the
    /// posts themselves.
    async fn delete_post_batch(&self, post_ids: &[String]) -> DbResult<PostGraphDeleted>;

    /// Delete user-derived reference rows whose owning user no longer
    /// exists: presence status, channel member history, sidebar categories
    /// and channels, product notice view state.
    async fn purge_user_residue(&self) -> DbResult<ResidueDeleted>;
}

/// Counts from one post-graph batch deletion.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostGraphDeleted {
    pub threads: u64,
    pub thread_memberships: u64,
    pub reactions: u64,
    pub replies: u64,
    /// Candidate posts removed. The batch driver compares this against the
    /// selected batch size to detect a stalled loop.
    pub posts: u64,
}

impl PostGraphDeleted {
    pub fn dependents(&self) -> u64 {
        self.threads + self.thread_memberships + self.reactions + self.replies
    }
}

/// Counts from a user-residue purge pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResidueDeleted {
    pub status_rows: u64,
    pub channel_member_history: u64,
    pub sidebar_categories: u64,
    pub sidebar_channels: u64,
    pub notice_states: u64,
}

impl ResidueDeleted {
    pub fn total(&self) -> u64 {
        self.status_rows
            + self.channel_member_history
            + self.sidebar_categories
            + self.sidebar_channels
            + self.notice_states
    }
}
