use async_trait::async_trait;

use crate::db::error::DbResult;

/// Repository over playbooks, their runs, and the user-keyed rows around
/// them.
#[async_trait]
pub trait PlaybookRepo: Send + Sync {
    /// Delete playbook-adjacent rows whose owning user no longer exists:
    /// categories (with their items, in one transaction), auto-follows,
    /// playbook members, run participants, viewed-channel markers and
    /// per-user info rows.
    async fn delete_dangling_membership_rows(&self) -> DbResult<PlaybookResidueDeleted>;

    /// Select up to `limit` IDs of runs with zero remaining participants.
    async fn select_empty_run_ids(&self, limit: u32) -> DbResult<Vec<String>>;

    /// Within one transaction, delete the metrics, status posts and
    /// timeline events of `run_ids`, then the runs themselves.
    async fn delete_run_batch(&self, run_ids: &[String]) -> DbResult<RunCascadeDeleted>;

    /// Select up to `limit` IDs of playbooks with zero remaining members.
    async fn select_empty_playbook_ids(&self, limit: u32) -> DbResult<Vec<String>>;

    /// Within one transaction, delete the metric configs and auto-follows
    /// of `playbook_ids`, then the playbooks themselves.
    async fn delete_playbook_batch(&self, playbook_ids: &[String])
    -> DbResult<PlaybookCascadeDeleted>;

    /// Delete channel-action rows whose channel no longer exists.
    async fn delete_dangling_channel_actions(&self) -> DbResult<u64>;
}

/// Counts from a dangling-membership purge pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybookResidueDeleted {
    pub category_items: u64,
    pub categories: u64,
    pub auto_follows: u64,
    pub members: u64,
    pub run_participants: u64,
    pub viewed_channels: u64,
    pub user_infos: u64,
}

impl PlaybookResidueDeleted {
    pub fn total(&self) -> u64 {
        self.category_items
            + self.categories
            + self.auto_follows
            + self.members
            + self.run_participants
            + self.viewed_channels
            + self.user_infos
    }
}

/// Counts from one run cascade batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCascadeDeleted {
    pub metrics: u64,
    pub status_posts: u64,
    pub timeline_events: u64,
    /// Candidate runs removed.
    pub runs: u64,
}

impl RunCascadeDeleted {
    pub fn dependents(&self) -> u64 {
        self.metrics + self.status_posts + self.timeline_events
    }
}

/// Counts from one playbook cascade batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybookCascadeDeleted {
    pub metric_configs: u64,
    pub auto_follows: u64,
    /// Candidate playbooks removed.
    pub playbooks: u64,
}

impl PlaybookCascadeDeleted {
    pub fn dependents(&self) -> u64 {
        self.metric_configs + self.auto_follows
    }
}
