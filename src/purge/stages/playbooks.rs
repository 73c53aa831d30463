use std::sync::Arc;

use async_trait::async_trait;

use crate::db::PlaybookRepo;
use crate::purge::batch::{self, BatchDeleted, BatchTarget};
use crate::purge::error::PurgeResult;
use crate::purge::stage::{Stage, StageContext};

/// Sweep user-keyed playbook rows (categories and their items,
/// auto-follows, members, run participants, viewed channels, user info)
/// once the owning users are gone.
pub struct DanglingPlaybookMembersStage;

#[async_trait]
impl Stage for DanglingPlaybookMembersStage {
    fn name(&self) -> &'static str {
        "dangling-playbook-members"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let deleted = ctx.db.playbooks().delete_dangling_membership_rows().await?;
        Ok(deleted.total())
    }
}

/// Remove playbook runs with zero remaining participants, cascading
/// into their metrics, status posts and timeline events.
pub struct EmptyRunsStage;

struct RunTarget {
    repo: Arc<dyn PlaybookRepo>,
}

#[async_trait]
impl BatchTarget for RunTarget {
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
        Ok(self.repo.select_empty_run_ids(limit).await?)
    }

    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
        let deleted = self.repo.delete_run_batch(ids).await?;
        Ok(BatchDeleted {
            candidates: deleted.runs,
            dependents: deleted.dependents(),
        })
    }
}

#[async_trait]
impl Stage for EmptyRunsStage {
    fn name(&self) -> &'static str {
        "empty-playbook-runs"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let target = RunTarget {
            repo: ctx.db.playbooks(),
        };
        let stats = batch::drain(&target, ctx.batch_size).await?;
        Ok(stats.rows_deleted())
    }
}

/// Remove playbooks with zero remaining members, cascading into their
/// metric configs and auto-follows.
pub struct EmptyPlaybooksStage;

struct PlaybookTarget {
    repo: Arc<dyn PlaybookRepo>,
}

#[async_trait]
impl BatchTarget for PlaybookTarget {
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
        Ok(self.repo.select_empty_playbook_ids(limit).await?)
    }

    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
        let deleted = self.repo.delete_playbook_batch(ids).await?;
        Ok(BatchDeleted {
            candidates: deleted.playbooks,
            dependents: deleted.dependents(),
        })
    }
}

#[async_trait]
impl Stage for EmptyPlaybooksStage {
    fn name(&self) -> &'static str {
        "empty-playbooks"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let target = PlaybookTarget {
            repo: ctx.db.playbooks(),
        };
        let stats = batch::drain(&target, ctx.batch_size).await?;
        Ok(stats.rows_deleted())
    }
}

/// Drop channel-action rows whose channel no longer exists.
pub struct DanglingChannelActionsStage;

#[async_trait]
impl Stage for DanglingChannelActionsStage {
    fn name(&self) -> &'static str {
        "dangling-channel-actions"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        Ok(ctx.db.playbooks().delete_dangling_channel_actions().await?)
    }
}
