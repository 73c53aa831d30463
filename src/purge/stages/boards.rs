use std::sync::Arc;

use async_trait::async_trait;

use crate::db::BoardRepo;
use crate::purge::batch::{self, BatchDeleted, BatchTarget};
use crate::purge::error::PurgeResult;
use crate::purge::stage::{Stage, StageContext};

/// Drop board memberships whose user no longer exists. The synthetic
/// `system` member is exempt so template boards keep their owner row.
pub struct DanglingBoardMembersStage;

#[async_trait]
impl Stage for DanglingBoardMembersStage {
    fn name(&self) -> &'static str {
        "dangling-board-members"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        Ok(ctx.db.boards().delete_dangling_members().await?)
    }
}

/// Remove boards with zero members, their blocks and history, then the
/// board files that lost their last referencing block: file-info rows
/// and the bytes in the file store.
pub struct EmptyBoardsStage;

struct BoardTarget {
    repo: Arc<dyn BoardRepo>,
}

#[async_trait]
impl BatchTarget for BoardTarget {
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
        Ok(self.repo.select_empty_board_ids(limit).await?)
    }

    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
        let deleted = self.repo.delete_board_batch(ids).await?;
        Ok(BatchDeleted {
            candidates: deleted.boards,
            dependents: deleted.dependents(),
        })
    }
}

#[async_trait]
impl Stage for EmptyBoardsStage {
    fn name(&self) -> &'static str {
        "empty-boards"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let target = BoardTarget {
            repo: ctx.db.boards(),
        };
        let stats = batch::drain(&target, ctx.batch_size).await?;
        let mut rows = stats.rows_deleted();

        let orphans = ctx.db.file_info().select_orphaned_board_files().await?;
        if orphans.is_empty() {
            return Ok(rows);
        }

        for orphan in &orphans {
            if !ctx.files.exists(&orphan.path).await? {
                tracing::warn!(path = %orphan.path, "orphaned board file already missing");
                continue;
            }
            ctx.files.remove(&orphan.path).await?;
        }

        let ids: Vec<String> = orphans.into_iter().map(|orphan| orphan.id).collect();
        rows += ctx.db.file_info().delete_file_infos(&ids).await?;

        Ok(rows)
    }
}
