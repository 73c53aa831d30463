use std::sync::Arc;

use async_trait::async_trait;

use crate::db::UserContentRepo;
use crate::purge::batch::{self, BatchDeleted, BatchTarget};
use crate::purge::error::{PurgeError, PurgeResult};
use crate::purge::stage::{Stage, StageContext};

/// Remove each target account and its entire post graph.
///
/// Per user: the accounts service deletes the account (200 required),
/// then the user's posts drain in batches together with their threads,
/// thread memberships, reactions and replies. One progress tick per
/// fully processed user.
pub struct DeleteUsersStage;

struct PostGraphTarget<'a> {
    repo: Arc<dyn UserContentRepo>,
    user_id: &'a str,
}

#[async_trait]
impl BatchTarget for PostGraphTarget<'_> {
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
        Ok(self.repo.select_post_ids(self.user_id, limit).await?)
    }

    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
        let deleted = self.repo.delete_post_batch(ids).await?;
        Ok(BatchDeleted {
            candidates: deleted.posts,
            dependents: deleted.dependents(),
        })
    }
}

#[async_trait]
impl Stage for DeleteUsersStage {
    fn name(&self) -> &'static str {
        "delete-users"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let repo = ctx.db.user_content();
        let mut rows = 0;

        for user in &ctx.targets {
            let status = ctx.accounts.delete_user(&user.id).await?;
            if status != 200 {
                return Err(PurgeError::ExternalService {
                    status,
                    subject: user.email.clone(),
                });
            }

            let target = PostGraphTarget {
                repo: Arc::clone(&repo),
                user_id: &user.id,
            };
            let stats = batch::drain(&target, ctx.batch_size).await?;
            rows += stats.rows_deleted();

            tracing::debug!(
                email = %user.email,
                posts = stats.candidates_deleted,
                "user account removed"
            );
            ctx.progress.tick();
        }

        Ok(rows)
    }
}
