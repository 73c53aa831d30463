use std::sync::Arc;

use async_trait::async_trait;

use crate::db::ChannelRepo;
use crate::purge::batch::{self, BatchDeleted, BatchTarget};
use crate::purge::error::{PurgeError, PurgeResult};
use crate::purge::stage::{Stage, StageContext};

/// Remove channels with zero remaining members.
///
/// Channel removal goes through the channel-removal service rather than
/// SQL, one call per channel, 200 required; candidate selection and
/// removal verification stay local.
pub struct EmptyChannelsStage;

struct ChannelTarget {
    repo: Arc<dyn ChannelRepo>,
    accounts: Arc<dyn crate::services::AccountClient>,
}

#[async_trait]
impl BatchTarget for ChannelTarget {
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
        Ok(self.repo.select_empty_channel_ids(limit).await?)
    }

    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
        for id in ids {
            let status = self.accounts.delete_channel(id).await?;
            if status != 200 {
                return Err(PurgeError::ExternalService {
                    status,
                    subject: format!("channel {id}"),
                });
            }
        }
        // Only rows actually gone count; a service that answers 200
        // without removing the row trips the stall guard instead of
        // re-selecting the same IDs forever.
        let remaining = self.repo.count_remaining(ids).await?;
        Ok(BatchDeleted {
            candidates: ids.len() as u64 - remaining,
            dependents: 0,
        })
    }
}

#[async_trait]
impl Stage for EmptyChannelsStage {
    fn name(&self) -> &'static str {
        "empty-channels"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let target = ChannelTarget {
            repo: ctx.db.channels(),
            accounts: Arc::clone(&ctx.accounts),
        };
        let stats = batch::drain(&target, ctx.batch_size).await?;
        Ok(stats.rows_deleted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbPool, tests::harness};
    use crate::purge::testing::FakeAccountClient;

    #[tokio::test]
    async fn test_channel_service_that_keeps_rows_trips_the_stall_guard() {
        let pool = harness::create_platform_pool().await;
        sqlx::query("INSERT INTO channels (id) VALUES ('ch1')")
            .execute(&pool)
            .await
            .unwrap();
        let db = DbPool::from_sqlite(pool);

        // Answers 200 to every deletion but never touches the store.
        let accounts = Arc::new(FakeAccountClient::new(Vec::new()));
        let target = ChannelTarget {
            repo: db.channels(),
            accounts: accounts.clone(),
        };

        let err = batch::drain(&target, 10).await.unwrap_err();
        assert!(matches!(err, PurgeError::BatchStalled { .. }));
        assert_eq!(accounts.deleted_channels.lock().unwrap().as_slice(), ["ch1"]);
    }
}
