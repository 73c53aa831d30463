use std::sync::Arc;

use async_trait::async_trait;

use super::error::PurgeResult;
use super::progress::ProgressTracker;
use crate::db::DbPool;
use crate::services::{AccountClient, FileStore};
use crate::targets::TargetUser;

/// Everything a stage needs to do its work.
pub struct StageContext {
    pub db: Arc<DbPool>,
    pub accounts: Arc<dyn AccountClient>,
    pub files: Arc<dyn FileStore>,
    pub progress: Arc<ProgressTracker>,
    /// Users this job removes, already filtered and confirmed.
    pub targets: Vec<TargetUser>,
    pub batch_size: u32,
}

/// One named, idempotent unit of cleanup.
///
/// A stage is a function of current store state: run against a store
/// where nothing qualifies, it deletes nothing and succeeds. Stages
/// never retry; any error aborts the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the stage, returning the number of rows it removed.
    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64>;
}
