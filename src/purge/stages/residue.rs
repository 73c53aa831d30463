use async_trait::async_trait;

use crate::purge::error::PurgeResult;
use crate::purge::stage::{Stage, StageContext};

/// Sweep the small per-user reference tables (status, channel member
/// history, sidebar rows, notice state) for rows whose user is gone.
pub struct UserResidueStage;

#[async_trait]
impl Stage for UserResidueStage {
    fn name(&self) -> &'static str {
        "user-residue"
    }

    async fn run(&self, ctx: &StageContext) -> PurgeResult<u64> {
        let deleted = ctx.db.user_content().purge_user_residue().await?;
        Ok(deleted.total())
    }
}
