use super::error::{PurgeError, PurgeResult};
use super::stage::{Stage, StageContext};
use super::stages::{
    DanglingBoardMembersStage, DanglingChannelActionsStage, DanglingPlaybookMembersStage,
    DeleteUsersStage, EmptyBoardsStage, EmptyChannelsStage, EmptyPlaybooksStage, EmptyRunsStage,
    UserResidueStage,
};

/// Ordered sequence of cleanup stages.
///
/// The order follows the dependency structure of the data: accounts and
/// their post graph first, then the reference tables keyed by user, then
/// the container cascades that those sweeps empty out. Stages run
/// strictly sequentially; the first error aborts the rest.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// The full nine-stage purge.
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(DeleteUsersStage),
                Box::new(UserResidueStage),
                Box::new(DanglingBoardMembersStage),
                Box::new(EmptyBoardsStage),
                Box::new(DanglingPlaybookMembersStage),
                Box::new(EmptyRunsStage),
                Box::new(EmptyPlaybooksStage),
                Box::new(DanglingChannelActionsStage),
                Box::new(EmptyChannelsStage),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage in order. `on_stage` fires before each stage
    /// starts, carrying its name. Returns total rows removed.
    pub async fn run(
        &self,
        ctx: &StageContext,
        mut on_stage: impl FnMut(&'static str),
    ) -> PurgeResult<u64> {
        let mut rows = 0;

        for stage in &self.stages {
            let name = stage.name();
            on_stage(name);
            tracing::info!(stage = name, "stage starting");

            match stage.run(ctx).await {
                Ok(deleted) => {
                    tracing::info!(stage = name, rows = deleted, "stage finished");
                    rows += deleted;
                }
                Err(source) => {
                    return Err(PurgeError::StageAbort {
                        stage: name,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(rows)
    }
}
