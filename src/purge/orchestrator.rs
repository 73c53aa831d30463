use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::{PurgeError, PurgeResult};
use super::gate::ExclusivityGate;
use super::pipeline::Pipeline;
use super::progress::{ProgressTracker, spawn_reporter};
use super::stage::StageContext;
use super::status::{StatusSink, StatusUpdate};
use crate::config::StorageConfig;
use crate::db::DbPool;
use crate::services::{AccountClient, FileStore};
use crate::targets::TargetUser;

/// Observable state of a purge job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Acquiring,
    Running {
        stage: &'static str,
    },
    Completed {
        users_removed: u64,
        rows_removed: u64,
    },
    Failed {
        reason: String,
        completed: u64,
        total: u64,
    },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Report the target set; acquire nothing, mutate nothing.
    DryRun,
    Live,
}

/// Handle to a submitted job.
pub struct JobHandle {
    pub state: watch::Receiver<JobState>,
    handle: JoinHandle<()>,
}

impl JobHandle {
    /// Wait for the job to reach a terminal state and return it.
    pub async fn wait(mut self) -> JobState {
        while !self.state.borrow().is_terminal() {
            if self.state.changed().await.is_err() {
                break;
            }
        }
        if let Err(err) = self.handle.await {
            tracing::error!(error = %err, "purge job task panicked");
        }
        let state = self.state.borrow().clone();
        state
    }
}

/// Drives one purge job through its lifecycle: configuration check,
/// gate acquisition, the stage pipeline, gate release, terminal report.
///
/// The gate is released on every exit path out of a running pipeline,
/// success or failure, before the terminal status goes out.
pub struct Orchestrator {
    db: Arc<DbPool>,
    accounts: Arc<dyn AccountClient>,
    files: Arc<dyn FileStore>,
    sink: Arc<dyn StatusSink>,
    storage: StorageConfig,
    batch_size: u32,
}

impl Orchestrator {
    pub fn new(
        db: Arc<DbPool>,
        accounts: Arc<dyn AccountClient>,
        files: Arc<dyn FileStore>,
        sink: Arc<dyn StatusSink>,
        storage: StorageConfig,
        batch_size: u32,
    ) -> Self {
        Self {
            db,
            accounts,
            files,
            sink,
            storage,
            batch_size,
        }
    }

    /// Submit a job and return immediately; the work runs on the
    /// runtime in the background.
    pub fn submit(self: &Arc<Self>, mode: RunMode, targets: Vec<TargetUser>) -> JobHandle {
        let (tx, rx) = watch::channel(JobState::Idle);
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.execute(mode, targets, tx).await;
        });
        JobHandle { state: rx, handle }
    }

    async fn execute(&self, mode: RunMode, targets: Vec<TargetUser>, tx: watch::Sender<JobState>) {
        let total = targets.len() as u64;

        if mode == RunMode::DryRun {
            let emails = targets.into_iter().map(|target| target.email).collect();
            self.sink.publish(StatusUpdate::DryRun { emails }).await;
            let _ = tx.send(JobState::Completed {
                users_removed: 0,
                rows_removed: 0,
            });
            return;
        }

        if let Err(err) = self.check_configuration() {
            self.finish_failed(&tx, err, 0, total).await;
            return;
        }

        let _ = tx.send(JobState::Acquiring);
        let gate = ExclusivityGate::new(self.db.job_locks());
        if let Err(err) = gate.acquire().await {
            self.finish_failed(&tx, err, 0, total).await;
            return;
        }

        self.sink.publish(StatusUpdate::Started { total }).await;

        let (tracker, progress_rx) = ProgressTracker::new(total);
        let tracker = Arc::new(tracker);
        let reporter = spawn_reporter(progress_rx, Arc::clone(&self.sink));

        let ctx = StageContext {
            db: Arc::clone(&self.db),
            accounts: Arc::clone(&self.accounts),
            files: Arc::clone(&self.files),
            progress: Arc::clone(&tracker),
            targets,
            batch_size: self.batch_size,
        };

        let pipeline = Pipeline::standard();
        let result = pipeline
            .run(&ctx, |stage| {
                let _ = tx.send(JobState::Running { stage });
            })
            .await;

        if let Err(err) = gate.release().await {
            tracing::error!(error = %err, "failed to release the purge lock");
        }

        let completed = tracker.completed();
        drop(ctx);
        drop(tracker);
        // All senders are gone; the reporter flushes its last pending
        // update and exits before the terminal status goes out.
        if let Err(err) = reporter.await {
            tracing::error!(error = %err, "progress reporter task panicked");
        }

        match result {
            Ok(rows) => {
                self.sink
                    .publish(StatusUpdate::Completed {
                        completed,
                        rows_deleted: rows,
                    })
                    .await;
                let _ = tx.send(JobState::Completed {
                    users_removed: completed,
                    rows_removed: rows,
                });
            }
            Err(err) => self.finish_failed(&tx, err, completed, total).await,
        }
    }

    fn check_configuration(&self) -> PurgeResult<()> {
        if !self.storage.is_local() {
            return Err(PurgeError::Configuration(format!(
                "file removal requires the local storage driver, configured driver is '{}'",
                self.storage.driver
            )));
        }
        Ok(())
    }

    async fn finish_failed(
        &self,
        tx: &watch::Sender<JobState>,
        err: PurgeError,
        completed: u64,
        total: u64,
    ) {
        tracing::error!(error = %err, "purge job failed");
        let reason = err.to_string();
        self.sink
            .publish(StatusUpdate::Failed {
                reason: reason.clone(),
                completed,
                total,
            })
            .await;
        let _ = tx.send(JobState::Failed {
            reason,
            completed,
            total,
        });
    }
}
