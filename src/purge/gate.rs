use std::sync::Arc;

use super::error::{PurgeError, PurgeResult};
use crate::db::JobLockRepo;

/// Lock name shared by every node in the cluster.
const PURGE_LOCK: &str = "bulk-purge";

/// Cluster-wide exclusivity gate over the job-lock table.
///
/// At most one purge job may run at a time across all nodes sharing the
/// store. There is no queueing: a second caller is rejected outright.
pub struct ExclusivityGate {
    locks: Arc<dyn JobLockRepo>,
}

impl ExclusivityGate {
    pub fn new(locks: Arc<dyn JobLockRepo>) -> Self {
        Self { locks }
    }

    /// Take the gate, creating the lock table on first use.
    pub async fn acquire(&self) -> PurgeResult<()> {
        self.locks.ensure_table().await?;
        if self.locks.try_acquire(PURGE_LOCK).await? {
            Ok(())
        } else {
            Err(PurgeError::ExclusivityConflict)
        }
    }

    pub async fn release(&self) -> PurgeResult<()> {
        self.locks.release(PURGE_LOCK).await?;
        Ok(())
    }

    /// Clear a stale lock left behind by a crashed run.
    pub async fn force_release(&self) -> PurgeResult<()> {
        self.locks.ensure_table().await?;
        self.locks.release(PURGE_LOCK).await?;
        Ok(())
    }
}
