use async_trait::async_trait;

use super::error::{PurgeError, PurgeResult};

/// One deletable family of rows, drained in bounded batches.
///
/// Implementations select candidate IDs and delete a batch of them
/// together with all dependent rows, each batch in its own transaction.
#[async_trait]
pub trait BatchTarget: Send + Sync {
    /// Select up to `limit` candidate IDs still present in the store.
    async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>>;

    /// Delete the batch and everything that depends on it.
    async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted>;
}

/// Row counts from one deleted batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchDeleted {
    /// Candidate rows removed.
    pub candidates: u64,
    /// Dependent rows removed alongside them.
    pub dependents: u64,
}

/// Totals over a full drain of one target.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchStats {
    pub batches: u64,
    pub candidates_deleted: u64,
    pub dependents_deleted: u64,
}

impl BatchStats {
    pub fn rows_deleted(&self) -> u64 {
        self.candidates_deleted + self.dependents_deleted
    }
}

/// Drain a target: select, delete, repeat until an empty selection.
///
/// A batch whose delete removes fewer candidates than were selected
/// would reselect the same rows forever, so that is a hard
/// `BatchStalled` error instead.
pub async fn drain(target: &dyn BatchTarget, batch_size: u32) -> PurgeResult<BatchStats> {
    let mut stats = BatchStats::default();

    loop {
        let ids = target.select_candidates(batch_size).await?;
        if ids.is_empty() {
            return Ok(stats);
        }

        let deleted = target.delete_batch(&ids).await?;
        if deleted.candidates < ids.len() as u64 {
            return Err(PurgeError::BatchStalled {
                selected: ids.len(),
                deleted: deleted.candidates,
            });
        }

        stats.batches += 1;
        stats.candidates_deleted += deleted.candidates;
        stats.dependents_deleted += deleted.dependents;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Target backed by a plain countdown, two dependents per candidate.
    struct CountdownTarget {
        remaining: Mutex<u64>,
    }

    impl CountdownTarget {
        fn new(rows: u64) -> Self {
            Self {
                remaining: Mutex::new(rows),
            }
        }
    }

    #[async_trait]
    impl BatchTarget for CountdownTarget {
        async fn select_candidates(&self, limit: u32) -> PurgeResult<Vec<String>> {
            let remaining = *self.remaining.lock().unwrap();
            let count = remaining.min(u64::from(limit));
            Ok((0..count).map(|i| format!("row-{i}")).collect())
        }

        async fn delete_batch(&self, ids: &[String]) -> PurgeResult<BatchDeleted> {
            let mut remaining = self.remaining.lock().unwrap();
            *remaining -= ids.len() as u64;
            Ok(BatchDeleted {
                candidates: ids.len() as u64,
                dependents: 2 * ids.len() as u64,
            })
        }
    }

    /// Target whose deletes never remove anything.
    struct StuckTarget;

    #[async_trait]
    impl BatchTarget for StuckTarget {
        async fn select_candidates(&self, _limit: u32) -> PurgeResult<Vec<String>> {
            Ok(vec!["stuck".to_string()])
        }

        async fn delete_batch(&self, _ids: &[String]) -> PurgeResult<BatchDeleted> {
            Ok(BatchDeleted::default())
        }
    }

    #[tokio::test]
    async fn test_drain_terminates_in_ceil_k_over_b_batches() {
        let target = CountdownTarget::new(2500);
        let stats = drain(&target, 1000).await.unwrap();
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.candidates_deleted, 2500);
        assert_eq!(stats.dependents_deleted, 5000);
        assert_eq!(stats.rows_deleted(), 7500);
    }

    #[tokio::test]
    async fn test_drain_exact_multiple_of_batch_size() {
        let target = CountdownTarget::new(2000);
        let stats = drain(&target, 1000).await.unwrap();
        assert_eq!(stats.batches, 2);
    }

    #[tokio::test]
    async fn test_drain_empty_target_is_a_noop() {
        let target = CountdownTarget::new(0);
        let stats = drain(&target, 1000).await.unwrap();
        assert_eq!(stats.batches, 0);
        assert_eq!(stats.rows_deleted(), 0);
    }

    #[tokio::test]
    async fn test_drain_stalled_batch_is_a_hard_error() {
        let err = drain(&StuckTarget, 1000).await.unwrap_err();
        assert!(matches!(
            err,
            PurgeError::BatchStalled {
                selected: 1,
                deleted: 0
            }
        ));
    }
}
