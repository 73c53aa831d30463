use async_trait::async_trait;

use crate::db::error::DbResult;

/// Cluster-wide job lock backed by the relational store.
///
/// The lock row is the only table scour owns. Acquisition is a single
/// atomic insert-if-absent with no queueing, blocking or expiry. A second
/// caller is rejected, and a crashed holder must be cleared explicitly
/// (`scour unlock`).
#[async_trait]
pub trait JobLockRepo: Send + Sync {
    /// Create the lock table if it does not exist yet.
    async fn ensure_table(&self) -> DbResult<()>;

    /// Atomically take the named lock. Returns false if already held.
    async fn try_acquire(&self, name: &str) -> DbResult<bool>;

    /// Release the named lock unconditionally.
    async fn release(&self, name: &str) -> DbResult<()>;
}
