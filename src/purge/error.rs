use thiserror::Error;

use crate::db::DbError;
use crate::services::{AccountError, FileStoreError};

/// Errors that abort a purge job.
///
/// None of these are retried. A database failure rolls back the current
/// batch only; previously committed batches stand.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("another purge job is already running")]
    ExclusivityConflict,

    #[error("account service returned status {status} while removing {subject}")]
    ExternalService { status: u16, subject: String },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    FileStore(#[from] FileStoreError),

    #[error("stage {stage} aborted: {source}")]
    StageAbort {
        stage: &'static str,
        #[source]
        source: Box<PurgeError>,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("batch deletes made no headway: selected {selected}, removed {deleted}")]
    BatchStalled { selected: usize, deleted: u64 },
}

pub type PurgeResult<T> = Result<T, PurgeError>;
