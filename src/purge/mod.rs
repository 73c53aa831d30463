//! The purge engine: batched cascade deletion of user accounts and the
//! data that becomes orphaned when they go.

pub mod batch;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod stage;
pub mod stages;
pub mod status;

#[cfg(test)]
pub mod testing;

pub use error::{PurgeError, PurgeResult};
pub use orchestrator::{JobHandle, JobState, Orchestrator, RunMode};
pub use status::{LogStatusSink, PostStatusSink, StatusSink, StatusUpdate};
