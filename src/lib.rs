//! scour: bulk, irreversible removal of user accounts from a
//! collaboration platform, cascading into everything their absence
//! orphans (posts, boards, playbooks, channels, stored files).

pub mod config;
pub mod db;
pub mod observability;
pub mod purge;
pub mod services;
pub mod targets;

pub use config::ScourConfig;
pub use purge::{JobState, Orchestrator, PurgeError, RunMode};
