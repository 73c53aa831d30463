mod boards;
mod channels;
mod common;
mod file_info;
mod job_locks;
mod playbooks;
mod user_content;

pub use boards::SqliteBoardRepo;
pub use channels::SqliteChannelRepo;
pub use file_info::SqliteFileInfoRepo;
pub use job_locks::SqliteJobLockRepo;
pub use playbooks::SqlitePlaybookRepo;
pub use user_content::SqliteUserContentRepo;
