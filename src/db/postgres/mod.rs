mod boards;
mod channels;
mod file_info;
mod job_locks;
mod playbooks;
mod user_content;

pub use boards::PostgresBoardRepo;
pub use channels::PostgresChannelRepo;
pub use file_info::PostgresFileInfoRepo;
pub use job_locks::PostgresJobLockRepo;
pub use playbooks::PostgresPlaybookRepo;
pub use user_content::PostgresUserContentRepo;
