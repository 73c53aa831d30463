mod boards;
mod channels;
mod file_info;
mod job_locks;
mod playbooks;
mod user_content;

pub use boards::*;
pub use channels::*;
pub use file_info::*;
pub use job_locks::*;
pub use playbooks::*;
pub use user_content::*;
