pub mod accounts;
pub mod file_store;

pub use accounts::{AccountClient, AccountError, AccountUser, HttpAccountClient};
pub use file_store::{FileStore, FileStoreError, LocalFileStore};
