//! Shared fakes for purge tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::status::{StatusSink, StatusUpdate};
use crate::services::{AccountClient, AccountError, AccountUser, FileStore, FileStoreError};

/// Records every published status update.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn publish(&self, update: StatusUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

/// Account client fake over a fixed user list, for target resolution
/// tests. Deletions answer 200 and record the ID.
pub struct FakeAccountClient {
    pub users: Vec<AccountUser>,
    pub deleted_users: Mutex<Vec<String>>,
    pub deleted_channels: Mutex<Vec<String>>,
}

impl FakeAccountClient {
    pub fn new(users: Vec<AccountUser>) -> Self {
        Self {
            users,
            deleted_users: Mutex::new(Vec::new()),
            deleted_channels: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AccountClient for FakeAccountClient {
    async fn list_users(
        &self,
        page: u32,
        per_page: u32,
        inactive_only: bool,
    ) -> Result<Vec<AccountUser>, AccountError> {
        let start = (page as usize) * (per_page as usize);
        Ok(self
            .users
            .iter()
            .filter(|user| !inactive_only || user.is_deactivated())
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn delete_user(&self, user_id: &str) -> Result<u16, AccountError> {
        self.deleted_users.lock().unwrap().push(user_id.to_string());
        Ok(200)
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<u16, AccountError> {
        self.deleted_channels
            .lock()
            .unwrap()
            .push(channel_id.to_string());
        Ok(200)
    }

    async fn create_post(&self, _channel_id: &str, _message: &str) -> Result<String, AccountError> {
        Ok("status-post".to_string())
    }

    async fn update_post(&self, _post_id: &str, _message: &str) -> Result<(), AccountError> {
        Ok(())
    }
}

/// File store fake that records removals and pretends every path exists.
#[derive(Default)]
pub struct FakeFileStore {
    pub removed: Mutex<Vec<String>>,
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn exists(&self, _path: &str) -> Result<bool, FileStoreError> {
        Ok(true)
    }

    async fn remove(&self, path: &str) -> Result<(), FileStoreError> {
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Account client fake wired to the test store, mimicking the platform
/// service acting on the same database: deleting a user or channel
/// removes its row.
pub struct StoreBackedAccountClient {
    pool: sqlx::SqlitePool,
    pub failing_user_ids: Vec<String>,
    pub failure_status: u16,
}

impl StoreBackedAccountClient {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            pool,
            failing_user_ids: Vec::new(),
            failure_status: 502,
        }
    }

    pub fn failing_user(mut self, id: &str, status: u16) -> Self {
        self.failing_user_ids.push(id.to_string());
        self.failure_status = status;
        self
    }
}

#[async_trait]
impl AccountClient for StoreBackedAccountClient {
    async fn list_users(
        &self,
        _page: u32,
        _per_page: u32,
        _inactive_only: bool,
    ) -> Result<Vec<AccountUser>, AccountError> {
        Ok(Vec::new())
    }

    async fn delete_user(&self, user_id: &str) -> Result<u16, AccountError> {
        if self.failing_user_ids.iter().any(|id| id == user_id) {
            return Ok(self.failure_status);
        }
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .unwrap();
        Ok(200)
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<u16, AccountError> {
        sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(channel_id)
            .execute(&self.pool)
            .await
            .unwrap();
        Ok(200)
    }

    async fn create_post(&self, _channel_id: &str, _message: &str) -> Result<String, AccountError> {
        Ok("status-post".to_string())
    }

    async fn update_post(&self, _post_id: &str, _message: &str) -> Result<(), AccountError> {
        Ok(())
    }
}

pub fn account_user(id: &str, email: &str, roles: &str, delete_at: i64) -> AccountUser {
    AccountUser {
        id: id.to_string(),
        email: email.to_string(),
        roles: roles.to_string(),
        delete_at,
    }
}
