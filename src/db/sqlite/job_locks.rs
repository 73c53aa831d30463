use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::{error::DbResult, repos::JobLockRepo};

pub struct SqliteJobLockRepo {
    pool: SqlitePool,
}

impl SqliteJobLockRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLockRepo for SqliteJobLockRepo {
    async fn ensure_table(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scour_job_locks (
                name TEXT PRIMARY KEY,
                acquired_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_acquire(&self, name: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO scour_job_locks (name, acquired_at)
            VALUES (?, ?)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, name: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM scour_job_locks WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
