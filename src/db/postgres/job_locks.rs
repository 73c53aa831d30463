use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{error::DbResult, repos::JobLockRepo};

pub struct PostgresJobLockRepo {
    pool: PgPool,
}

impl PostgresJobLockRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLockRepo for PostgresJobLockRepo {
    async fn ensure_table(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scour_job_locks (
                name TEXT PRIMARY KEY,
                acquired_at TIMESTAMPTZ NOT NULL
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
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, name: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM scour_job_locks WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
