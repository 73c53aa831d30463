use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::db::{error::DbResult, repos::ChannelRepo};

pub struct PostgresChannelRepo {
    pool: PgPool,
}

impl PostgresChannelRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepo for PostgresChannelRepo {
    async fn select_empty_channel_ids(&self, limit: u32) -> DbResult<Vec<String>> {
        // Archived channels qualify too; losing their last member makes
        // them purgeable like any other.
        let rows = sqlx::query(
            r#"
            SELECT id FROM channels
            WHERE NOT EXISTS (
                SELECT 1 FROM channelmembers
                WHERE channelmembers.channelid = channels.id
            )
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn count_remaining(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM channels WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
