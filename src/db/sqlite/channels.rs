use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::placeholders;
use crate::db::{error::DbResult, repos::ChannelRepo};

pub struct SqliteChannelRepo {
    pool: SqlitePool,
}

impl SqliteChannelRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepo for SqliteChannelRepo {
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
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn count_remaining(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let marks = placeholders(ids.len());
        let sql = format!("SELECT COUNT(*) FROM channels WHERE id IN ({marks})");
        let mut query = sqlx::query_scalar(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let count: i64 = query.fetch_one(&self.pool).await?;

        Ok(count as u64)
    }
}
