use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::placeholders;
use crate::db::{
    error::DbResult,
    repos::{FileInfoRepo, OrphanedFile},
};

pub struct SqliteFileInfoRepo {
    pool: SqlitePool,
}

impl SqliteFileInfoRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileInfoRepo for SqliteFileInfoRepo {
    async fn select_orphaned_board_files(&self) -> DbResult<Vec<OrphanedFile>> {
        // Board attachments keep their block's fileId as the tail of the
        // stored path, so a path with no matching block is an orphan.
        let rows = sqlx::query(
            r#"
            SELECT id, path FROM fileinfo
            WHERE creatorid = 'boards'
              AND NOT EXISTS (
                SELECT 1 FROM focalboard_blocks
                WHERE NOT json_extract(focalboard_blocks.fields, '$.fileId') = ''
                  AND fileinfo.path LIKE '%' || json_extract(focalboard_blocks.fields, '$.fileId')
              )
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| OrphanedFile {
                id: row.get("id"),
                path: row.get("path"),
            })
            .collect())
    }

    async fn delete_file_infos(&self, file_ids: &[String]) -> DbResult<u64> {
        if file_ids.is_empty() {
            return Ok(0);
        }

        let marks = placeholders(file_ids.len());
        let sql = format!("DELETE FROM fileinfo WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in file_ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
