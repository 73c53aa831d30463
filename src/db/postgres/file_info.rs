use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::db::{
    error::DbResult,
    repos::{FileInfoRepo, OrphanedFile},
};

pub struct PostgresFileInfoRepo {
    pool: PgPool,
}

impl PostgresFileInfoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileInfoRepo for PostgresFileInfoRepo {
    async fn select_orphaned_board_files(&self) -> DbResult<Vec<OrphanedFile>> {
        // Board attachments keep their block's fileId as the tail of the
        // stored path, so a path with no matching block is an orphan.
        let rows = sqlx::query(
            r#"
            SELECT id, path FROM fileinfo
            WHERE creatorid = 'boards'
              AND NOT EXISTS (
                SELECT 1 FROM focalboard_blocks
                WHERE NOT focalboard_blocks.fields->>'fileId' = ''
                  AND fileinfo.path LIKE '%' || (focalboard_blocks.fields->>'fileId')
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

        let result = sqlx::query("DELETE FROM fileinfo WHERE id = ANY($1)")
            .bind(file_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
