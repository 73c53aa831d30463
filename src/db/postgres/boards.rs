use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::db::{
    error::DbResult,
    repos::{BoardCascadeDeleted, BoardRepo},
};

pub struct PostgresBoardRepo {
    pool: PgPool,
}

impl PostgresBoardRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardRepo for PostgresBoardRepo {
    async fn delete_dangling_members(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM focalboard_board_members
            WHERE NOT EXISTS (
                SELECT 1 FROM users
                WHERE users.id = focalboard_board_members.user_id
            ) AND NOT focalboard_board_members.user_id = 'system'
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn select_empty_board_ids(&self, limit: u32) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM focalboard_boards
            WHERE NOT EXISTS (
                SELECT 1 FROM focalboard_board_members
                WHERE focalboard_board_members.board_id = focalboard_boards.id
            )
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_board_batch(&self, board_ids: &[String]) -> DbResult<BoardCascadeDeleted> {
        if board_ids.is_empty() {
            return Ok(BoardCascadeDeleted::default());
        }

        let mut tx = self.pool.begin().await?;
        let mut deleted = BoardCascadeDeleted::default();

        deleted.blocks = sqlx::query("DELETE FROM focalboard_blocks WHERE board_id = ANY($1)")
            .bind(board_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        deleted.block_history =
            sqlx::query("DELETE FROM focalboard_blocks_history WHERE board_id = ANY($1)")
                .bind(board_ids)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        deleted.board_history =
            sqlx::query("DELETE FROM focalboard_boards_history WHERE id = ANY($1)")
                .bind(board_ids)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        deleted.boards = sqlx::query("DELETE FROM focalboard_boards WHERE id = ANY($1)")
            .bind(board_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }
}
