use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::placeholders;
use crate::db::{
    error::DbResult,
    repos::{BoardCascadeDeleted, BoardRepo},
};

pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

impl SqliteBoardRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardRepo for SqliteBoardRepo {
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
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_board_batch(&self, board_ids: &[String]) -> DbResult<BoardCascadeDeleted> {
        if board_ids.is_empty() {
            return Ok(BoardCascadeDeleted::default());
        }

        let marks = placeholders(board_ids.len());
        let mut tx = self.pool.begin().await?;
        let mut deleted = BoardCascadeDeleted::default();

        let sql = format!("DELETE FROM focalboard_blocks WHERE board_id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in board_ids {
            query = query.bind(id);
        }
        deleted.blocks = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM focalboard_blocks_history WHERE board_id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in board_ids {
            query = query.bind(id);
        }
        deleted.block_history = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM focalboard_boards_history WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in board_ids {
            query = query.bind(id);
        }
        deleted.board_history = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM focalboard_boards WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in board_ids {
            query = query.bind(id);
        }
        deleted.boards = query.execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }
}
