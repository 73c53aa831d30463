use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::db::{
    error::DbResult,
    repos::{PostGraphDeleted, ResidueDeleted, UserContentRepo},
};

pub struct PostgresUserContentRepo {
    pool: PgPool,
}

impl PostgresUserContentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserContentRepo for PostgresUserContentRepo {
    async fn select_post_ids(&self, user_id: &str, limit: u32) -> DbResult<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM posts WHERE userid = $1 LIMIT $2")
            .bind(user_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_post_batch(&self, post_ids: &[String]) -> DbResult<PostGraphDeleted> {
        if post_ids.is_empty() {
            return Ok(PostGraphDeleted::default());
        }

        let mut tx = self.pool.begin().await?;
        let mut deleted = PostGraphDeleted::default();

        deleted.threads = sqlx::query("DELETE FROM threads WHERE postid = ANY($1)")
            .bind(post_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        deleted.thread_memberships =
            sqlx::query("DELETE FROM threadmemberships WHERE postid = ANY($1)")
                .bind(post_ids)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        deleted.reactions = sqlx::query("DELETE FROM reactions WHERE postid = ANY($1)")
            .bind(post_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Replies to the batch. Candidates themselves are excluded so the
        // final delete reliably accounts for every selected ID.
        deleted.replies =
            sqlx::query("DELETE FROM posts WHERE rootid = ANY($1) AND NOT id = ANY($1)")
                .bind(post_ids)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        deleted.posts = sqlx::query("DELETE FROM posts WHERE id = ANY($1)")
            .bind(post_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }

    async fn purge_user_residue(&self) -> DbResult<ResidueDeleted> {
        let mut deleted = ResidueDeleted::default();

        deleted.status_rows = sqlx::query(
            r#"
            DELETE FROM status
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = status.userid
            )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        deleted.channel_member_history = sqlx::query(
            r#"
            DELETE FROM channelmemberhistory
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = channelmemberhistory.userid
            )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        deleted.sidebar_channels = sqlx::query(
            r#"
            DELETE FROM sidebarchannels
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = sidebarchannels.userid
            )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        deleted.sidebar_categories = sqlx::query(
            r#"
            DELETE FROM sidebarcategories
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = sidebarcategories.userid
            )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        deleted.notice_states = sqlx::query(
            r#"
            DELETE FROM productnoticeviewstate
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = productnoticeviewstate.userid
            )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}
