use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::placeholders;
use crate::db::{
    error::DbResult,
    repos::{PostGraphDeleted, ResidueDeleted, UserContentRepo},
};

pub struct SqliteUserContentRepo {
    pool: SqlitePool,
}

impl SqliteUserContentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserContentRepo for SqliteUserContentRepo {
    async fn select_post_ids(&self, user_id: &str, limit: u32) -> DbResult<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM posts WHERE userid = ? LIMIT ?")
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_post_batch(&self, post_ids: &[String]) -> DbResult<PostGraphDeleted> {
        if post_ids.is_empty() {
            return Ok(PostGraphDeleted::default());
        }

        let marks = placeholders(post_ids.len());
        let mut tx = self.pool.begin().await?;
        let mut deleted = PostGraphDeleted::default();

        let sql = format!("DELETE FROM threads WHERE postid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in post_ids {
            query = query.bind(id);
        }
        deleted.threads = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM threadmemberships WHERE postid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in post_ids {
            query = query.bind(id);
        }
        deleted.thread_memberships = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM reactions WHERE postid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in post_ids {
            query = query.bind(id);
        }
        deleted.reactions = query.execute(&mut *tx).await?.rows_affected();

        // Replies to the batch. Candidates themselves are excluded so the
        // final delete reliably accounts for every selected ID.
        let sql = format!("DELETE FROM posts WHERE rootid IN ({marks}) AND id NOT IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in post_ids {
            query = query.bind(id);
        }
        for id in post_ids {
            query = query.bind(id);
        }
        deleted.replies = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM posts WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in post_ids {
            query = query.bind(id);
        }
        deleted.posts = query.execute(&mut *tx).await?.rows_affected();

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::harness;

    async fn seed_user(pool: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO users (id, email) VALUES (?, ?)")
            .bind(id)
            .bind(format!("{id}@example.test"))
            .execute(pool)
            .await
            .unwrap();
    }

    async fn seed_post(pool: &SqlitePool, id: &str, user_id: &str, root_id: &str) {
        sqlx::query("INSERT INTO posts (id, userid, rootid) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(root_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_select_post_ids_respects_limit() {
        let pool = harness::create_platform_pool().await;
        let repo = SqliteUserContentRepo::new(pool.clone());
        seed_user(&pool, "u1").await;
        for i in 0..5 {
            seed_post(&pool, &format!("p{i}"), "u1", "").await;
        }

        let ids = repo.select_post_ids("u1", 3).await.unwrap();
        assert_eq!(ids.len(), 3);

        let ids = repo.select_post_ids("u1", 100).await.unwrap();
        assert_eq!(ids.len(), 5);

        let ids = repo.select_post_ids("nobody", 100).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_delete_post_batch_cascades() {
        let pool = harness::create_platform_pool().await;
        let repo = SqliteUserContentRepo::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_user(&pool, "u2").await;
        seed_post(&pool, "root1", "u1", "").await;
        // Reply from another user hangs off the candidate post.
        seed_post(&pool, "reply1", "u2", "root1").await;
        sqlx::query("INSERT INTO threads (postid) VALUES ('root1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO threadmemberships (postid, userid) VALUES ('root1', 'u2')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO reactions (postid, userid) VALUES ('root1', 'u2')")
            .execute(&pool)
            .await
            .unwrap();

        let deleted = repo
            .delete_post_batch(&["root1".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted.posts, 1);
        assert_eq!(deleted.replies, 1);
        assert_eq!(deleted.threads, 1);
        assert_eq!(deleted.thread_memberships, 1);
        assert_eq!(deleted.reactions, 1);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_delete_post_batch_counts_candidate_replies_once() {
        let pool = harness::create_platform_pool().await;
        let repo = SqliteUserContentRepo::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_post(&pool, "root1", "u1", "").await;
        // A reply that is itself in the candidate batch must be counted as
        // a candidate, not as a dependent.
        seed_post(&pool, "reply1", "u1", "root1").await;

        let deleted = repo
            .delete_post_batch(&["root1".to_string(), "reply1".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted.posts, 2);
        assert_eq!(deleted.replies, 0);
    }

    #[tokio::test]
    async fn test_delete_post_batch_empty_is_noop() {
        let pool = harness::create_platform_pool().await;
        let repo = SqliteUserContentRepo::new(pool);
        let deleted = repo.delete_post_batch(&[]).await.unwrap();
        assert_eq!(deleted.posts, 0);
        assert_eq!(deleted.dependents(), 0);
    }

    #[tokio::test]
    async fn test_purge_user_residue_only_hits_missing_users() {
        let pool = harness::create_platform_pool().await;
        let repo = SqliteUserContentRepo::new(pool.clone());
        seed_user(&pool, "alive").await;
        for table in [
            "status",
            "channelmemberhistory",
            "sidebarcategories",
            "sidebarchannels",
            "productnoticeviewstate",
        ] {
            for user in ["alive", "ghost"] {
                sqlx::query(&format!("INSERT INTO {table} (userid) VALUES (?)"))
                    .bind(user)
                    .execute(&pool)
                    .await
                    .unwrap();
            }
        }

        let deleted = repo.purge_user_residue().await.unwrap();
        assert_eq!(deleted.total(), 5);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM status")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);

        // Idempotent: a second pass finds nothing.
        let deleted = repo.purge_user_residue().await.unwrap();
        assert_eq!(deleted.total(), 0);
    }
}
