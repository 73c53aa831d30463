use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::placeholders;
use crate::db::{
    error::DbResult,
    repos::{PlaybookCascadeDeleted, PlaybookRepo, PlaybookResidueDeleted, RunCascadeDeleted},
};

pub struct SqlitePlaybookRepo {
    pool: SqlitePool,
}

impl SqlitePlaybookRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaybookRepo for SqlitePlaybookRepo {
    async fn delete_dangling_membership_rows(&self) -> DbResult<PlaybookResidueDeleted> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = PlaybookResidueDeleted::default();

        // Category items hang off categories, so the dangling category IDs
        // have to be collected before their parent rows go.
        let rows = sqlx::query(
            r#"
            SELECT id FROM ir_category
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_category.userid
            )
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;
        let category_ids: Vec<String> = rows.into_iter().map(|row| row.get("id")).collect();

        if !category_ids.is_empty() {
            let marks = placeholders(category_ids.len());

            let sql = format!("DELETE FROM ir_category_item WHERE categoryid IN ({marks})");
            let mut query = sqlx::query(&sql);
            for id in &category_ids {
                query = query.bind(id);
            }
            deleted.category_items = query.execute(&mut *tx).await?.rows_affected();

            let sql = format!("DELETE FROM ir_category WHERE id IN ({marks})");
            let mut query = sqlx::query(&sql);
            for id in &category_ids {
                query = query.bind(id);
            }
            deleted.categories = query.execute(&mut *tx).await?.rows_affected();
        }

        deleted.auto_follows = sqlx::query(
            r#"
            DELETE FROM ir_playbookautofollow
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_playbookautofollow.userid
            )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        deleted.members = sqlx::query(
            r#"
            DELETE FROM ir_playbookmember
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_playbookmember.memberid
            )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        deleted.run_participants = sqlx::query(
            r#"
            DELETE FROM ir_run_participants
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_run_participants.userid
            )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        deleted.viewed_channels = sqlx::query(
            r#"
            DELETE FROM ir_viewedchannel
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_viewedchannel.userid
            )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        deleted.user_infos = sqlx::query(
            r#"
            DELETE FROM ir_userinfo
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = ir_userinfo.id
            )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }

    async fn select_empty_run_ids(&self, limit: u32) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM ir_incident
            WHERE NOT EXISTS (
                SELECT 1 FROM ir_run_participants
                WHERE ir_run_participants.incidentid = ir_incident.id
            )
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_run_batch(&self, run_ids: &[String]) -> DbResult<RunCascadeDeleted> {
        if run_ids.is_empty() {
            return Ok(RunCascadeDeleted::default());
        }

        let marks = placeholders(run_ids.len());
        let mut tx = self.pool.begin().await?;
        let mut deleted = RunCascadeDeleted::default();

        let sql = format!("DELETE FROM ir_metric WHERE incidentid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in run_ids {
            query = query.bind(id);
        }
        deleted.metrics = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM ir_statusposts WHERE incidentid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in run_ids {
            query = query.bind(id);
        }
        deleted.status_posts = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM ir_timelineevent WHERE incidentid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in run_ids {
            query = query.bind(id);
        }
        deleted.timeline_events = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM ir_incident WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in run_ids {
            query = query.bind(id);
        }
        deleted.runs = query.execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }

    async fn select_empty_playbook_ids(&self, limit: u32) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT id FROM ir_playbook
            WHERE NOT EXISTS (
                SELECT 1 FROM ir_playbookmember
                WHERE ir_playbookmember.playbookid = ir_playbook.id
            )
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete_playbook_batch(
        &self,
        playbook_ids: &[String],
    ) -> DbResult<PlaybookCascadeDeleted> {
        if playbook_ids.is_empty() {
            return Ok(PlaybookCascadeDeleted::default());
        }

        let marks = placeholders(playbook_ids.len());
        let mut tx = self.pool.begin().await?;
        let mut deleted = PlaybookCascadeDeleted::default();

        let sql = format!("DELETE FROM ir_metricconfig WHERE playbookid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in playbook_ids {
            query = query.bind(id);
        }
        deleted.metric_configs = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM ir_playbookautofollow WHERE playbookid IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in playbook_ids {
            query = query.bind(id);
        }
        deleted.auto_follows = query.execute(&mut *tx).await?.rows_affected();

        let sql = format!("DELETE FROM ir_playbook WHERE id IN ({marks})");
        let mut query = sqlx::query(&sql);
        for id in playbook_ids {
            query = query.bind(id);
        }
        deleted.playbooks = query.execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }

    async fn delete_dangling_channel_actions(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM ir_channelaction
            WHERE NOT EXISTS (
                SELECT 1 FROM channels
                WHERE channels.id = ir_channelaction.channelid
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
