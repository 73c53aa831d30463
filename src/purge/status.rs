use std::sync::Arc;

use async_trait::async_trait;

use crate::services::AccountClient;

/// Outward-facing status of a purge job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Started { total: u64 },
    Progress { completed: u64, total: u64 },
    Completed { completed: u64, rows_deleted: u64 },
    Failed { reason: String, completed: u64, total: u64 },
    DryRun { emails: Vec<String> },
}

impl StatusUpdate {
    fn render(&self) -> String {
        match self {
            StatusUpdate::Started { total } => {
                format!("Purge started: {total} user account(s) queued for removal.")
            }
            StatusUpdate::Progress { completed, total } => {
                format!("Purging user accounts: {completed}/{total} removed.")
            }
            StatusUpdate::Completed {
                completed,
                rows_deleted,
            } => format!(
                "Purge finished: {completed} user account(s) and {rows_deleted} related row(s) removed."
            ),
            StatusUpdate::Failed {
                reason,
                completed,
                total,
            } => format!("Purge failed after {completed}/{total} user account(s): {reason}"),
            StatusUpdate::DryRun { emails } => {
                let mut message = format!(
                    "Dry run: {} user account(s) would be removed.",
                    emails.len()
                );
                for email in emails {
                    message.push_str("\n- ");
                    message.push_str(email);
                }
                message
            }
        }
    }
}

/// Destination for job status updates.
///
/// Publishing must not fail the job; implementations log and swallow
/// their own errors.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn publish(&self, update: StatusUpdate);
}

/// Sink that only writes to the log. Used for headless runs.
pub struct LogStatusSink;

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn publish(&self, update: StatusUpdate) {
        match &update {
            StatusUpdate::Failed { .. } => tracing::error!("{}", update.render()),
            _ => tracing::info!("{}", update.render()),
        }
    }
}

/// Sink that posts into a channel and edits the same post in place, so
/// the channel carries one rolling status message per job.
pub struct PostStatusSink {
    accounts: Arc<dyn AccountClient>,
    channel_id: String,
    post_id: tokio::sync::Mutex<Option<String>>,
}

impl PostStatusSink {
    pub fn new(accounts: Arc<dyn AccountClient>, channel_id: String) -> Self {
        Self {
            accounts,
            channel_id,
            post_id: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl StatusSink for PostStatusSink {
    async fn publish(&self, update: StatusUpdate) {
        let message = update.render();
        let mut post_id = self.post_id.lock().await;

        let result = match post_id.as_deref() {
            Some(id) => self.accounts.update_post(id, &message).await,
            None => match self.accounts.create_post(&self.channel_id, &message).await {
                Ok(id) => {
                    *post_id = Some(id);
                    Ok(())
                }
                Err(err) => Err(err),
            },
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to publish status post");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_progress_and_terminal() {
        let progress = StatusUpdate::Progress {
            completed: 3,
            total: 10,
        };
        assert_eq!(progress.render(), "Purging user accounts: 3/10 removed.");

        let failed = StatusUpdate::Failed {
            reason: "account service returned status 502 while removing u@example.test".into(),
            completed: 3,
            total: 10,
        };
        assert!(failed.render().starts_with("Purge failed after 3/10"));
    }

    #[test]
    fn test_render_dry_run_lists_emails() {
        let update = StatusUpdate::DryRun {
            emails: vec!["a@example.test".into(), "b@example.test".into()],
        };
        let rendered = update.render();
        assert!(rendered.contains("2 user account(s)"));
        assert!(rendered.contains("\n- a@example.test"));
    }
}
