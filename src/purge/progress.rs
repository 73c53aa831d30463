use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::status::{StatusSink, StatusUpdate};

const PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: u64,
    pub total: u64,
}

/// Shared progress counter for one job.
///
/// Stages call `tick` once per fully processed user; the reporter task
/// turns the resulting events into throttled status updates.
pub struct ProgressTracker {
    completed: AtomicU64,
    total: u64,
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                completed: AtomicU64::new(0),
                total,
                tx,
            },
            rx,
        )
    }

    pub fn tick(&self) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        // The receiver is gone once the reporter shuts down; late ticks
        // are dropped.
        let _ = self.tx.send(ProgressEvent {
            completed,
            total: self.total,
        });
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Consume progress events and publish at most one status update per
/// second. Skipped events are superseded by later ones; the last event
/// is always flushed when the channel closes, before any terminal
/// update goes out.
pub fn spawn_reporter(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    sink: Arc<dyn StatusSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_published: Option<Instant> = None;
        let mut pending: Option<ProgressEvent> = None;

        while let Some(event) = rx.recv().await {
            let due = last_published
                .is_none_or(|at| at.elapsed() >= PUBLISH_INTERVAL);
            if due {
                sink.publish(StatusUpdate::Progress {
                    completed: event.completed,
                    total: event.total,
                })
                .await;
                last_published = Some(Instant::now());
                pending = None;
            } else {
                pending = Some(event);
            }
        }

        if let Some(event) = pending {
            sink.publish(StatusUpdate::Progress {
                completed: event.completed,
                total: event.total,
            })
            .await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purge::testing::RecordingSink;

    #[tokio::test(start_paused = true)]
    async fn test_updates_throttled_to_one_per_second() {
        let (tracker, rx) = ProgressTracker::new(5);
        let sink = Arc::new(RecordingSink::default());
        let reporter = spawn_reporter(rx, sink.clone());

        tracker.tick();
        tokio::task::yield_now().await;
        tracker.tick();
        tracker.tick();
        drop(tracker);
        reporter.await.unwrap();

        // First tick publishes immediately, the next two collapse into
        // one flush of the latest event.
        let updates = sink.updates();
        assert_eq!(
            updates,
            vec![
                StatusUpdate::Progress {
                    completed: 1,
                    total: 5
                },
                StatusUpdate::Progress {
                    completed: 3,
                    total: 5
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_updates_all_published() {
        let (tracker, rx) = ProgressTracker::new(3);
        let sink = Arc::new(RecordingSink::default());
        let reporter = spawn_reporter(rx, sink.clone());

        for _ in 0..3 {
            tracker.tick();
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        drop(tracker);
        reporter.await.unwrap();

        let updates = sink.updates();
        assert_eq!(updates.len(), 3);
        // Counts never decrease.
        let counts: Vec<u64> = updates
            .iter()
            .map(|u| match u {
                StatusUpdate::Progress { completed, .. } => *completed,
                other => panic!("unexpected update {other:?}"),
            })
            .collect();
        assert_eq!(counts, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_count_never_exceeds_total() {
        let (tracker, rx) = ProgressTracker::new(2);
        let sink = Arc::new(RecordingSink::default());
        let reporter = spawn_reporter(rx, sink.clone());

        tracker.tick();
        tracker.tick();
        assert_eq!(tracker.completed(), 2);
        drop(tracker);
        reporter.await.unwrap();

        if let Some(StatusUpdate::Progress { completed, total }) = sink.updates().last() {
            assert!(completed <= total);
        } else {
            panic!("expected a progress update");
        }
    }
}
