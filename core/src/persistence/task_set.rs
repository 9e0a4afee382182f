//! Background persistence task set: fire-and-forget writes launched at run
//! end, independently retryable, drained with a timeout before shutdown.

use std::time::Duration;

use tokio::task::JoinSet;

use crate::persistence::PersistError;

/// Outcome of a [`PersistenceTaskSet::drain`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub completed: usize,
    pub failed: usize,
    pub timed_out: usize,
}

/// Owns a set of in-flight persistence futures. A failure in one task never
/// blocks or cancels the others.
pub struct PersistenceTaskSet {
    tasks: JoinSet<(String, Result<(), PersistError>)>,
}

impl Default for PersistenceTaskSet {
    fn default() -> Self {
        PersistenceTaskSet { tasks: JoinSet::new() }
    }
}

impl PersistenceTaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future`, tagging it with `label` for the drain report.
    pub fn spawn<F>(&mut self, label: impl Into<String>, future: F)
    where
        F: std::future::Future<Output = Result<(), PersistError>> + Send + 'static,
    {
        let label = label.into();
        self.tasks.spawn(async move { (label, future.await) });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Awaits all outstanding tasks up to `timeout`; tasks still running when
    /// the deadline passes count as `timed_out`, not `failed`.
    pub async fn drain(mut self, timeout: Duration) -> DrainReport {
        let mut report = DrainReport::default();
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                report.timed_out += self.tasks.len();
                break;
            }
            match tokio::time::timeout(remaining, self.tasks.join_next()).await {
                Ok(Some(Ok((_label, Ok(()))))) => report.completed += 1,
                Ok(Some(Ok((_label, Err(_))))) => report.failed += 1,
                Ok(Some(Err(_join_error))) => report.failed += 1,
                Ok(None) => break,
                Err(_elapsed) => {
                    report.timed_out += self.tasks.len();
                    break;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_counts_completed_and_failed() {
        let mut set = PersistenceTaskSet::new();
        set.spawn("ok", async { Ok(()) });
        set.spawn("fail", async { Err(PersistError::NotFound(uuid::Uuid::nil())) });
        let report = set.drain(Duration::from_secs(1)).await;
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.timed_out, 0);
    }

    #[tokio::test]
    async fn drain_times_out_slow_tasks() {
        let mut set = PersistenceTaskSet::new();
        set.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        });
        let report = set.drain(Duration::from_millis(50)).await;
        assert_eq!(report.timed_out, 1);
        assert_eq!(report.completed, 0);
    }

    #[tokio::test]
    async fn empty_task_set_drains_immediately() {
        let set = PersistenceTaskSet::new();
        let report = set.drain(Duration::from_millis(10)).await;
        assert_eq!(report, DrainReport::default());
    }
}
