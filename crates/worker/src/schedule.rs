use std::future::Future;
use std::time::{Duration, Instant};

use crate::cycle::CycleReport;

/// Decides when the next cycle is due. The interval counts from the end of the previous
/// cycle; the first check after start-up is always due.
#[derive(Debug, Clone)]
pub struct CycleSchedule {
    interval: Duration,
    last_completed: Option<Instant>,
}

impl CycleSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_completed: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_completed {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn mark_completed(&mut self, at: Instant) {
        self.last_completed = Some(at);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoopTiming {
    /// How often the loop wakes up to check the schedule.
    pub poll: Duration,
    /// Pause after a cycle fails before polling resumes.
    pub error_backoff: Duration,
}

/// Polls `schedule` and runs `run_cycle` whenever it is due, until `shutdown` resolves.
///
/// Each cycle runs in its own task so a panic is contained and reported rather than
/// tearing the process down. Returns the number of cycles that completed.
pub async fn run_loop<F, Fut, S>(
    mut schedule: CycleSchedule,
    timing: LoopTiming,
    mut run_cycle: F,
    shutdown: S,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CycleReport> + Send + 'static,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut completed = 0usize;

    loop {
        let mut pause = timing.poll;

        if schedule.is_due(Instant::now()) {
            match tokio::spawn(run_cycle()).await {
                Ok(report) => {
                    completed += 1;
                    schedule.mark_completed(Instant::now());
                    tracing::debug!(?report, completed, "cycle finished");
                }
                Err(err) => {
                    let err = anyhow::Error::new(err).context("worker cycle aborted");
                    sentry_anyhow::capture_anyhow(&err);
                    tracing::error!(
                        error = %format!("{err:#}"),
                        backoff = ?timing.error_backoff,
                        "unexpected error in worker loop; backing off"
                    );
                    // Not marked completed: the aborted cycle is retried once the backoff ends.
                    pause = timing.error_backoff;
                }
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = &mut shutdown => {
                tracing::info!(completed, "worker loop stopping");
                return completed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[test]
    fn first_check_is_due_then_waits_for_interval() {
        let start = Instant::now();
        let mut s = CycleSchedule::new(Duration::from_secs(300));
        assert!(s.is_due(start));

        s.mark_completed(start);
        assert!(!s.is_due(start + Duration::from_secs(60)));
        assert!(!s.is_due(start + Duration::from_secs(299)));
        assert!(s.is_due(start + Duration::from_secs(300)));
    }

    fn timing() -> LoopTiming {
        LoopTiming {
            poll: Duration::from_millis(5),
            error_backoff: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn panicking_cycle_does_not_stop_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Notify::new());

        let completed = {
            let calls = calls.clone();
            let done_signal = done.clone();
            run_loop(
                CycleSchedule::new(Duration::ZERO),
                timing(),
                move || {
                    let calls = calls.clone();
                    let done = done_signal.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        if n == 0 {
                            panic!("provider returned garbage");
                        }
                        if n >= 2 {
                            done.notify_one();
                        }
                        CycleReport::default()
                    }
                },
                async move { done.notified().await },
            )
            .await
        };

        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert!(completed >= 2);
    }

    #[tokio::test]
    async fn aborted_cycle_is_retried_after_backoff_not_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(Notify::new());
        let counter = calls.clone();
        let done_signal = done.clone();

        let completed = tokio::time::timeout(
            Duration::from_secs(5),
            run_loop(
                CycleSchedule::new(Duration::from_secs(3600)),
                timing(),
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    let done = done_signal.clone();
                    async move {
                        if n == 0 {
                            panic!("store driver bug");
                        }
                        done.notify_one();
                        CycleReport::default()
                    }
                },
                async move { done.notified().await },
            ),
        )
        .await
        .expect("retry should follow the error backoff");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(completed, 1);
    }

    #[tokio::test]
    async fn shutdown_stops_before_next_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let completed = run_loop(
            CycleSchedule::new(Duration::from_secs(3600)),
            timing(),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { CycleReport::default() }
            },
            tokio::time::sleep(Duration::from_millis(30)),
        )
        .await;

        assert_eq!(completed, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
