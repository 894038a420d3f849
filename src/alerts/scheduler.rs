//! Recurring rate-check job with a runtime-adjustable interval

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::checker::AlertChecker;

/// Longest accepted interval: one week
pub const MAX_INTERVAL_MINUTES: u32 = 7 * 24 * 60;

/// The currently installed recurring job
struct Job {
    period: Duration,
    shutdown_tx: mpsc::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

/// Owns the single recurring evaluation job
///
/// Idle until [`Scheduler::start`]; afterwards every successful
/// [`Scheduler::set_interval`] swaps the job under one lock.
pub struct Scheduler {
    checker: Arc<AlertChecker>,
    job: Mutex<Option<Job>>,
}

impl Scheduler {
    pub fn new(checker: Arc<AlertChecker>) -> Self {
        Self {
            checker,
            job: Mutex::new(None),
        }
    }

    /// Install the first job
    pub fn start(&self, minutes: u32) -> Result<(), SchedulerError> {
        self.set_interval(i64::from(minutes)).map(|_| ())
    }

    /// Replace the running job with one firing every `minutes`
    ///
    /// Rejected intervals leave the current job untouched.
    pub fn set_interval(&self, minutes: i64) -> Result<u32, SchedulerError> {
        if minutes < 1 {
            return Err(SchedulerError::IntervalTooShort(minutes));
        }
        if minutes > i64::from(MAX_INTERVAL_MINUTES) {
            return Err(SchedulerError::IntervalTooLong(minutes));
        }
        let minutes = minutes as u32;

        self.replace_job(Duration::from_secs(u64::from(minutes) * 60));
        tracing::info!(minutes, "Check interval set");
        Ok(minutes)
    }

    /// Current interval in whole minutes, `None` when idle
    pub fn interval_minutes(&self) -> Option<u64> {
        self.job.lock().as_ref().map(|job| job.period.as_secs() / 60)
    }

    pub fn is_running(&self) -> bool {
        self.job.lock().is_some()
    }

    /// Cancel the job; a cycle already in progress still completes
    pub fn stop(&self) {
        if let Some(job) = self.job.lock().take() {
            let _ = job.shutdown_tx.try_send(());
            tracing::info!("Rate check job stopped");
        }
    }

    /// Swap in a new job; cancellation only prevents future firings
    pub(crate) fn replace_job(&self, period: Duration) {
        let mut current = self.job.lock();

        if let Some(old) = current.take() {
            let _ = old.shutdown_tx.try_send(());
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let handle = tokio::spawn(Self::run_job(
            Arc::clone(&self.checker),
            period,
            shutdown_rx,
        ));

        *current = Some(Job {
            period,
            shutdown_tx,
            handle,
        });
    }

    async fn run_job(
        checker: Arc<AlertChecker>,
        period: Duration,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        // First firing one full period after installation
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::debug!(?period, "Rate check job cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    checker.run_cycle().await;
                }
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.handle.abort();
        }
    }
}

/// Scheduler errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Interval must be at least 1 minute, got {0}")]
    IntervalTooShort(i64),

    #[error("Interval must be at most {max} minutes, got {0}", max = MAX_INTERVAL_MINUTES)]
    IntervalTooLong(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::checker::tests::{checker_for_source, make_checker};
    use crate::alerts::SubscriberStore;
    use crate::bot::telegram::tests::FakeTelegram;
    use crate::rates::client::tests::{spawn_slow_rate_source, SlowRateSource};
    use crate::rates::parser::tests::sample_response;
    use std::sync::atomic::Ordering;

    async fn make_scheduler() -> Scheduler {
        let fake = FakeTelegram::default();
        let checker = make_checker(
            sample_response(&[("EUR", "420.0")]),
            &fake,
            SubscriberStore::new(),
        )
        .await;
        Scheduler::new(Arc::new(checker))
    }

    #[tokio::test]
    async fn test_start_and_replace() {
        let scheduler = make_scheduler().await;
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.interval_minutes(), None);

        scheduler.start(5).unwrap();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.interval_minutes(), Some(5));

        assert_eq!(scheduler.set_interval(1).unwrap(), 1);
        assert_eq!(scheduler.interval_minutes(), Some(1));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let scheduler = make_scheduler().await;
        scheduler.start(5).unwrap();

        assert_eq!(
            scheduler.set_interval(0),
            Err(SchedulerError::IntervalTooShort(0))
        );
        assert_eq!(
            scheduler.set_interval(-3),
            Err(SchedulerError::IntervalTooShort(-3))
        );
        assert_eq!(
            scheduler.set_interval(5_000_000_000),
            Err(SchedulerError::IntervalTooLong(5_000_000_000))
        );
        assert_eq!(
            scheduler.set_interval(i64::from(MAX_INTERVAL_MINUTES) + 1),
            Err(SchedulerError::IntervalTooLong(10081))
        );
        assert!(scheduler.is_running());
        assert_eq!(scheduler.interval_minutes(), Some(5));
    }

    /// Scheduler over a rate source that takes 400ms to answer
    async fn make_slow_scheduler() -> (Scheduler, SlowRateSource) {
        let fake = FakeTelegram::default();
        let source = spawn_slow_rate_source(
            Duration::from_millis(400),
            sample_response(&[("EUR", "440.0")]),
        )
        .await;
        let checker = checker_for_source(source.url.clone(), &fake, SubscriberStore::new()).await;
        (Scheduler::new(Arc::new(checker)), source)
    }

    #[tokio::test]
    async fn test_replace_lets_in_flight_cycle_finish() {
        let (scheduler, source) = make_slow_scheduler().await;

        scheduler.replace_job(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.checker.last_observation().is_none());

        // Fetch still in flight while the job is swapped out
        scheduler.replace_job(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(600)).await;

        let observation = scheduler.checker.last_observation();
        assert_eq!(observation.map(|o| o.rate), Some(440.0));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replaced_jobs_never_overlap() {
        let (scheduler, source) = make_slow_scheduler().await;

        scheduler.replace_job(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // New job ticks while the old job's fetch is still running
        scheduler.replace_job(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(source.calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(scheduler.checker.last_observation().is_some());
    }

    #[tokio::test]
    async fn test_job_fires_and_old_job_stops() {
        let scheduler = make_scheduler().await;

        scheduler.replace_job(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(300)).await;
        let first = scheduler.checker.last_observation();
        assert!(first.is_some());

        // Long period: the short job must not fire again
        scheduler.replace_job(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let settled = scheduler.checker.last_observation();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(scheduler.checker.last_observation(), settled);
    }

    #[tokio::test]
    async fn test_stop() {
        let scheduler = make_scheduler().await;
        scheduler.start(1).unwrap();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.interval_minutes(), None);
    }
}
