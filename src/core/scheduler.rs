use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::Instrument;
use crate::core::context::OracleContext;
use crate::core::cycle::{run_cycle_tracked, CycleOutcome};
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::observability::tracing::trace_cycle;
use crate::types::ids::CycleId;
use crate::utils::helper::current_timestamp_ms;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles_started: u64,
    pub ticks_skipped: u64,
}

/// Delay before the first tick so cycles keep the phase of the last
/// recorded submission.
///
/// No record means start now. A record in the future waits a full period.
/// A record too far off to measure against `now_ms` counts as no record.
pub fn initial_delay(period: Duration, last_submitted_ms: Option<i64>, now_ms: i64) -> Duration {
    let Some(last) = last_submitted_ms else {
        return Duration::ZERO;
    };

    let Some(elapsed_ms) = now_ms.checked_sub(last) else {
        tracing::warn!(last_submitted_ms = last, "Ignoring out-of-range checkpoint");
        return Duration::ZERO;
    };

    let period_ms = period.as_millis() as i64;
    if elapsed_ms < 0 {
        return period;
    }

    Duration::from_millis((period_ms - elapsed_ms).clamp(0, period_ms) as u64)
}

/// Fixed-rate driver. A tick that lands while a cycle is still running is
/// dropped, never queued.
pub struct Scheduler {
    ctx: Arc<OracleContext>,
}

impl Scheduler {
    pub fn new(ctx: Arc<OracleContext>) -> Self {
        Scheduler { ctx }
    }

    /// Runs until `shutdown` flips to true, then waits for the in-flight
    /// cycle to wrap up.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<SchedulerStats> {
        let period = self.ctx.schedule.period();
        let last = self.ctx.checkpoint.load().await;
        let delay = initial_delay(period, last, current_timestamp_ms());
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            period_secs = period.as_secs(),
            resumed = last.is_some(),
            "Scheduling first cycle"
        );

        let mut ticker = interval_at(Instant::now() + delay, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut stats = SchedulerStats::default();
        let mut in_flight: Option<JoinHandle<CycleOutcome>> = None;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                        stats.ticks_skipped += 1;
                        metrics::TICKS_SKIPPED.inc();
                        tracing::warn!("Previous cycle still running, skipping tick");
                        continue;
                    }

                    stats.cycles_started += 1;
                    in_flight = Some(tokio::spawn(run_with_deadline(self.ctx.clone())));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            cycles = stats.cycles_started,
            skipped = stats.ticks_skipped,
            "Scheduler stopping"
        );
        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "In-flight cycle did not finish cleanly");
            }
        }

        Ok(stats)
    }

    /// Runs on its own task until `signal` resolves, then flips `shutdown`
    /// and waits for the loop to drain. A loop that ends first, by panic or
    /// otherwise, is reported as `SchedulerFailed`.
    pub async fn supervise(
        self,
        shutdown: watch::Sender<bool>,
        signal: impl Future<Output = ()>,
    ) -> Result<SchedulerStats> {
        let mut handle = tokio::spawn(self.run(shutdown.subscribe()));

        tokio::select! {
            joined = &mut handle => {
                let _ = shutdown.send(true);
                let stats = joined.map_err(|e| Error::SchedulerFailed(e.to_string()))??;
                Err(Error::SchedulerFailed(format!(
                    "stopped without a shutdown request after {} cycles",
                    stats.cycles_started
                )))
            }
            _ = signal => {
                let _ = shutdown.send(true);
                handle.await.map_err(|e| Error::SchedulerFailed(e.to_string()))?
            }
        }
    }
}

/// One cycle under the configured deadline, logged and counted.
///
/// A cycle cut off after its price update was accepted is a `PartialSuccess`.
pub async fn run_with_deadline(ctx: Arc<OracleContext>) -> CycleOutcome {
    let started_at_ms = current_timestamp_ms();
    let span = trace_cycle(&CycleId::new(), started_at_ms);
    let deadline = ctx.schedule.cycle_deadline();
    let clock = Instant::now();
    let (progress, _) = watch::channel(None);

    let cycle = run_cycle_tracked(&ctx, started_at_ms, &progress).instrument(span.clone());
    let outcome = match timeout(deadline, cycle).await {
        Ok(outcome) => outcome,
        Err(_) => CycleOutcome::cancelled(progress.borrow().clone()),
    };

    metrics::CYCLE_LATENCY.observe(clock.elapsed().as_secs_f64());
    metrics::CYCLES.with_label_values(&[outcome.label()]).inc();
    span.in_scope(|| outcome.log());
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(60);

    #[test]
    fn test_resumes_in_phase() {
        let now = 1_700_000_000_000;
        assert_eq!(
            initial_delay(PERIOD, Some(now - 45_000), now),
            Duration::from_millis(15_000)
        );
    }

    #[test]
    fn test_overdue_runs_immediately() {
        let now = 1_700_000_000_000;
        assert_eq!(initial_delay(PERIOD, Some(now - 90_000), now), Duration::ZERO);
        assert_eq!(initial_delay(PERIOD, Some(now - 60_000), now), Duration::ZERO);
    }

    #[test]
    fn test_no_checkpoint_runs_immediately() {
        assert_eq!(initial_delay(PERIOD, None, 1_700_000_000_000), Duration::ZERO);
    }

    #[test]
    fn test_future_checkpoint_waits_one_period() {
        let now = 1_700_000_000_000;
        assert_eq!(initial_delay(PERIOD, Some(now + 5_000), now), PERIOD);
    }

    #[test]
    fn test_unmeasurable_checkpoint_runs_immediately() {
        let now = 1_700_000_000_000;
        assert_eq!(initial_delay(PERIOD, Some(i64::MIN), now), Duration::ZERO);
        assert_eq!(initial_delay(PERIOD, Some(i64::MAX), -now), Duration::ZERO);
    }

    #[test]
    fn test_just_submitted_waits_full_period() {
        let now = 1_700_000_000_000;
        assert_eq!(initial_delay(PERIOD, Some(now), now), PERIOD);
    }
}
