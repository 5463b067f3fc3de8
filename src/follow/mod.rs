//! Follow mode — emit a fresh code on every TOTP step boundary.
//!
//! A run goes through these phases:
//!
//! 1. **Aligning**: sleep until just past the next :00 or :30 second
//!    boundary of the offset clock, then fire once.
//! 2. **Waiting**: race a 30-second ticker against the optional runtime
//!    deadline and the stop signal.
//! 3. **Firing**: call the emitter with `now + offset`.  An emitter
//!    error ends the run and is returned unchanged.
//!
//! The deadline is measured from the start of `run`, not from the last
//! emission.  The first emission after alignment always happens unless
//! the stop signal fires while aligning.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::errors::Result;

/// Time between emissions (one TOTP step).
pub const INTERVAL: Duration = Duration::from_secs(30);

/// Added to the alignment sleep so we wake just after the boundary
/// rather than a hair before it.
pub const SETTLE_MARGIN: Duration = Duration::from_millis(10);

/// Time remaining until the next :00 or :30 second boundary.
///
/// The sub-second part of `now` is subtracted so repeated alignment
/// does not accumulate drift.
pub fn duration_to_next_interval(now: DateTime<Utc>) -> Duration {
    let s = u64::from(now.second());
    let whole = if s < 30 { 30 - s } else { 60 - s };

    // Leap-second nanos (>= 1e9) are clamped so this never underflows.
    let nanos = u64::from(now.nanosecond().min(999_999_999));
    Duration::from_secs(whole) - Duration::from_nanos(nanos)
}

/// Why a follow run ended without an emitter error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured runtime elapsed.
    Deadline,
    /// A `StopHandle` was triggered.
    Stopped,
}

/// Summary of a finished follow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowReport {
    pub emissions: usize,
    pub reason: StopReason,
}

/// Cloneable trigger that ends a follow run at its next suspension point.
#[derive(Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Request the run to stop.  Calling this more than once is harmless.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Source of the current wall-clock time.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall-clock aligned code emitter.
pub struct FollowScheduler {
    clock: Clock,
    offset: TimeDelta,
    runtime: Duration,
    interval: Duration,
    settle: Duration,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

impl FollowScheduler {
    /// Create a scheduler whose emissions are for `now + offset`.
    ///
    /// Runs forever by default; see [`FollowScheduler::runtime`].
    pub fn new(offset: TimeDelta) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            clock: Box::new(Utc::now),
            offset,
            runtime: Duration::ZERO,
            interval: INTERVAL,
            settle: SETTLE_MARGIN,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    /// Stop after `runtime` has elapsed.  Zero means no limit.
    pub fn runtime(mut self, runtime: Duration) -> Self {
        self.runtime = runtime;
        self
    }

    /// Override the time between emissions (at least one millisecond).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Read wall-clock time from `clock` instead of `Utc::now`.
    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Override the margin added to the alignment sleep.
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// A handle that can end the run from elsewhere (e.g. on Ctrl-C).
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Align to the next boundary, then call `emit` once per interval.
    ///
    /// `emit` receives the instant the code should be generated for.
    /// The first `Err` it returns ends the run and is passed back as-is.
    pub async fn run<F>(self, mut emit: F) -> Result<FollowReport>
    where
        F: FnMut(DateTime<Utc>) -> Result<()>,
    {
        let Self {
            clock: wall,
            offset,
            runtime,
            interval,
            settle,
            stop_tx: _stop_tx,
            stop_rx: mut stop,
        } = self;

        let clock = move || wall() + offset;
        let deadline = (!runtime.is_zero()).then(|| Instant::now() + runtime);
        let mut emissions = 0;

        let align = duration_to_next_interval(clock()) + settle;
        tokio::select! {
            biased;
            _ = stop_requested(&mut stop) => {
                return Ok(FollowReport { emissions, reason: StopReason::Stopped });
            }
            _ = time::sleep(align) => {}
        }

        emit(clock())?;
        emissions += 1;

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = stop_requested(&mut stop) => {
                    return Ok(FollowReport { emissions, reason: StopReason::Stopped });
                }
                _ = deadline_reached(deadline) => {
                    return Ok(FollowReport { emissions, reason: StopReason::Deadline });
                }
                _ = ticker.tick() => {
                    emit(clock())?;
                    emissions += 1;
                }
            }
        }
    }
}

async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    // The sender lives as long as the run, so an error cannot happen
    // here; treat it as a stop anyway.
    let _ = stop.wait_for(|stopped| *stopped).await;
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn first_half_minute() {
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:01-05:00")),
            Duration::from_secs(29)
        );
    }

    #[test]
    fn second_half_minute_targets_next_minute() {
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:31-05:00")),
            Duration::from_secs(29)
        );
    }

    #[test]
    fn subtracts_sub_second_part() {
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:31.001-05:00")),
            Duration::from_millis(28_999)
        );
    }

    #[test]
    fn exact_boundaries_wait_a_full_step() {
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:00Z")),
            Duration::from_secs(30)
        );
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:30Z")),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn last_instant_before_boundary() {
        assert_eq!(
            duration_to_next_interval(at("2019-06-23T20:00:59.999999999Z")),
            Duration::from_nanos(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_run_skips_all_emissions() {
        let scheduler = FollowScheduler::new(TimeDelta::zero());
        scheduler.stop_handle().stop();

        let mut calls = 0;
        let report = scheduler
            .run(|_| {
                calls += 1;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(calls, 0);
        assert_eq!(report.reason, StopReason::Stopped);
    }
}
