//! Status polling after the daemon is asked to change state.
//!
//! `warp-cli connect` returns before the tunnel is actually up, so the
//! applet keeps querying `status` until the daemon reports a settled state.
//! Polling is bounded by a deadline and can be cut short through a
//! [`CancelToken`]. The deadline counts the larger of the time spent in
//! `pause` and the wall-clock time since polling started, so a slow
//! `warp-cli status` eats into it as well.

use super::ConnectionStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shortest wait between two status queries, whatever the schedule says
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait schedule for one polling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Wait before the first query (zero skips it)
    pub initial: Duration,
    /// Wait between the first and second query
    pub interval: Duration,
    /// Added to the interval after every wait
    pub step: Duration,
    /// Upper bound for the interval
    pub max: Duration,
    /// Give up once this much time has been spent waiting. `None` polls
    /// until the status settles.
    pub timeout: Option<Duration>,
}

impl PollSchedule {
    /// Backoff used after connect, disconnect and refresh
    pub fn after_action(
        initial: Duration,
        step: Duration,
        max: Duration,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            initial,
            interval: initial,
            step,
            max,
            timeout,
        }
    }

    /// Fixed-interval polling at launch, while the network may still be
    /// coming up
    pub fn startup(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            initial: Duration::ZERO,
            interval,
            step: Duration::ZERO,
            max: interval,
            timeout,
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::after_action(
            Duration::from_millis(200),
            Duration::from_millis(100),
            Duration::from_secs(2),
            Some(Duration::from_secs(30)),
        )
    }
}

/// How a polling run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// A terminal status was observed
    Settled(ConnectionStatus),
    /// The deadline passed; carries the last status seen
    TimedOut {
        last: ConnectionStatus,
        waited: Duration,
    },
    /// Cancelled (quit requested); carries the last status seen
    Cancelled(ConnectionStatus),
}

/// Shared flag that stops polling loops early
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Poll `query` on `schedule` until it returns a non-transitional status.
///
/// `pause` performs the waits; the applet passes `std::thread::sleep`.
pub fn reconcile<Q, P>(
    schedule: &PollSchedule,
    cancel: &CancelToken,
    mut query: Q,
    mut pause: P,
) -> Reconciled
where
    Q: FnMut() -> ConnectionStatus,
    P: FnMut(Duration),
{
    let started = Instant::now();
    let mut waited = Duration::ZERO;
    let mut last = ConnectionStatus::Unknown;

    if !schedule.initial.is_zero() {
        pause(schedule.initial);
        waited += schedule.initial;
    }

    let mut interval = schedule.interval.max(MIN_POLL_INTERVAL);
    let mut queries = 0u32;

    loop {
        if cancel.is_cancelled() {
            debug!("Status polling cancelled after {} queries", queries);
            return Reconciled::Cancelled(last);
        }

        last = query();
        queries += 1;
        if !last.is_transitional() {
            debug!("Status settled on {} after {} queries", last, queries);
            return Reconciled::Settled(last);
        }

        if let Some(timeout) = schedule.timeout {
            let spent = waited.max(started.elapsed());
            if spent + interval > timeout {
                debug!("Status still {} after {:?}, giving up", last, spent);
                return Reconciled::TimedOut { last, waited: spent };
            }
        }

        pause(interval);
        waited += interval;
        interval = (interval + schedule.step)
            .min(schedule.max)
            .max(MIN_POLL_INTERVAL);
    }
}
