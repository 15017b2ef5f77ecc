//! Redraw ticking for active playback
//!
//! A [`TickTask`] is the per-pane recurring redraw sample that runs only while
//! playing. It is a scoped handle: dropping it cancels the recurring work, and
//! the shared [`TickScheduler`] counts live tasks so the UI knows whether to
//! keep requesting repaints and tests can assert nothing leaked.
//!
//! Cadence is capped at [`TICK_RATE_HZ`]. A late sample (host throttled the
//! UI) fires once and re-anchors; there is no catch-up burst.

use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Target sample rate of the playback redraw loop
pub const TICK_RATE_HZ: f64 = 60.0;

/// App-wide source of tick tasks. Cheap to clone, clones share counters.
#[derive(Clone, Debug, Default)]
pub struct TickScheduler {
    live: Arc<AtomicUsize>,
    started: Arc<AtomicU64>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sampling interval (1/60 s)
    pub fn interval() -> Duration {
        Duration::from_secs_f64(1.0 / TICK_RATE_HZ)
    }

    /// Start a recurring task. First sample is due one interval after `now`.
    pub fn start(&self, now: Instant) -> TickTask {
        self.live.fetch_add(1, Ordering::SeqCst);
        let id = self.started.fetch_add(1, Ordering::SeqCst);
        trace!("Tick task {} started", id);
        TickTask {
            id,
            live: Arc::clone(&self.live),
            interval: Self::interval(),
            last: now,
        }
    }

    /// Tasks started and not yet dropped
    pub fn live_tasks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Live recurring redraw task. Cancelled on drop.
#[derive(Debug)]
pub struct TickTask {
    id: u64,
    live: Arc<AtomicUsize>,
    interval: Duration,
    last: Instant,
}

impl TickTask {
    /// True when a sample is due at `now`; re-anchors the cadence when it fires.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Time left until the next sample
    pub fn until_due(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last))
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        trace!("Tick task {} cancelled", self.id);
    }
}
