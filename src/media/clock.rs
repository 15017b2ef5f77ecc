//! Wall-clock driven media position
//!
//! Position is `anchor_position + elapsed * rate` while running and a fixed
//! value while stopped. All methods take `now` so callers (and tests)
//! control time.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct MediaClock {
    /// Position at `anchor`, or the frozen position when stopped
    position: f64,
    anchor: Option<Instant>,
    rate: f64,
    duration: f64,
}

impl Default for MediaClock {
    fn default() -> Self {
        Self {
            position: 0.0,
            anchor: None,
            rate: 1.0,
            duration: 0.0,
        }
    }
}

impl MediaClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Self::default()
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current position, clamped to [0, duration]
    pub fn position(&self, now: Instant) -> f64 {
        let pos = match self.anchor {
            Some(anchor) => {
                self.position + now.saturating_duration_since(anchor).as_secs_f64() * self.rate
            }
            None => self.position,
        };
        pos.clamp(0.0, self.duration)
    }

    pub fn reached_end(&self, now: Instant) -> bool {
        self.position(now) >= self.duration
    }

    pub fn start(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Freeze at the current position
    pub fn stop(&mut self, now: Instant) {
        self.position = self.position(now);
        self.anchor = None;
    }

    /// Jump to `secs` (clamped); keeps running if it was
    pub fn seek(&mut self, secs: f64, now: Instant) {
        self.position = secs.clamp(0.0, self.duration);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    /// Change speed without moving the position
    pub fn set_rate(&mut self, rate: f64, now: Instant) {
        self.position = self.position(now);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
        self.rate = rate;
    }
}
