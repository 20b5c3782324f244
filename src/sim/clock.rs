//! Per-round deadline tracking
//!
//! Elapsed time is measured against the round's start timestamp. Pausing
//! freezes the elapsed value; resuming rebases the start so the countdown
//! continues from where it stopped.

use serde::{Deserialize, Serialize};

/// Result of sampling the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    /// Time left in the round, within `[0, duration]`
    pub remaining_ms: f64,
    /// True only on the sample that first reached zero
    pub expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundClock {
    duration_ms: f64,
    started_at_ms: f64,
    /// Elapsed time captured at pause
    frozen_elapsed_ms: Option<f64>,
    /// Latched once the deadline has fired
    expired: bool,
}

impl RoundClock {
    pub fn start(duration_ms: u32, now_ms: f64) -> Self {
        Self {
            duration_ms: duration_ms as f64,
            started_at_ms: now_ms,
            frozen_elapsed_ms: None,
            expired: false,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_paused(&self) -> bool {
        self.frozen_elapsed_ms.is_some()
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        match self.frozen_elapsed_ms {
            Some(frozen) => frozen,
            // Timestamps from before the round started count as zero
            None => (now_ms - self.started_at_ms).max(0.0),
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.duration_ms - self.elapsed_ms(now_ms)).clamp(0.0, self.duration_ms)
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.frozen_elapsed_ms.is_none() {
            self.frozen_elapsed_ms = Some(self.elapsed_ms(now_ms));
        }
    }

    pub fn resume(&mut self, now_ms: f64) {
        if let Some(frozen) = self.frozen_elapsed_ms.take() {
            self.started_at_ms = now_ms - frozen;
        }
    }

    /// Read the remaining time and latch expiry.
    ///
    /// A paused clock never expires. `expired` is reported at most once.
    pub fn sample(&mut self, now_ms: f64) -> ClockReading {
        let remaining_ms = self.remaining_ms(now_ms);
        let expired = !self.is_paused() && !self.expired && remaining_ms <= 0.0;
        if expired {
            self.expired = true;
        }
        ClockReading {
            remaining_ms,
            expired,
        }
    }
}
