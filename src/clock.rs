//! Time sources and the per-phase deadline.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of "now" for deadline arithmetic
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The single optional deadline of the current phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseClock {
    deadline: Option<DateTime<Utc>>,
}

impl PhaseClock {
    /// Start a fresh deadline `seconds` from `now`
    pub fn arm(&mut self, now: DateTime<Utc>, seconds: u32) -> DateTime<Utc> {
        let deadline = now + Duration::seconds(i64::from(seconds));
        self.deadline = Some(deadline);
        deadline
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Expired strictly after the deadline instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Whole seconds left, floored at zero
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| (deadline - now).num_seconds().max(0))
    }
}
