use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Lets a warning through at most once per interval.
#[derive(Debug)]
pub struct WarnThrottle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl WarnThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Returns `true` if a warning may be emitted now, and records it.
    pub fn permit(&self) -> bool {
        self.permit_at(Instant::now())
    }

    pub fn permit_at(&self, now: Instant) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(prev) if now.saturating_duration_since(prev) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
