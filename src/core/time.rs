//! Clock abstraction for testable time-dependent logic

use chrono::{DateTime, Utc};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Abstraction over wall-clock time used for report timestamps and
/// rate-limit windows
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using actual system time
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
#[derive(Debug, Clone)]
#[cfg(test)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

#[cfg(test)]
impl MockClock {
    /// Create a mock clock frozen at the given instant
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Create a mock clock frozen at the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Move the clock forward
    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap()
    }
}
