//! Wall-clock source.

use chrono::Utc;

/// Source of the current time in whole seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Clock reading the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}
