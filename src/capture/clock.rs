//! Strictly increasing UTC timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Wall clock that never repeats or goes backwards.
///
/// Each reading is the current UTC time, bumped to one nanosecond past the
/// previous reading when the wall clock has not advanced.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_nanos: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
        let mut last = self.last_nanos.load(Ordering::Relaxed);
        loop {
            let next = wall.max(last + 1);
            match self.last_nanos.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Utc.timestamp_nanos(next),
                Err(actual) => last = actual,
            }
        }
    }
}
