//! Per-category in-memory log sink.
//!
//! # Responsibilities
//! - Buffer entries for one category, in emission order
//! - Gate buffering (armed) and correlation stamping (record_correlation)
//! - Hand out snapshots, optionally draining the buffer
//!
//! # Design Decisions
//! - Disarmed emission returns before formatting or allocating
//! - Flags are independent atomics; emissions racing a flag flip may or may
//!   not be kept, but an emission that observed `armed` is never lost
//! - The timestamp is taken under the buffer lock so buffer order and
//!   timestamp order agree

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::capture::clock::MonotonicClock;
use crate::capture::entry::{ErrorInfo, EventId, LogEntry, LogLevel, LogState};
use crate::correlation::{CorrelationKey, CorrelationStrategy};
use crate::observability::metrics;

/// In-memory sink bound to one category.
#[derive(Debug)]
pub struct Collector {
    category: String,
    armed: AtomicBool,
    record_correlation: AtomicBool,
    min_level: LogLevel,
    strategy: CorrelationStrategy,
    clock: Arc<MonotonicClock>,
    entries: Mutex<Vec<LogEntry>>,
}

impl Collector {
    pub(crate) fn new(
        category: impl Into<String>,
        min_level: LogLevel,
        strategy: CorrelationStrategy,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self {
            category: category.into(),
            armed: AtomicBool::new(false),
            record_correlation: AtomicBool::new(false),
            min_level,
            strategy,
            clock,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// The category this collector serves.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether an entry at `level` would currently be buffered.
    ///
    /// [`LogLevel::None`] means "do not log" and is never enabled.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && self.armed.load(Ordering::Acquire) && level >= self.min_level
    }

    /// Record one log event.
    ///
    /// `formatter` builds the message from the state and error; it only runs
    /// when the collector is armed.
    pub fn log<F>(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: LogState,
        error: Option<ErrorInfo>,
        formatter: F,
    ) where
        F: FnOnce(&LogState, Option<&ErrorInfo>) -> String,
    {
        if !self.is_enabled(level) {
            return;
        }

        let message = formatter(&state, error.as_ref());
        let correlation_key = if self.record_correlation.load(Ordering::Acquire) {
            self.strategy.current_key()
        } else {
            CorrelationKey::absent()
        };

        {
            let mut entries = self.lock();
            let timestamp = self.clock.now();
            entries.push(LogEntry::new(
                message,
                level,
                event_id,
                state,
                error,
                correlation_key,
                self.category.clone(),
                timestamp,
            ));
        }

        metrics::record_entry_captured(&self.category);
    }

    /// Snapshot of the buffer in insertion order; `clear` empties it atomically.
    pub fn drain(&self, clear: bool) -> Vec<LogEntry> {
        let mut entries = self.lock();
        if clear {
            std::mem::take(&mut *entries)
        } else {
            entries.clone()
        }
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn enable_correlation_recording(&self) {
        self.record_correlation.store(true, Ordering::Release);
    }

    pub fn disable_correlation_recording(&self) {
        self.record_correlation.store(false, Ordering::Release);
    }

    pub fn records_correlation(&self) -> bool {
        self.record_correlation.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
