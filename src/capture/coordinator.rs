//! Capture coordinator: collector registry and the two capture protocols.
//!
//! # Protocols
//! ```text
//! Windowed:    start_capture → (any logging, all categories) → end_capture
//!              end_capture drains and clears every buffer
//!
//! Correlated:  collect(work)
//!                → arm + record correlation
//!                → work() returns the key of "this invocation"
//!                → disarm
//!                → snapshot every buffer (not cleared), keep matching keys
//! ```
//!
//! # Design Decisions
//! - Arming follows coordinator state: armed while a window is open or a
//!   correlated session runs; recording while a correlated session runs.
//!   Concurrent `collect` calls therefore never disarm each other
//! - Collectors created while a capture is running start disarmed and miss
//!   that capture
//! - Results are sorted by timestamp; the sort is stable

use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use crate::capture::clock::MonotonicClock;
use crate::capture::collector::Collector;
use crate::capture::entry::{LogEntry, LogLevel};
use crate::capture::error::CaptureError;
use crate::config::schema::{LogCaptureConfig, NestedWindowPolicy};
use crate::correlation::{stack, ContextToken, CorrelationKey, CorrelationStrategy};
use crate::observability::metrics;

#[derive(Debug, Default)]
struct CaptureState {
    window_open: bool,
    correlated_sessions: usize,
}

impl CaptureState {
    fn armed(&self) -> bool {
        self.window_open || self.correlated_sessions > 0
    }

    fn recording(&self) -> bool {
        self.correlated_sessions > 0
    }
}

/// Owns the collectors of one logging pipeline and runs captures over them.
#[derive(Debug)]
pub struct CaptureCoordinator {
    collectors: DashMap<String, Arc<Collector>>,
    state: Mutex<CaptureState>,
    strategy: CorrelationStrategy,
    min_level: LogLevel,
    nested_window: NestedWindowPolicy,
    clock: Arc<MonotonicClock>,
}

impl CaptureCoordinator {
    /// Coordinator with default settings and no collectors.
    pub fn new() -> Self {
        Self::from_config(&LogCaptureConfig::default())
    }

    /// Coordinator using `strategy` with otherwise default settings.
    pub fn with_strategy(strategy: CorrelationStrategy) -> Self {
        let mut config = LogCaptureConfig::default();
        config.correlation.strategy = strategy;
        Self::from_config(&config)
    }

    /// Build from configuration, pre-registering the configured categories.
    pub fn from_config(config: &LogCaptureConfig) -> Self {
        let coordinator = Self {
            collectors: DashMap::new(),
            state: Mutex::new(CaptureState::default()),
            strategy: config.correlation.strategy,
            min_level: config.capture.min_level,
            nested_window: config.capture.nested_window,
            clock: Arc::new(MonotonicClock::new()),
        };
        for category in &config.capture.preregister {
            coordinator.create_sink(category);
        }
        coordinator
    }

    /// Collector for `category`, created disarmed on first request.
    pub fn create_sink(&self, category: &str) -> Arc<Collector> {
        if let Some(existing) = self.collectors.get(category) {
            return existing.clone();
        }

        let mut created = false;
        let collector = self
            .collectors
            .entry(category.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(Collector::new(
                    category,
                    self.min_level,
                    self.strategy,
                    self.clock.clone(),
                ))
            })
            .clone();

        if created {
            tracing::trace!(category, "Collector registered");
        }
        collector
    }

    /// Registered collector for `category`, if any.
    pub fn collector(&self, category: &str) -> Option<Arc<Collector>> {
        self.collectors.get(category).map(|c| c.clone())
    }

    /// Whether any collector has been registered.
    pub fn has_collectors(&self) -> bool {
        !self.collectors.is_empty()
    }

    /// Registered categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.collectors.iter().map(|c| c.key().clone()).collect();
        categories.sort();
        categories
    }

    /// Strategy used to stamp and query correlation keys.
    pub fn strategy(&self) -> CorrelationStrategy {
        self.strategy
    }

    /// Correlation key of the current context under the active strategy.
    pub fn correlation_key(&self) -> CorrelationKey {
        self.strategy.current_key()
    }

    // --- Windowed protocol ---

    /// Arm every registered collector until [`end_capture`](Self::end_capture).
    ///
    /// A second call before `end_capture` fails with
    /// [`CaptureError::WindowAlreadyOpen`] under the `reject` policy; under
    /// `restart` it discards what the open window buffered so far.
    pub fn start_capture(&self) -> Result<(), CaptureError> {
        let mut state = self.lock_state();
        if state.window_open {
            match self.nested_window {
                NestedWindowPolicy::Reject => return Err(CaptureError::WindowAlreadyOpen),
                NestedWindowPolicy::Restart => {
                    let discarded: usize = self.drain_all(true).len();
                    self.apply(&state);
                    drop(state);
                    tracing::warn!(discarded, "Capture window restarted while open");
                    metrics::record_window("restarted");
                    return Ok(());
                }
            }
        }

        state.window_open = true;
        self.apply(&state);
        drop(state);

        tracing::debug!(collectors = self.collectors.len(), "Capture window opened");
        metrics::record_window("opened");
        Ok(())
    }

    /// Close the window and return every buffered entry, oldest first.
    ///
    /// Buffers are cleared.
    pub fn end_capture(&self) -> Result<Vec<LogEntry>, CaptureError> {
        let mut state = self.lock_state();
        if !state.window_open {
            return Err(CaptureError::NoWindowOpen);
        }

        state.window_open = false;
        self.apply(&state);
        let mut entries = self.drain_all(true);
        drop(state);

        sort_chronologically(&mut entries);
        tracing::debug!(entries = entries.len(), "Capture window closed");
        metrics::record_window("closed");
        Ok(entries)
    }

    /// Run `work` inside a capture window.
    pub fn capture<R>(
        &self,
        work: impl FnOnce() -> R,
    ) -> Result<(R, Vec<LogEntry>), CaptureError> {
        self.start_capture()?;
        let result = work();
        let entries = self.end_capture()?;
        Ok((result, entries))
    }

    // --- Correlated protocol ---

    /// Run `work` and return the entries stamped with the key it returns.
    ///
    /// `work` must finish by returning [`correlation_key`](Self::correlation_key)
    /// (or the key of the token it ran under). Buffers are not cleared; use
    /// [`reset`](Self::reset) or a capture window for that.
    ///
    /// Under [`CorrelationStrategy::StackInference`] the key identifies the
    /// location this method is called from.
    #[track_caller]
    pub fn collect<F>(&self, work: F) -> Vec<LogEntry>
    where
        F: FnOnce() -> CorrelationKey,
    {
        let site = Location::caller();
        let session = self.begin_session();
        let key = {
            let _frame = stack::enter_frame(site);
            work()
        };
        drop(session);
        self.finish_collect(key)
    }

    /// Async form of [`collect`](Self::collect).
    ///
    /// Under `StackInference` the call-site frame is only visible during the
    /// first poll of the work; anything after its first suspension resolves
    /// to the absent key.
    #[track_caller]
    pub fn collect_async<'a, F, Fut>(
        &'a self,
        work: F,
    ) -> impl Future<Output = Vec<LogEntry>> + 'a
    where
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = CorrelationKey> + 'a,
    {
        let site = Location::caller();
        async move {
            let session = self.begin_session();
            let mut work = std::pin::pin!(work());
            let mut first_poll = true;
            let key = std::future::poll_fn(|cx| {
                let _frame = first_poll.then(|| stack::enter_frame(site));
                first_poll = false;
                work.as_mut().poll(cx)
            })
            .await;
            drop(session);
            self.finish_collect(key)
        }
    }

    /// [`collect`](Self::collect) under a fresh [`ContextToken`].
    #[track_caller]
    pub fn collect_scoped<F>(&self, work: F) -> Vec<LogEntry>
    where
        F: FnOnce(),
    {
        let token = ContextToken::new();
        self.collect(move || {
            token.in_scope(|| {
                work();
                self.correlation_key()
            })
        })
    }

    /// [`collect_async`](Self::collect_async) under a fresh [`ContextToken`]
    /// scoped to the work's task.
    #[track_caller]
    pub fn collect_scoped_async<'a, Fut>(
        &'a self,
        work: Fut,
    ) -> impl Future<Output = Vec<LogEntry>> + 'a
    where
        Fut: Future<Output = ()> + 'a,
    {
        let token = ContextToken::new();
        self.collect_async(move || {
            token.scope(async move {
                work.await;
                self.correlation_key()
            })
        })
    }

    /// Clear every collector's buffer.
    pub fn reset(&self) {
        let cleared = self.drain_all(true).len();
        tracing::debug!(cleared, "Collector buffers reset");
    }

    fn begin_session(&self) -> CorrelatedSession<'_> {
        let mut state = self.lock_state();
        state.correlated_sessions += 1;
        self.apply(&state);
        drop(state);
        metrics::record_correlated_session();
        CorrelatedSession { coordinator: self }
    }

    fn end_session(&self) {
        let mut state = self.lock_state();
        state.correlated_sessions = state.correlated_sessions.saturating_sub(1);
        self.apply(&state);
    }

    fn finish_collect(&self, key: CorrelationKey) -> Vec<LogEntry> {
        if !key.has_value() {
            tracing::warn!(
                strategy = ?self.strategy,
                "Correlation key unresolved; collected entries are not isolated"
            );
            metrics::record_uncorrelated_collect();
        }

        let mut entries: Vec<_> = self
            .drain_all(false)
            .into_iter()
            .filter(|entry| entry.correlation_key() == key)
            .collect();
        sort_chronologically(&mut entries);
        entries
    }

    fn apply(&self, state: &CaptureState) {
        let (armed, recording) = (state.armed(), state.recording());
        for collector in self.collectors.iter() {
            if recording {
                collector.enable_correlation_recording();
            } else {
                collector.disable_correlation_recording();
            }
            if armed {
                collector.arm();
            } else {
                collector.disarm();
            }
        }
    }

    fn drain_all(&self, clear: bool) -> Vec<LogEntry> {
        self.collectors
            .iter()
            .flat_map(|collector| collector.drain(clear))
            .collect()
    }

    fn lock_state(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CaptureCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Ends one correlated session on drop, including on unwind or cancellation.
struct CorrelatedSession<'a> {
    coordinator: &'a CaptureCoordinator,
}

impl Drop for CorrelatedSession<'_> {
    fn drop(&mut self) {
        self.coordinator.end_session();
    }
}

fn sort_chronologically(entries: &mut [LogEntry]) {
    entries.sort_by_key(|entry| entry.timestamp());
}
