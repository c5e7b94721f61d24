//! Shared utilities for capture integration tests.

use std::sync::Arc;

use log_capture::{CaptureCoordinator, CaptureLayer, LogEntry};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;

/// Dispatch that routes every event into `coordinator`.
pub fn capture_dispatch(coordinator: &Arc<CaptureCoordinator>) -> Dispatch {
    Dispatch::new(tracing_subscriber::registry().with(CaptureLayer::new(coordinator.clone())))
}

/// Messages of `entries`, in order.
pub fn messages(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.message()).collect()
}

/// Whether `entries` are sorted non-decreasingly by timestamp.
#[allow(dead_code)]
pub fn is_chronological(entries: &[LogEntry]) -> bool {
    entries.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp())
}
