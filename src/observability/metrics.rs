//! Metrics collection.
//!
//! # Metrics
//! - `log_capture_entries_total` (counter): buffered entries by category
//! - `log_capture_windows_total` (counter): window events (opened, closed, restarted)
//! - `log_capture_correlated_sessions_total` (counter): correlated collects started
//! - `log_capture_uncorrelated_collects_total` (counter): collects ending with the absent key
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exporting is the host's concern
//! - Nothing is recorded on the disarmed path

use ::metrics::counter;

pub fn record_entry_captured(category: &str) {
    counter!("log_capture_entries_total", "category" => category.to_string()).increment(1);
}

pub fn record_window(event: &'static str) {
    counter!("log_capture_windows_total", "event" => event).increment(1);
}

pub fn record_correlated_session() {
    counter!("log_capture_correlated_sessions_total").increment(1);
}

pub fn record_uncorrelated_collect() {
    counter!("log_capture_uncorrelated_collects_total").increment(1);
}
