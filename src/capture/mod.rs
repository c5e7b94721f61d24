//! Log capture engine.
//!
//! # Data Flow
//! ```text
//! Instrumented code emits:
//!     → pipeline (tracing layer) or direct sink call
//!     → collector.rs (armed? format, stamp key, timestamp via clock.rs)
//!     → buffered entry.rs::LogEntry
//!
//! Query:
//!     → coordinator.rs (windowed or correlated protocol)
//!     → drain collectors, filter, sort by timestamp
//!     → Vec<LogEntry>
//! ```
//!
//! # Design Decisions
//! - One collector per category, created lazily, never removed
//! - Each collector is its own unit of mutual exclusion
//! - Entries are immutable once buffered

pub mod clock;
pub mod collector;
pub mod coordinator;
pub mod entry;
pub mod error;

pub use collector::Collector;
pub use coordinator::CaptureCoordinator;
pub use entry::{count_in_category, ErrorInfo, EventId, LogEntry, LogLevel, LogState};
pub use error::CaptureError;
