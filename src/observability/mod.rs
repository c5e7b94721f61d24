//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine internals produce:
//!     → tracing events under the crate's own targets (never captured)
//!     → metrics.rs (counters)
//!
//! Host process:
//!     → logging.rs (registry + console layer + capture layer)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{build_subscriber, init_logging, LoggingError};
