//! Logging pipeline binding.
//!
//! # Data Flow
//! ```text
//! tracing::event!(target: "db", ...)
//!     → layer.rs (category = target, skip engine-internal targets)
//!     → coordinator.create_sink(category)
//!     → collector.is_enabled(level)? else stop
//!     → visitor.rs (message, event_id/event_name, error, state)
//!     → collector.log(...)
//! ```

pub mod layer;
mod visitor;

pub use layer::CaptureLayer;
