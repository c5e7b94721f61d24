//! In-memory log capture with correlation.
//!
//! Attach a [`CaptureLayer`] to a `tracing` subscriber, then either bracket a
//! window with [`CaptureCoordinator::start_capture`] /
//! [`CaptureCoordinator::end_capture`], or isolate the entries of one unit
//! of work with [`CaptureCoordinator::collect`] and its variants.
//!
//! ```ignore
//! use std::sync::Arc;
//! use log_capture::{CaptureCoordinator, CaptureLayer};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let coordinator = Arc::new(CaptureCoordinator::new());
//! let subscriber = tracing_subscriber::registry()
//!     .with(CaptureLayer::new(coordinator.clone()));
//! let _guard = tracing::subscriber::set_default(subscriber);
//! coordinator.create_sink("db");
//!
//! let entries = coordinator.collect_scoped(|| {
//!     tracing::info!(target: "db", "insert");
//! });
//! ```

pub mod capture;
pub mod config;
pub mod correlation;
pub mod observability;
pub mod pipeline;

pub use capture::{CaptureCoordinator, CaptureError, Collector, LogEntry, LogLevel};
pub use config::LogCaptureConfig;
pub use correlation::{ContextToken, CorrelationKey, CorrelationStrategy};
pub use pipeline::CaptureLayer;
