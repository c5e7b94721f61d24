//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem with the capture layer installed
//! - Configure log level from config and environment
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - The level filter applies to console output only; the capture layer sees
//!   every event so windows are not silently narrowed by the console level

use tracing::Subscriber;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::pipeline::CaptureLayer;

/// Error installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Console filter: `RUST_LOG` when set, otherwise the configured level.
fn console_filter(config: &LoggingConfig) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))
}

/// Registry with a filtered console layer and an unfiltered capture layer.
pub fn build_subscriber(
    config: &LoggingConfig,
    capture: CaptureLayer,
) -> Result<impl Subscriber + Send + Sync + 'static, ParseError> {
    let filter = console_filter(config)?;
    let console: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_filter(filter).boxed(),
    };

    Ok(tracing_subscriber::registry().with(console).with(capture))
}

/// Install the subscriber built by [`build_subscriber`] as the global default.
pub fn init_logging(config: &LoggingConfig, capture: CaptureLayer) -> Result<(), LoggingError> {
    build_subscriber(config, capture)?.try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureCoordinator;
    use std::sync::Arc;

    #[test]
    fn console_level_does_not_narrow_capture() {
        let coordinator = Arc::new(CaptureCoordinator::new());
        let config = LoggingConfig {
            level: "error".to_string(),
            ..LoggingConfig::default()
        };
        let subscriber = build_subscriber(&config, CaptureLayer::new(coordinator.clone())).unwrap();

        let _guard = tracing::subscriber::set_default(subscriber);
        coordinator.create_sink("db");
        coordinator.start_capture().unwrap();
        tracing::debug!(target: "db", "quiet on the console");
        let entries = coordinator.end_capture().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message(), "quiet on the console");
    }
}
