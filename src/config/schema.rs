//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::capture::LogLevel;
use crate::correlation::CorrelationStrategy;

/// Root configuration for the capture engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LogCaptureConfig {
    /// Collector and window settings.
    pub capture: CaptureConfig,

    /// Correlation inference settings.
    pub correlation: CorrelationConfig,

    /// Settings for the engine's own diagnostic output.
    pub logging: LoggingConfig,
}

/// What to do when a capture window is opened while one is already open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedWindowPolicy {
    /// Fail with a state error.
    #[default]
    Reject,
    /// Last call wins: discard what was buffered and keep the window open.
    Restart,
}

/// Collector and window settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Emissions below this level are ignored.
    pub min_level: LogLevel,

    /// Nested `start_capture` handling.
    pub nested_window: NestedWindowPolicy,

    /// Categories to register up front, so windows opened before their
    /// first emission still see them.
    pub preregister: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Trace,
            nested_window: NestedWindowPolicy::Reject,
            preregister: Vec::new(),
        }
    }
}

/// Correlation settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Inference strategy (context_token, stack_inference).
    pub strategy: CorrelationStrategy,
}

/// Output format for diagnostic logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "info", "log_capture=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
