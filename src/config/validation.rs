//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty or duplicate pre-registered categories
//! - Reject log filter directives the subscriber cannot parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LogCaptureConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::LogCaptureConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("capture.preregister[{index}] is empty")]
    EmptyCategory { index: usize },

    #[error("capture.preregister lists \"{0}\" more than once")]
    DuplicateCategory(String),

    #[error("logging.level \"{level}\" is not a valid filter: {reason}")]
    InvalidLogFilter { level: String, reason: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &LogCaptureConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for (index, category) in config.capture.preregister.iter().enumerate() {
        if category.trim().is_empty() {
            errors.push(ValidationError::EmptyCategory { index });
        } else if !seen.insert(category.as_str()) {
            errors.push(ValidationError::DuplicateCategory(category.clone()));
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError::InvalidLogFilter {
            level: config.logging.level.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LogCaptureConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = LogCaptureConfig::default();
        config.capture.preregister = vec!["db".into(), " ".into(), "db".into()];
        config.logging.level = "db=notalevel".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], ValidationError::EmptyCategory { index: 1 });
        assert_eq!(errors[1], ValidationError::DuplicateCategory("db".into()));
        assert!(matches!(errors[2], ValidationError::InvalidLogFilter { .. }));
    }
}
