//! Correlation inference strategies.

use serde::{Deserialize, Serialize};

use crate::correlation::key::CorrelationKey;
use crate::correlation::stack;
use crate::correlation::token::ContextToken;

/// Policy producing the correlation key for the current execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrategy {
    /// Read the ambient [`ContextToken`]. Composes with threads and tasks as
    /// long as the token is propagated.
    #[default]
    ContextToken,
    /// Infer the key from the innermost `collect` call site on this thread.
    ///
    /// Only reliable for synchronous work that stays on the calling thread.
    /// Concurrent runs of the same call site resolve to the same key.
    StackInference,
}

impl CorrelationStrategy {
    /// Key for the current context, absent when none can be resolved.
    pub fn current_key(self) -> CorrelationKey {
        match self {
            CorrelationStrategy::ContextToken => ContextToken::current()
                .map(|token| token.key())
                .unwrap_or_default(),
            CorrelationStrategy::StackInference => stack::innermost()
                .map(CorrelationKey::from_call_site)
                .unwrap_or_default(),
        }
    }
}
