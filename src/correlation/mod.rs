//! Correlation subsystem.
//!
//! # Data Flow
//! ```text
//! Caller starts a logical operation:
//!     → token.rs (ContextToken::new, made ambient via enter/scope)
//!     or
//!     → stack.rs (collect pushes a call-site frame for its synchronous body)
//!
//! Collector emits while recording correlation:
//!     → strategy.rs (CorrelationStrategy::current_key)
//!     → key.rs (CorrelationKey stamped on the entry)
//!
//! Collect finishes:
//!     → key returned by the work closure
//!     → entries filtered by key equality
//! ```
//!
//! # Design Decisions
//! - Context tokens are the default; call-site inference exists for parity
//!   with the legacy protocol and keeps its known failure modes
//! - Resolution failure is never an error, it yields the absent key
//! - Keys compare by identity (token UUID or call-site location)

pub mod key;
pub mod stack;
pub mod strategy;
pub mod token;

pub use key::CorrelationKey;
pub use strategy::CorrelationStrategy;
pub use token::{ContextToken, TokenGuard};
