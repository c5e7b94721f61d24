//! Correlation key value object.

use serde::{Serialize, Serializer};
use std::fmt;
use std::panic::Location;
use uuid::Uuid;

/// Identity wrapped by a key. Never exposed; keys are opaque to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Identity {
    Token(Uuid),
    CallSite(&'static Location<'static>),
}

/// Identifies which logical operation produced a log entry.
///
/// Two keys are equal when both are absent, or both wrap the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorrelationKey(Option<Identity>);

impl CorrelationKey {
    /// The absent key: "unit of work unknown".
    pub const fn absent() -> Self {
        Self(None)
    }

    pub(crate) fn from_token(id: Uuid) -> Self {
        Self(Some(Identity::Token(id)))
    }

    pub(crate) fn from_call_site(location: &'static Location<'static>) -> Self {
        Self(Some(Identity::CallSite(location)))
    }

    /// Whether this key identifies an operation.
    pub fn has_value(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "none"),
            Some(Identity::Token(id)) => write!(f, "token:{}", id),
            Some(Identity::CallSite(loc)) => {
                write!(f, "site:{}:{}:{}", loc.file(), loc.line(), loc.column())
            }
        }
    }
}

impl Serialize for CorrelationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn here() -> &'static Location<'static> {
        Location::caller()
    }

    #[test]
    fn absent_keys_are_equal() {
        assert_eq!(CorrelationKey::absent(), CorrelationKey::default());
        assert!(!CorrelationKey::absent().has_value());
    }

    #[test]
    fn token_keys_compare_by_identity() {
        let id = Uuid::new_v4();
        assert_eq!(CorrelationKey::from_token(id), CorrelationKey::from_token(id));
        assert_ne!(
            CorrelationKey::from_token(id),
            CorrelationKey::from_token(Uuid::new_v4())
        );
        assert_ne!(CorrelationKey::from_token(id), CorrelationKey::absent());
    }

    #[test]
    fn call_site_keys_compare_by_location() {
        let a = here();
        let b = here();
        assert_eq!(CorrelationKey::from_call_site(a), CorrelationKey::from_call_site(a));
        assert_ne!(CorrelationKey::from_call_site(a), CorrelationKey::from_call_site(b));
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(CorrelationKey::absent().to_string(), "none");
        let id = Uuid::nil();
        assert_eq!(
            CorrelationKey::from_token(id).to_string(),
            "token:00000000-0000-0000-0000-000000000000"
        );
    }
}
