//! Capture state errors.

use thiserror::Error;

/// Misuse of the windowed capture protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// `start_capture` while a window is already open and nesting is rejected.
    #[error("a capture window is already open")]
    WindowAlreadyOpen,

    /// `end_capture` without a matching `start_capture`.
    #[error("no capture window is open")]
    NoWindowOpen,
}
