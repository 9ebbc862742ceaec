// Error types for the core pipeline and its collaborators.
//
// Session-level operations (backend startup, device enumeration, the
// platform action executor) return `CoreError`. The core pipeline itself
// never returns `Result` from `process()` — see module `pipeline`.

use log::error;
use std::fmt;

/// Standard way to get a stable numeric code and a human-readable message
/// from an error type, matching the error-code surface the host is
/// expected to report.
pub trait ErrorCode {
    /// Get the numeric error code.
    fn code(&self) -> i32;

    /// Get the human-readable error message.
    fn message(&self) -> String;
}

/// Error codes reported by session-level operations.
pub struct CoreErrorCodes;

impl CoreErrorCodes {
    pub const INVALID_ARGUMENT: i32 = 2;
    pub const BACKEND_UNAVAILABLE: i32 = 3;
    pub const AUDIO_DEVICE_UNAVAILABLE: i32 = 4;
    pub const STREAM_FAILURE: i32 = 5;
}

/// Errors surfaced above the core pipeline: configuration rejection,
/// backend/device unavailability, and mid-session stream failure.
///
/// The core itself is infallible given a valid config (spec §4.10); these
/// variants are raised by the session controller and the audio backends.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Configuration rejected before a session could start (non-positive
    /// sample rate, zero frames-per-buffer, etc).
    InvalidArgument { details: String },

    /// No backend could be constructed for the requested kind.
    BackendUnavailable { details: String },

    /// No audio device was available (e.g. `enumerate_devices` returned
    /// empty, or the requested device id doesn't exist).
    AudioDeviceUnavailable { details: String },

    /// The audio stream failed or disconnected mid-session.
    StreamFailure { details: String },
}

impl ErrorCode for CoreError {
    fn code(&self) -> i32 {
        match self {
            CoreError::InvalidArgument { .. } => CoreErrorCodes::INVALID_ARGUMENT,
            CoreError::BackendUnavailable { .. } => CoreErrorCodes::BACKEND_UNAVAILABLE,
            CoreError::AudioDeviceUnavailable { .. } => CoreErrorCodes::AUDIO_DEVICE_UNAVAILABLE,
            CoreError::StreamFailure { .. } => CoreErrorCodes::STREAM_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            CoreError::InvalidArgument { details } => format!("invalid argument: {}", details),
            CoreError::BackendUnavailable { details } => {
                format!("backend unavailable: {}", details)
            }
            CoreError::AudioDeviceUnavailable { details } => {
                format!("audio device unavailable: {}", details)
            }
            CoreError::StreamFailure { details } => format!("stream failure: {}", details),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoreError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::StreamFailure {
            details: err.to_string(),
        }
    }
}

/// Log a core error with its numeric code and calling context.
pub fn log_core_error(err: &CoreError, context: &str) {
    error!(
        "error in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}
