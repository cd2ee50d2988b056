//! Error types for skycam
//!
//! One taxonomy for the whole crate. Connection errors are fatal to a
//! session; capture, capability and configuration failures are recovered
//! closer to where they happen and never surface through this type.

use thiserror::Error;

/// Main error type for skycam
#[derive(Error, Debug)]
pub enum SkycamError {
    /// Camera auto-detection yielded zero devices
    #[error("No cameras detected. Make sure the camera is connected and powered on.")]
    DeviceNotFound,

    /// Opening or initialising a camera on a known port failed
    #[error("Failed to connect to camera on port '{port}': {message}")]
    DeviceConnectionFailed { port: String, message: String },

    /// A single capture attempt failed (non-fatal to the session)
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Named template record is absent and the name is not the reserved default
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// Template record exists but could not be parsed
    #[error("Template '{name}' is invalid: {message}")]
    TemplateInvalid { name: String, message: String },

    /// Persisted configuration record is malformed
    ///
    /// Recovered by regenerating defaults; kept in the taxonomy so the
    /// recovery site can log what it recovered from.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Transport/driver level failure (get-config, set-config, probe)
    #[error("Camera transport error: {0}")]
    Transport(String),

    /// General I/O error from the stores
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SkycamError>;
