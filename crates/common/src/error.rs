//! Error types shared across Pixelpick crates.
//!
//! Every fallible step in the capture and sampling paths reports a tagged
//! variant instead of silently aborting, so callers can inspect exactly
//! which stage failed.

/// Top-level error type for Pixelpick operations.
#[derive(Debug, thiserror::Error)]
pub enum PixelpickError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device matching {facing} wide-angle video capture")]
    DeviceNotFound { facing: String },

    #[error("Capture session rejected the input: {message}")]
    InputRejected { message: String },

    #[error("Capture session rejected the output: {message}")]
    OutputRejected { message: String },

    #[error("Stream connection does not support {property}")]
    ConnectionUnsupported { property: String },

    #[error("Frame decode failed: {reason}")]
    Decode { reason: String },

    #[error("Point ({x:.1}, {y:.1}) is outside the surface extent {width}x{height}")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    #[error("An observer is already registered")]
    ObserverAlreadyRegistered,

    #[error("Pipeline already started")]
    AlreadyRunning,

    #[error("Pipeline is not running")]
    NotRunning,

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PixelpickError.
pub type PixelpickResult<T> = Result<T, PixelpickError>;

impl PixelpickError {
    pub fn device_not_found(facing: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            facing: facing.into(),
        }
    }

    pub fn input_rejected(msg: impl Into<String>) -> Self {
        Self::InputRejected {
            message: msg.into(),
        }
    }

    pub fn output_rejected(msg: impl Into<String>) -> Self {
        Self::OutputRejected {
            message: msg.into(),
        }
    }

    pub fn connection_unsupported(property: impl Into<String>) -> Self {
        Self::ConnectionUnsupported {
            property: property.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
