//! Error types for itinerary conversion

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while decoding a raw email
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Failed to parse the email structure
    #[error("Failed to parse email structure: {0}")]
    Structure(String),
}

/// Errors raised by a rendering backend
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing the markup or the destination file failed
    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),

    /// The backend program could not be started
    #[error("Failed to start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The backend ran but reported failure
    #[error("Renderer `{program}` exited with {status}: {stderr}")]
    Backend {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Destination path cannot be used by the backend
    #[error("Invalid destination path {path}: {details}")]
    InvalidPath { path: PathBuf, details: String },
}

/// Terminal error for a single file conversion
///
/// Every variant carries the input path so batch drivers can report which
/// file failed and move on.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode { path: PathBuf, source: DecodeError },

    #[error("Failed to render {}: {source}", path.display())]
    Render { path: PathBuf, source: RenderError },
}

impl ConvertError {
    /// Input file the error belongs to
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. } | Self::Decode { path, .. } | Self::Render { path, .. } => path,
        }
    }
}

/// Errors loading composer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
