//! Error types for the orrery crate.

use std::fmt;

/// Result type for orrery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or feeding a simulation.
///
/// Obstacles that have not finished loading are not an error: they are simply
/// absent from the collision world and skipped by every test.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The asset loader rejected a resource.
    LoadFailure {
        /// The asset (obstacle id or model path) that failed.
        asset: String,
        /// The loader's error message.
        message: String,
    },
    /// A scene definition is malformed.
    InvalidScene {
        /// Which part of the scene was being validated.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LoadFailure { asset, message } => {
                write!(f, "failed to load {asset}: {message}")
            }
            Error::InvalidScene { context, detail } => {
                write!(f, "invalid scene {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Shorthand for an [`Error::InvalidScene`].
    pub(crate) fn invalid_scene(context: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidScene {
            context,
            detail: detail.into(),
        }
    }
}
