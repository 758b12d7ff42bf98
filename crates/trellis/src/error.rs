//! Error types for the grid binding.

use std::fmt;

/// The main error type for binding operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A dotted-path extraction walked into a missing segment.
    ///
    /// This indicates a malformed record - a host-side contract violation
    /// that should fail the current render pass rather than be masked.
    MissingPath {
        /// The full dotted path being resolved.
        path: String,
        /// The segment that failed to resolve.
        segment: String,
    },
    /// The binding configuration is invalid (e.g. row reordering enabled
    /// without a reorder endpoint).
    Configuration(String),
    /// The grid widget failed to initialize.
    GridInit(String),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPath { path, segment } => {
                write!(f, "path `{path}` does not resolve: missing segment `{segment}`")
            }
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::GridInit(msg) => write!(f, "grid initialization failed: {msg}"),
        }
    }
}

impl std::error::Error for BindingError {}

/// A specialized Result type for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;
