//! Error types used across the crate.

use thiserror::Error;

use crate::registry::{Base, NativeType};

/// Errors produced while building, casting, filling or indexing histograms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid construction arguments: bin counts, ranges, option
    /// combinations, keyword flags or registry entries.
    #[error("configuration error: {0}")]
    Config(String),

    /// No registered wrapper class matches a native type for the requested base.
    #[error("no conversion to {base} from {native} found")]
    NoConversion {
        /// Abstract base that was requested.
        base: Base,
        /// Native representation that could not be matched.
        native: NativeType,
    },

    /// Malformed or out-of-range index expression or coordinate.
    #[error("index error: {0}")]
    Index(String),

    /// The operation is not supported by this axis or storage variant.
    #[error("unsupported operation: {0}")]
    Capability(String),
}

impl Error {
    /// Shorthand for a configuration error.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Shorthand for an indexing error.
    pub(crate) fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    /// Shorthand for a capability error.
    pub(crate) fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;
