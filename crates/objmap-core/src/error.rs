//! Error types for the objmap core library
//!
//! Every failure the engine can report is a variant of [`Error`]. All of them are
//! terminal for the `transform` call that raised them: the dispatcher never
//! retries and never falls back to another strategy.

use thiserror::Error;

/// Main error type for objmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed call: missing type information, wrong value shape for a strategy
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// No registry entry matches the resolved source and target types
    #[error(
        "Unable to find a suitable transformer for mapping the source type '{source_type}' to the target type '{}'",
        .target_types.join("|")
    )]
    NoSuitableTransformer {
        source_type: String,
        target_types: Vec<String>,
    },

    /// A source object was requested again while its target is still being built
    #[error(
        "Circular reference detected when trying to get the object of type '{source_type}' transformed to '{target_type}'"
    )]
    CircularReference {
        source_type: String,
        target_type: String,
    },

    /// The object cache holds neither an in-flight mark nor a committed target
    #[error("Cached target object not found for source type '{source_type}' and target type '{target_type}'")]
    NotFoundInCache {
        source_type: String,
        target_type: String,
    },

    /// Registry or builder configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The object cache detected a violation of the at-most-one-target invariant
    #[error("Object cache consistency violated: {message}")]
    CacheConsistency { message: String },

    /// Failure raised by a strategy implementation
    #[error("Strategy '{strategy}' failed: {message}")]
    Strategy {
        strategy: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::InvalidArgument`]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Configuration`] without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
