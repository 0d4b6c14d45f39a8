//! Error types for the RogueDB client core.

use std::path::PathBuf;

/// Main error type for the library.
///
/// Every variant is raised synchronously by the call that violated its
/// contract. Builders are all-or-nothing: on error no partial value is produced.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Service-account material is missing, malformed, or not an RSA key.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// A scalar parameter (TTL, API key, configuration value) is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operators, fields, and operands do not line up, or a request would be
    /// destructive by omission (an empty schema subscription).
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A partial search result referenced a query position that does not exist.
    #[error("Result for query {index} but only {queries} queries were sent")]
    ResultOutOfRange {
        /// Position named by the result batch.
        index: u32,
        /// Number of queries in the originating search.
        queries: usize,
    },

    /// Reading a collaborator-supplied file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
