//! Common error types for IVI

use thiserror::Error;

/// Common result type for IVI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the IVI crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog file present but not parseable
    #[error("Catalog error in {file}: {source}")]
    Catalog {
        /// Catalog file name (e.g. `library.json`)
        file: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}
