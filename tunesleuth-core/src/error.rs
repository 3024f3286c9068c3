//! Common error types for TuneSleuth

use thiserror::Error;

use crate::services::file_scanner::ScanError;

/// Common result type for TuneSleuth operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the core library
///
/// Catalog query failures never appear here; the metadata matcher turns
/// them into an empty match list.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Library root could not be scanned
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}
