//! Common error types for the OCL services

use thiserror::Error;

/// Common result type for OCL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the OCL services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file exists but is not valid TOML
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
