//! Error types for runeterm

use thiserror::Error;

/// Main error type for runeterm operations
#[derive(Error, Debug)]
pub enum RuneTermError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// PTY error
    #[error("PTY error: {0}")]
    Pty(String),

    /// Generic error
    #[error("Error: {0}")]
    Generic(String),
}
