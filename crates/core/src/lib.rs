//! runeterm core
//!
//! Shared error and logging infrastructure for the runeterm terminal
//! emulator workspace.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::RuneTermError;

/// Core result type for runeterm operations
pub type Result<T> = std::result::Result<T, RuneTermError>;

/// Version information for runeterm
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
