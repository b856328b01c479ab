//! Error types for lockwatch
//!
//! Each concern has its own error; `LockwatchError` aggregates them.

use crate::config::ConfigError;
use crate::features::concurrency_guard::GuardError;
use crate::features::sampling::IntrospectionError;
use thiserror::Error;

/// Main error type for lockwatch operations
#[derive(Debug, Error)]
pub enum LockwatchError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Concurrency guard failure
    #[error("Guard error: {0}")]
    Guard(#[from] GuardError),

    /// Sampling worker error
    #[error("Sampling error: {0}")]
    Sampling(#[from] IntrospectionError),
}

/// Result type alias for lockwatch operations
pub type Result<T> = std::result::Result<T, LockwatchError>;
