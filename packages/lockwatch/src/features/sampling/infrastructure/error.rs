//! Sampling errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("failed to spawn sampling worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("thread introspection unavailable: {0}")]
    Unavailable(String),
}
