//! Ports - Interface definitions for the sampling observer

use crate::features::sampling::infrastructure::error::IntrospectionError;
use crate::shared::models::ThreadSnapshot;

/// The host's "which monitors does every live thread hold" facility
pub trait ThreadIntrospector: Send + Sync {
    /// One entry per thread holding at least one monitor, innermost first
    fn snapshot(&self) -> Result<Vec<ThreadSnapshot>, IntrospectionError>;
}

impl<F> ThreadIntrospector for F
where
    F: Fn() -> Result<Vec<ThreadSnapshot>, IntrospectionError> + Send + Sync,
{
    fn snapshot(&self) -> Result<Vec<ThreadSnapshot>, IntrospectionError> {
        self()
    }
}
