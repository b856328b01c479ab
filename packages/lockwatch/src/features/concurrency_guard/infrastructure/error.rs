//! Concurrency guard errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("concurrent access detected on {type_name} at {address:#x}")]
    ConcurrentAccess {
        type_name: &'static str,
        address: usize,
    },

    #[error("detection for {type_name} was never exercised: no value was checked while it was enabled")]
    DetectionNotExercised { type_name: &'static str },
}

impl GuardError {
    pub fn is_concurrent_access(&self) -> bool {
        matches!(self, Self::ConcurrentAccess { .. })
    }
}
