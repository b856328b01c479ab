//! Shared module - Common types and utilities
//!
//! Classifiers, captured contexts and thread snapshots are used by every
//! feature; the monitor runtime is the host facility the features observe.

pub mod models;
pub mod monitor;

// Re-exports for convenience
pub use models::*;
pub use monitor::{MonitorGuard, MonitorRuntime};
