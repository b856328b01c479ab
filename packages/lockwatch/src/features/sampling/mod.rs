//! Sampling Order Observation
//!
//! Zero-instrumentation lock-order discovery: a background worker snapshots
//! every thread's held monitors and keeps the distinct multi-lock orderings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lockwatch::features::sampling::SamplingOrderObserver;
//! use lockwatch::{MonitorRuntime, SamplerConfig};
//! use std::sync::Arc;
//!
//! let runtime = Arc::new(MonitorRuntime::new());
//! let observer = SamplingOrderObserver::new(SamplerConfig::default());
//! let mut handle = observer.start_collecting(runtime.clone())?;
//! // ... exercise the application ...
//! println!("{}", handle.report());
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::SamplingReport;
pub use domain::{NamespaceFilter, SampleSet};
pub use infrastructure::{IntrospectionError, SamplingHandle, SamplingOrderObserver};
pub use ports::ThreadIntrospector;
