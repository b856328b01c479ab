//! Lock-Order Detection
//!
//! Instrumented AB-BA deadlock detection:
//! - `OrderGraph`: shared classifier -> classifier order registry with witnesses
//! - `LockOrderRecorder`: per-thread acquisition stacks and the `begin` hook
//! - `HeldLockProbe` / `ViolationSink`: seams to the host runtime and reporting
//!
//! # Usage
//!
//! ```rust,ignore
//! use lockwatch::features::lock_order::LockOrderRecorder;
//! use lockwatch::{LockClassifier, RecorderConfig};
//!
//! let recorder = LockOrderRecorder::new(RecorderConfig::default());
//! let accounts = LockClassifier::named("accounts");
//! let lock = recorder.begin(&accounts);
//! let _guard = lock.lock();
//! ```

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{OrderCycle, OrderViolation, OrderWitness, UnorderedPair};
pub use infrastructure::{CollectingSink, LockOrderRecorder, MonitorProbe, OrderGraph, RecordOutcome};
pub use ports::{HeldLockProbe, ViolationSink};
