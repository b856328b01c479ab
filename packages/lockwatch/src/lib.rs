/*
 * Lockwatch - Runtime Concurrency Diagnostics
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (LockClassifier, CapturedContext, ThreadSnapshot)
 *                  and the MonitorRuntime the detectors observe
 * - features/    : lock_order (AB-BA recorder), sampling (order observer),
 *                  concurrency_guard (overlapping access verifier)
 * - config/      : Presets, per-detector configs, YAML and env overrides
 * - application/ : Lockwatch facade
 *
 * Detectors only report: nothing here resolves a deadlock.
 */

// Crate-level lint configuration
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::len_without_is_empty)] // Size accessors on registries

pub mod application;
pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use application::Lockwatch;
pub use config::{
    ConfigError, GuardConfig, LockwatchConfig, Preset, RecorderConfig, SamplerConfig,
    ValidatedConfig,
};
pub use errors::{LockwatchError, Result};
pub use features::concurrency_guard::{ConcurrencyGuard, GuardError};
pub use features::lock_order::{
    HeldLockProbe, LockOrderRecorder, OrderCycle, OrderGraph, OrderViolation, OrderWitness,
    ViolationSink,
};
pub use features::sampling::{
    IntrospectionError, SampleSet, SamplingHandle, SamplingOrderObserver, SamplingReport,
    ThreadIntrospector,
};
pub use shared::models::{CapturedContext, ClassifierRef, LockClassifier, ThreadSnapshot};
pub use shared::monitor::{MonitorGuard, MonitorRuntime};
