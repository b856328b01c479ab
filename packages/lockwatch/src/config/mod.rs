//! Configuration System
//!
//! Three tiers with progressive disclosure:
//! - Level 1: Preset - simple one-liner
//! - Level 2: Detector override - partial adjustment via closures
//! - Level 3: YAML v1 file, optionally followed by `LOCKWATCH_*` environment overrides
//!
//! Every override is range-checked when the configuration is built.

pub mod detector_configs;
pub mod error;
pub mod io;
pub mod lockwatch_config;
pub mod preset;
pub mod validation;

// Re-exports
pub use detector_configs::{GuardConfig, RecorderConfig, SamplerConfig};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use lockwatch_config::{LockwatchConfig, ValidatedConfig};
pub use preset::Preset;
pub use validation::{Validatable, ValidatableCollection};
