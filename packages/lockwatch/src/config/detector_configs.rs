//! Detector-specific configuration types
//!
//! Each detector has its own configuration struct with validation.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Lock-order recorder
// ============================================================================

/// Lock-order recorder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Capture a full backtrace for every new order edge
    pub capture_backtrace: bool,

    /// Echo each new witness to the log as it is recorded
    /// (otherwise witnesses are only stored for later reporting)
    pub echo_witnesses: bool,

    /// Escalate a detected violation to a panic in the detecting thread
    pub strict: bool,

    /// Sweep dead classifiers after this many edge insertions (1..=1000000)
    pub sweep_every: usize,
}

impl RecorderConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Quiet => Self {
                capture_backtrace: false,
                echo_witnesses: false,
                strict: false,
                sweep_every: 4096,
            },
            Preset::Balanced | Preset::Custom => Self {
                capture_backtrace: true,
                echo_witnesses: false,
                strict: false,
                sweep_every: 1024,
            },
            Preset::Strict => Self {
                capture_backtrace: true,
                echo_witnesses: true,
                strict: true,
                sweep_every: 256,
            },
        }
    }

    /// Builder: Set capture_backtrace
    pub fn capture_backtrace(mut self, v: bool) -> Self {
        self.capture_backtrace = v;
        self
    }

    /// Builder: Set echo_witnesses
    pub fn echo_witnesses(mut self, v: bool) -> Self {
        self.echo_witnesses = v;
        self
    }

    /// Builder: Set strict
    pub fn strict(mut self, v: bool) -> Self {
        self.strict = v;
        self
    }

    /// Builder: Set sweep_every
    pub fn sweep_every(mut self, v: usize) -> Self {
        self.sweep_every = v;
        self
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for RecorderConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.sweep_every == 0 || self.sweep_every > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "sweep_every",
                self.sweep_every,
                1,
                1_000_000,
                "Dead classifiers must be swept eventually",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "RecorderConfig"
    }
}

// ============================================================================
// Sampling observer
// ============================================================================

/// Sampling observer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Tick interval in milliseconds (1..=60000)
    pub interval_ms: u64,

    /// Only lock names starting with this prefix are retained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SamplerConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let interval_ms = match preset {
            Preset::Quiet => 10,
            Preset::Balanced | Preset::Custom => 2,
            Preset::Strict => 1,
        };
        Self {
            interval_ms,
            namespace: None,
        }
    }

    /// Builder: Set interval_ms
    pub fn interval_ms(mut self, v: u64) -> Self {
        self.interval_ms = v;
        self
    }

    /// Builder: Set namespace
    pub fn namespace(mut self, v: impl Into<String>) -> Self {
        self.namespace = Some(v.into());
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for SamplerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.interval_ms == 0 || self.interval_ms > 60_000 {
            return Err(ConfigError::range_with_hint(
                "interval_ms",
                self.interval_ms,
                1,
                60_000,
                "The sampling tick must be a positive number of milliseconds",
            ));
        }
        if let Some(ns) = &self.namespace {
            if ns.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "namespace must not be blank; omit it to keep every lock".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SamplerConfig"
    }
}

// ============================================================================
// Concurrency guard
// ============================================================================

/// Concurrency guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// How long `check` keeps an object marked in flight (1..=1000 ms)
    pub widen_window_ms: u64,
}

impl GuardConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let widen_window_ms = match preset {
            Preset::Strict => 2,
            _ => 1,
        };
        Self { widen_window_ms }
    }

    /// Builder: Set widen_window_ms
    pub fn widen_window_ms(mut self, v: u64) -> Self {
        self.widen_window_ms = v;
        self
    }

    pub fn widen_window(&self) -> Duration {
        Duration::from_millis(self.widen_window_ms)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for GuardConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.widen_window_ms == 0 || self.widen_window_ms > 1000 {
            return Err(ConfigError::range_with_hint(
                "widen_window_ms",
                self.widen_window_ms,
                1,
                1000,
                "Without a widened window overlapping checks are rarely observed",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "GuardConfig"
    }
}
