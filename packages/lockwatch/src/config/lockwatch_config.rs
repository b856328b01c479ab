//! Top-level configuration builder
//!
//! ```rust,ignore
//! use lockwatch::config::{LockwatchConfig, Preset};
//!
//! // Level 1: preset
//! let config = LockwatchConfig::preset(Preset::Balanced).build()?;
//!
//! // Level 2: override one detector
//! let config = LockwatchConfig::preset(Preset::Quiet)
//!     .sampler(|c| c.interval_ms(5).namespace("app::"))
//!     .build()?;
//!
//! // Level 3: YAML, then environment
//! let config = LockwatchConfig::from_yaml("lockwatch.yaml")?;
//! ```

use super::detector_configs::{GuardConfig, RecorderConfig, SamplerConfig};
use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::validation::ValidatableCollection;
use std::path::Path;

pub const ENV_INTERVAL_MS: &str = "LOCKWATCH_INTERVAL_MS";
pub const ENV_NAMESPACE: &str = "LOCKWATCH_NAMESPACE";
pub const ENV_STRICT: &str = "LOCKWATCH_STRICT";
pub const ENV_ECHO_WITNESSES: &str = "LOCKWATCH_ECHO_WITNESSES";

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Unvalidated configuration (builder)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockwatchConfig {
    preset: Preset,
    recorder: Option<RecorderConfig>,
    sampler: Option<SamplerConfig>,
    guard: Option<GuardConfig>,
}

impl LockwatchConfig {
    /// Level 1: start from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            recorder: None,
            sampler: None,
            guard: None,
        }
    }

    /// Level 2: adjust the recorder configuration
    pub fn recorder<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RecorderConfig) -> RecorderConfig,
    {
        let base = self
            .recorder
            .take()
            .unwrap_or_else(|| RecorderConfig::from_preset(self.preset));
        self.recorder = Some(f(base));
        self
    }

    /// Level 2: adjust the sampler configuration
    pub fn sampler<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SamplerConfig) -> SamplerConfig,
    {
        let base = self
            .sampler
            .take()
            .unwrap_or_else(|| SamplerConfig::from_preset(self.preset));
        self.sampler = Some(f(base));
        self
    }

    /// Level 2: adjust the guard configuration
    pub fn guard<F>(mut self, f: F) -> Self
    where
        F: FnOnce(GuardConfig) -> GuardConfig,
    {
        let base = self
            .guard
            .take()
            .unwrap_or_else(|| GuardConfig::from_preset(self.preset));
        self.guard = Some(f(base));
        self
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    /// Validate every override and freeze the configuration
    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        self.recorder.validate_all()?;
        self.sampler.validate_all()?;
        self.guard.validate_all()?;
        Ok(ValidatedConfig(self))
    }

    /// Level 3: load a YAML v1 file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<ValidatedConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Level 3: parse YAML v1 text
    pub fn from_yaml_str(content: &str) -> ConfigResult<ValidatedConfig> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = Preset::from_str(&export.preset)
            .map_err(|_| ConfigError::UnknownPreset(export.preset.clone()))?;

        let overrides = export.overrides.unwrap_or_default();
        let config = Self {
            preset,
            recorder: overrides.recorder,
            sampler: overrides.sampler,
            guard: overrides.guard,
        };
        config.build()
    }

    /// Export as YAML v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                recorder: self.recorder.clone(),
                sampler: self.sampler.clone(),
                guard: self.guard.clone(),
            }),
        };

        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Apply `LOCKWATCH_*` variables from the process environment
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.apply_env(|var| std::env::var(var).ok())
    }

    /// Apply `LOCKWATCH_*` variables from an arbitrary lookup
    pub fn apply_env<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_INTERVAL_MS) {
            let interval: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid_env(ENV_INTERVAL_MS, raw.as_str(), e))?;
            self = self.sampler(|c| c.interval_ms(interval));
        }
        if let Some(raw) = lookup(ENV_NAMESPACE) {
            self = self.sampler(|c| c.namespace(raw.trim()));
        }
        if let Some(raw) = lookup(ENV_STRICT) {
            let strict = parse_flag(ENV_STRICT, &raw)?;
            self = self.recorder(|c| c.strict(strict));
        }
        if let Some(raw) = lookup(ENV_ECHO_WITNESSES) {
            let echo = parse_flag(ENV_ECHO_WITNESSES, &raw)?;
            self = self.recorder(|c| c.echo_witnesses(echo));
        }
        Ok(self)
    }

    /// Human-readable one-line description
    pub fn describe(&self) -> String {
        let recorder = self
            .recorder
            .clone()
            .unwrap_or_else(|| RecorderConfig::from_preset(self.preset));
        let sampler = self
            .sampler
            .clone()
            .unwrap_or_else(|| SamplerConfig::from_preset(self.preset));
        format!(
            "preset={} strict={} backtraces={} interval={}ms namespace={}",
            self.preset,
            recorder.strict,
            recorder.capture_backtrace,
            sampler.interval_ms,
            sampler.namespace.as_deref().unwrap_or("*"),
        )
    }
}

impl Default for LockwatchConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

fn parse_flag(var: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_env(var, raw, "expected a boolean flag")),
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig(LockwatchConfig);

impl ValidatedConfig {
    pub fn preset(&self) -> Preset {
        self.0.preset
    }

    /// Effective recorder config
    pub fn recorder(&self) -> RecorderConfig {
        self.0
            .recorder
            .clone()
            .unwrap_or_else(|| RecorderConfig::from_preset(self.0.preset))
    }

    /// Effective sampler config
    pub fn sampler(&self) -> SamplerConfig {
        self.0
            .sampler
            .clone()
            .unwrap_or_else(|| SamplerConfig::from_preset(self.0.preset))
    }

    /// Effective guard config
    pub fn guard(&self) -> GuardConfig {
        self.0
            .guard
            .clone()
            .unwrap_or_else(|| GuardConfig::from_preset(self.0.preset))
    }

    pub fn describe(&self) -> String {
        self.0.describe()
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.0.to_yaml()
    }

    pub fn into_inner(self) -> LockwatchConfig {
        self.0
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        ValidatedConfig(LockwatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_preset_build_uses_preset_defaults() {
        let config = LockwatchConfig::preset(Preset::Strict).build().unwrap();
        assert!(config.recorder().strict);
        assert_eq!(config.sampler().interval_ms, 1);
        assert_eq!(config.guard().widen_window_ms, 2);
    }

    #[test]
    fn test_overrides_compose() {
        let config = LockwatchConfig::preset(Preset::Balanced)
            .sampler(|c| c.interval_ms(7))
            .sampler(|c| c.namespace("db::"))
            .build()
            .unwrap();
        let sampler = config.sampler();
        assert_eq!(sampler.interval_ms, 7);
        assert_eq!(sampler.namespace.as_deref(), Some("db::"));
    }

    #[test]
    fn test_build_rejects_invalid_override() {
        let result = LockwatchConfig::preset(Preset::Balanced)
            .guard(|c| c.widen_window_ms(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = LockwatchConfig::preset(Preset::Quiet)
            .apply_env(env(&[
                (ENV_INTERVAL_MS, "15"),
                (ENV_NAMESPACE, "app::"),
                (ENV_STRICT, "yes"),
                (ENV_ECHO_WITNESSES, "0"),
            ]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.sampler().interval_ms, 15);
        assert_eq!(config.sampler().namespace.as_deref(), Some("app::"));
        assert!(config.recorder().strict);
        assert!(!config.recorder().echo_witnesses);
    }

    #[test]
    fn test_env_invalid_values() {
        let bad_interval =
            LockwatchConfig::preset(Preset::Quiet).apply_env(env(&[(ENV_INTERVAL_MS, "fast")]));
        assert!(matches!(bad_interval, Err(ConfigError::InvalidEnv { .. })));

        let bad_flag =
            LockwatchConfig::preset(Preset::Quiet).apply_env(env(&[(ENV_STRICT, "maybe")]));
        assert!(matches!(bad_flag, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_describe() {
        let desc = LockwatchConfig::preset(Preset::Quiet).describe();
        assert!(desc.contains("preset=quiet"));
        assert!(desc.contains("interval=10ms"));
        assert!(desc.contains("namespace=*"));
    }
}
