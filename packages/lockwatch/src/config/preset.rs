//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Long-running processes: lowest overhead
    ///
    /// - Recorder: call-site witnesses only, no backtraces
    /// - Sampler: 10ms ticks
    Quiet,

    /// Development and CI: violations carry full backtraces
    ///
    /// - Recorder: backtraces on new edges, violations logged
    /// - Sampler: 2ms ticks
    Balanced,

    /// Test suites hunting ordering bugs
    ///
    /// - Recorder: backtraces, every new edge echoed, violations panic
    /// - Sampler: 1ms ticks
    /// - Guard: wider race window
    Strict,

    /// Custom: User-defined (YAML only)
    ///
    /// Starts from balanced defaults.
    Custom,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "balanced" => Ok(Self::Balanced),
            "strict" => Ok(Self::Strict),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: quiet, balanced, strict, custom",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Balanced => "balanced",
            Self::Strict => "strict",
            Self::Custom => "custom",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("quiet").unwrap(), Preset::Quiet);
        assert_eq!(Preset::from_str("STRICT").unwrap(), Preset::Strict);
        assert_eq!(Preset::from_str("balanced").unwrap(), Preset::Balanced);
        assert_eq!(Preset::from_str("custom").unwrap(), Preset::Custom);
        assert!(Preset::from_str("paranoid").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Quiet.to_string(), "quiet");
        assert_eq!(Preset::Strict.to_string(), "strict");
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default(), Preset::Balanced);
    }
}
