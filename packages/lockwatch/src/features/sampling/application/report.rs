//! Sampling report
//!
//! Text form for an operator or a test assertion, JSON form for tooling.

use crate::features::sampling::domain::SampleSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingReport {
    /// Distinct lock names observed
    pub names: Vec<String>,
    /// Distinct multi-lock orderings, innermost first
    pub orderings: Vec<Vec<String>>,
    /// Pairs observed held in both orders
    pub conflicts: Vec<(String, String)>,
    pub ticks: u64,
}

impl SamplingReport {
    pub fn from_samples(samples: &SampleSet) -> Self {
        Self {
            names: samples.names().iter().cloned().collect(),
            orderings: samples.orderings().iter().cloned().collect(),
            conflicts: samples.conflicting_orders(),
            ticks: samples.ticks(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Observed lock names ({}):\n", self.names.len()));
        for name in &self.names {
            out.push_str(&format!("  {}\n", name));
        }
        out.push_str(&format!(
            "Observed lock orderings ({}, innermost first):\n",
            self.orderings.len()
        ));
        for ordering in &self.orderings {
            out.push_str(&format!("  {}\n", ordering.join(", ")));
        }
        if self.has_conflicts() {
            out.push_str(&format!("Conflicting orders ({}):\n", self.conflicts.len()));
            for (a, b) in &self.conflicts {
                out.push_str(&format!("  {} <-> {}\n", a, b));
            }
        }
        out
    }
}

impl fmt::Display for SamplingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
