/// Sampled lock-order models
use crate::shared::models::ThreadSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keeps only lock names inside a namespace of interest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceFilter {
    prefix: Option<String>,
}

impl NamespaceFilter {
    /// Accepts every name
    pub fn any() -> Self {
        Self::default()
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn from_option(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.prefix {
            Some(prefix) => name.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Lock names and multi-lock orderings accumulated from snapshots
///
/// Orderings are stored innermost first, exactly as the snapshots list them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSet {
    names: BTreeSet<String>,
    orderings: BTreeSet<Vec<String>>,
    ticks: u64,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one thread's held list into the set
    pub fn record_snapshot(&mut self, snapshot: &ThreadSnapshot, filter: &NamespaceFilter) {
        if snapshot.is_idle() {
            return;
        }
        let mut reduced: Vec<String> = Vec::with_capacity(snapshot.held.len());
        for name in snapshot.held.iter().filter(|n| filter.matches(n)) {
            // Recursive acquisition shows up as consecutive repeats
            if reduced.last() == Some(name) {
                continue;
            }
            if !self.names.contains(name) {
                self.names.insert(name.clone());
            }
            reduced.push(name.clone());
        }
        if reduced.len() > 1 {
            self.orderings.insert(reduced);
        }
    }

    /// Fold one tick's worth of snapshots
    pub fn record_all(&mut self, snapshots: &[ThreadSnapshot], filter: &NamespaceFilter) {
        for snapshot in snapshots {
            self.record_snapshot(snapshot, filter);
        }
        self.ticks += 1;
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn orderings(&self) -> &BTreeSet<Vec<String>> {
        &self.orderings
    }

    /// Number of completed sampling ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.orderings.is_empty()
    }

    /// Name pairs seen held in both orders across the sampled orderings
    ///
    /// Each pair is returned once, lexicographically ordered. This is the
    /// AB-BA cross-check an operator would otherwise do by reading the report.
    pub fn conflicting_orders(&self) -> Vec<(String, String)> {
        // (outer, inner): `inner` was acquired while `outer` was held
        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
        for ordering in &self.orderings {
            for (i, inner) in ordering.iter().enumerate() {
                for outer in &ordering[i + 1..] {
                    if outer != inner {
                        seen.insert((outer.as_str(), inner.as_str()));
                    }
                }
            }
        }

        seen.iter()
            .filter(|(a, b)| a < b && seen.contains(&(*b, *a)))
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_consecutive_repeats() {
        let mut set = SampleSet::new();
        set.record_snapshot(
            &ThreadSnapshot::new("t", ["a", "a", "b", "b", "a"]),
            &NamespaceFilter::any(),
        );
        let expected: Vec<String> = vec!["a".into(), "b".into(), "a".into()];
        assert!(set.orderings().contains(&expected));
        assert_eq!(set.names().len(), 2);
    }

    #[test]
    fn test_single_lock_is_name_only() {
        let mut set = SampleSet::new();
        set.record_snapshot(&ThreadSnapshot::new("t", ["a", "a"]), &NamespaceFilter::any());
        assert!(set.orderings().is_empty());
        assert!(set.names().contains("a"));
    }

    #[test]
    fn test_filter_applies_before_collapse() {
        let mut set = SampleSet::new();
        set.record_snapshot(
            &ThreadSnapshot::new("t", ["app.a", "other", "app.a", "app.b"]),
            &NamespaceFilter::prefix("app."),
        );
        let expected: Vec<String> = vec!["app.a".into(), "app.b".into()];
        assert_eq!(set.orderings().iter().collect::<Vec<_>>(), vec![&expected]);
        assert!(!set.names().contains("other"));
    }

    #[test]
    fn test_idle_threads_still_count_ticks() {
        let mut set = SampleSet::new();
        let idle: [&str; 0] = [];
        set.record_all(&[ThreadSnapshot::new("idle", idle)], &NamespaceFilter::any());
        assert!(ThreadSnapshot::new("idle", idle).is_idle());
        assert!(set.names().is_empty());
        assert!(set.orderings().is_empty());
        assert_eq!(set.ticks(), 1);
    }

    #[test]
    fn test_conflicting_orders() {
        let mut set = SampleSet::new();
        let any = NamespaceFilter::any();
        set.record_all(
            &[
                ThreadSnapshot::new("t1", ["b", "a"]),
                ThreadSnapshot::new("t2", ["a", "b"]),
                ThreadSnapshot::new("t3", ["c", "a"]),
            ],
            &any,
        );
        assert_eq!(set.conflicting_orders(), vec![("a".to_string(), "b".to_string())]);
        assert_eq!(set.ticks(), 1);
    }
}
