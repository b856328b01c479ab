/// Lock-order domain models
use crate::shared::models::{CapturedContext, ClassifierRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First-observed justification for an edge `older -> younger`
///
/// Holds only names and ids, so storing a witness never keeps a classifier alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWitness {
    /// Lock that was already held
    pub older: ClassifierRef,
    /// Lock acquired while `older` was held
    pub younger: ClassifierRef,
    pub context: CapturedContext,
}

impl fmt::Display for OrderWitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} acquired while holding {} ({})",
            self.younger, self.older, self.context
        )
    }
}

/// Unordered classifier-id pair, normalized so `(a, b)` and `(b, a)` are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnorderedPair(u64, u64);

impl UnorderedPair {
    pub fn new(a: u64, b: u64) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.0 == id || self.1 == id
    }

    pub fn ids(&self) -> (u64, u64) {
        (self.0, self.1)
    }
}

/// AB-BA ordering violation between two classifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderViolation {
    /// The edge recorded earlier, now contradicted
    pub established: OrderWitness,
    /// The acquisition that contradicts it
    pub conflicting: OrderWitness,
}

impl OrderViolation {
    pub fn pair(&self) -> UnorderedPair {
        UnorderedPair::new(self.conflicting.older.id, self.conflicting.younger.id)
    }

    /// Multi-line explanation with both witnesses
    pub fn describe(&self) -> String {
        format!(
            "Lock order violation: {young} acquired after {old}, but in the past before\n\
             \x20 now:    {now}\n\
             \x20 before: {before}",
            young = self.conflicting.younger,
            old = self.conflicting.older,
            now = self.conflicting.context,
            before = self.established.context,
        )
    }
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Cycle of two or more classifiers in the order graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCycle {
    /// Members of the strongly connected component, sorted by id
    pub members: Vec<ClassifierRef>,
}

impl OrderCycle {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn involves(&self, id: u64) -> bool {
        self.members.iter().any(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cref(id: u64, name: &str) -> ClassifierRef {
        ClassifierRef {
            id,
            name: name.to_string(),
        }
    }

    fn ctx(location: &str) -> CapturedContext {
        CapturedContext {
            thread: "main".to_string(),
            location: location.to_string(),
            backtrace: None,
        }
    }

    #[test]
    fn test_unordered_pair_normalizes() {
        assert_eq!(UnorderedPair::new(3, 9), UnorderedPair::new(9, 3));
        assert!(UnorderedPair::new(3, 9).contains(9));
        assert!(!UnorderedPair::new(3, 9).contains(4));
        assert_eq!(UnorderedPair::new(9, 3).ids(), (3, 9));
    }

    #[test]
    fn test_violation_describe_mentions_both_sites() {
        let violation = OrderViolation {
            established: OrderWitness {
                older: cref(1, "A"),
                younger: cref(2, "B"),
                context: ctx("a.rs:1:1"),
            },
            conflicting: OrderWitness {
                older: cref(2, "B"),
                younger: cref(1, "A"),
                context: ctx("b.rs:2:2"),
            },
        };

        let text = violation.describe();
        assert!(text.contains("A acquired after B"));
        assert!(text.contains("a.rs:1:1"));
        assert!(text.contains("b.rs:2:2"));
        assert_eq!(violation.pair(), UnorderedPair::new(1, 2));
    }
}
