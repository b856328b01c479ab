//! Ports - Interface definitions for the lock-order recorder

use crate::features::lock_order::domain::OrderViolation;
use crate::shared::models::LockClassifier;

/// The host's "is this lock held by the calling thread" primitive
///
/// Used to prune stale entries left on a thread's acquisition stack by
/// releases that were not strictly nested.
pub trait HeldLockProbe: Send + Sync {
    fn is_held_by_current_thread(&self, classifier: &LockClassifier) -> bool;
}

/// Receives each violation once, after the graph lock is released
pub trait ViolationSink: Send + Sync {
    fn on_violation(&self, violation: &OrderViolation);
}
