//! Violation sinks

use crate::features::lock_order::domain::OrderViolation;
use crate::features::lock_order::ports::ViolationSink;
use parking_lot::Mutex;

/// Keeps every delivered violation in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    received: Mutex<Vec<OrderViolation>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything received so far
    pub fn drain(&self) -> Vec<OrderViolation> {
        std::mem::take(&mut *self.received.lock())
    }
}

impl ViolationSink for CollectingSink {
    fn on_violation(&self, violation: &OrderViolation) {
        self.received.lock().push(violation.clone());
    }
}

impl<F> ViolationSink for F
where
    F: Fn(&OrderViolation) + Send + Sync,
{
    fn on_violation(&self, violation: &OrderViolation) {
        self(violation)
    }
}
