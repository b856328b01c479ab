//! Captured call context (the evidence attached to an order witness)

use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::thread;

/// Where and on which thread something was first observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedContext {
    /// Thread name, or its id when unnamed
    pub thread: String,
    /// Call site as `file:line:column`
    pub location: String,
    /// Full backtrace text (only when capture is enabled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl CapturedContext {
    /// Capture at the caller's location
    #[track_caller]
    pub fn capture(with_backtrace: bool) -> Self {
        Self::at(Location::caller(), with_backtrace)
    }

    /// Capture for an explicit location
    pub fn at(location: &Location<'_>, with_backtrace: bool) -> Self {
        Self {
            thread: current_thread_label(),
            location: format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            backtrace: with_backtrace.then(|| Backtrace::force_capture().to_string()),
        }
    }
}

impl fmt::Display for CapturedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread '{}' at {}", self.thread, self.location)?;
        if let Some(bt) = &self.backtrace {
            write!(f, "\n{}", bt)?;
        }
        Ok(())
    }
}

/// Thread name if set, otherwise the debug form of its id
pub(crate) fn current_thread_label() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}
