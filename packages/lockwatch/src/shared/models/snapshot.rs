//! Thread snapshot (held monitors of one thread at one instant)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub thread_name: String,
    /// Held lock names, innermost (most recently acquired) first
    pub held: Vec<String>,
}

impl ThreadSnapshot {
    pub fn new<I, S>(thread_name: impl Into<String>, held: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            thread_name: thread_name.into(),
            held: held.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.held.is_empty()
    }
}
