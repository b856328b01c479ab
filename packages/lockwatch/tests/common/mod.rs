//! Common test utilities for lockwatch
//!
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use lockwatch::{HeldLockProbe, LockClassifier, LockOrderRecorder, RecorderConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

/// Probe that treats every lock as held until told otherwise
#[derive(Default)]
pub struct ScriptedProbe {
    released: Mutex<Vec<u64>>,
}

impl ScriptedProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate an external release that never popped the stack
    pub fn release(&self, classifier: &LockClassifier) {
        self.released.lock().push(classifier.id());
    }
}

impl HeldLockProbe for ScriptedProbe {
    fn is_held_by_current_thread(&self, classifier: &LockClassifier) -> bool {
        !self.released.lock().contains(&classifier.id())
    }
}

pub fn classifiers(names: &[&str]) -> Vec<LockClassifier> {
    names.iter().map(|n| LockClassifier::named(*n)).collect()
}

pub fn recorder() -> LockOrderRecorder {
    LockOrderRecorder::new(RecorderConfig::default().capture_backtrace(false))
}

/// Acquire `order` nested through the recorder, then release innermost first
pub fn acquire_nested(recorder: &LockOrderRecorder, order: &[&LockClassifier]) {
    let mut guards = Vec::with_capacity(order.len());
    for classifier in order {
        recorder.begin(classifier);
        guards.push((*classifier, classifier.lock()));
    }
    while let Some((classifier, guard)) = guards.pop() {
        drop(guard);
        recorder.release(classifier);
    }
}

/// Run `f` on a named thread and wait for it
pub fn on_thread<F, R>(name: &str, f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}
