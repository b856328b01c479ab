//! Held-lock probes

use crate::features::lock_order::ports::HeldLockProbe;
use crate::shared::models::LockClassifier;
use crate::shared::monitor::MonitorRuntime;

/// Asks the classifier's own monitor whether the calling thread owns it
#[derive(Debug, Default, Clone, Copy)]
pub struct MonitorProbe;

impl HeldLockProbe for MonitorProbe {
    fn is_held_by_current_thread(&self, classifier: &LockClassifier) -> bool {
        classifier.is_held_by_current_thread()
    }
}

impl HeldLockProbe for MonitorRuntime {
    fn is_held_by_current_thread(&self, classifier: &LockClassifier) -> bool {
        self.holds_lock(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_probe_follows_lock() {
        let probe = MonitorProbe;
        let a = LockClassifier::named("A");
        assert!(!probe.is_held_by_current_thread(&a));
        {
            let _g = a.lock();
            assert!(probe.is_held_by_current_thread(&a));
        }
        assert!(!probe.is_held_by_current_thread(&a));
    }

    #[test]
    fn test_runtime_probe_follows_enter() {
        let runtime = MonitorRuntime::new();
        let a = LockClassifier::named("A");
        let guard = runtime.enter(&a);
        assert!(HeldLockProbe::is_held_by_current_thread(&runtime, &a));
        drop(guard);
        assert!(!HeldLockProbe::is_held_by_current_thread(&runtime, &a));
    }
}
