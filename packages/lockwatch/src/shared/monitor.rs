//! Monitor runtime
//!
//! The host facility the detectors observe: entering a classifier's monitor
//! through the runtime records it in the calling thread's held list, so that
//! any other thread can snapshot which monitors every thread currently holds.
//!
//! Each thread's held list is written only by that thread; the sampler only
//! reads it under the list's own short lock.

use crate::shared::models::context::current_thread_label;
use crate::shared::models::{LockClassifier, ThreadSnapshot};
use dashmap::DashMap;
use parking_lot::{Mutex, ReentrantMutexGuard};
use std::sync::Arc;
use std::thread::{self, ThreadId};

struct HeldMonitors {
    thread_name: String,
    /// Outermost first
    held: Vec<LockClassifier>,
}

/// Tracks monitors entered through it, per thread
#[derive(Default)]
pub struct MonitorRuntime {
    threads: DashMap<ThreadId, Arc<Mutex<HeldMonitors>>>,
}

impl MonitorRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the classifier's monitor (blocking, reentrant)
    pub fn enter<'a>(&'a self, classifier: &'a LockClassifier) -> MonitorGuard<'a> {
        let lock = classifier.lock();
        let thread_id = thread::current().id();
        let held = self
            .threads
            .entry(thread_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(HeldMonitors {
                    thread_name: current_thread_label(),
                    held: Vec::new(),
                }))
            })
            .value()
            .clone();
        held.lock().held.push(classifier.clone());

        MonitorGuard {
            runtime: self,
            classifier,
            thread_id,
            held,
            _lock: lock,
        }
    }

    /// Whether the calling thread owns the classifier's monitor
    pub fn holds_lock(&self, classifier: &LockClassifier) -> bool {
        classifier.is_held_by_current_thread()
    }

    /// Held monitors of every thread currently holding at least one
    pub fn snapshot(&self) -> Vec<ThreadSnapshot> {
        // Clone the per-thread handles first so no map shard stays locked
        // while the individual lists are read.
        let lists: Vec<Arc<Mutex<HeldMonitors>>> =
            self.threads.iter().map(|e| e.value().clone()).collect();

        lists
            .into_iter()
            .filter_map(|list| {
                let state = list.lock();
                if state.held.is_empty() {
                    return None;
                }
                Some(ThreadSnapshot {
                    thread_name: state.thread_name.clone(),
                    held: state
                        .held
                        .iter()
                        .rev()
                        .map(|c| c.name().to_string())
                        .collect(),
                })
            })
            .collect()
    }

    /// Number of threads with a registered held list
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}

/// Releases the monitor and the held-list entry on drop
pub struct MonitorGuard<'a> {
    runtime: &'a MonitorRuntime,
    classifier: &'a LockClassifier,
    thread_id: ThreadId,
    held: Arc<Mutex<HeldMonitors>>,
    _lock: ReentrantMutexGuard<'a, ()>,
}

impl MonitorGuard<'_> {
    pub fn classifier(&self) -> &LockClassifier {
        self.classifier
    }
}

impl Drop for MonitorGuard<'_> {
    fn drop(&mut self) {
        let now_empty = {
            let mut state = self.held.lock();
            // Releases need not be strictly nested.
            if let Some(pos) = state.held.iter().rposition(|c| c == self.classifier) {
                state.held.remove(pos);
            }
            state.held.is_empty()
        };
        if now_empty {
            self.runtime
                .threads
                .remove_if(&self.thread_id, |_, list| list.lock().held.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn test_enter_tracks_nesting_innermost_first() {
        let runtime = MonitorRuntime::new();
        let a = LockClassifier::named("a");
        let b = LockClassifier::named("b");

        let _ga = runtime.enter(&a);
        let _gb = runtime.enter(&b);

        let snaps = runtime.snapshot();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].held, vec!["b".to_string(), "a".to_string()]);
        assert!(runtime.holds_lock(&a));
        assert!(runtime.holds_lock(&b));
    }

    #[test]
    fn test_release_out_of_order() {
        let runtime = MonitorRuntime::new();
        let a = LockClassifier::named("a");
        let b = LockClassifier::named("b");

        let ga = runtime.enter(&a);
        let gb = runtime.enter(&b);
        drop(ga);

        assert!(!runtime.holds_lock(&a));
        assert_eq!(runtime.snapshot()[0].held, vec!["b".to_string()]);

        drop(gb);
        assert!(runtime.snapshot().is_empty());
        assert_eq!(runtime.thread_count(), 0);
    }

    #[test]
    fn test_snapshot_sees_other_threads() {
        let runtime = Arc::new(MonitorRuntime::new());
        let lock = LockClassifier::named("shared");
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let handle = {
            let runtime = Arc::clone(&runtime);
            let lock = lock.clone();
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            thread::Builder::new()
                .name("holder".to_string())
                .spawn(move || {
                    let _g = runtime.enter(&lock);
                    entered.wait();
                    release.wait();
                })
                .unwrap()
        };

        entered.wait();
        let snaps = runtime.snapshot();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].thread_name, "holder");
        assert!(!runtime.holds_lock(&lock));
        release.wait();
        handle.join().unwrap();
    }
}
