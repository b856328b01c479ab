//! LockOrderRecorder - instrumented AB-BA detection
//!
//! Call `begin` immediately before acquiring a lock. The recorder keeps, per
//! thread, the stack of classifiers that thread currently holds, and records
//! an order edge from every held classifier to the new one. An acquisition
//! whose reverse edge is already known is an AB-BA violation.
//!
//! ```text
//! T1: begin(A); begin(B)      -> edge A -> B
//! T2: begin(B); begin(A)      -> edge B -> A, reverse of A -> B: violation {A, B}
//! ```
//!
//! The per-thread stacks are keyed by recorder id, so independent recorders
//! (e.g. one per test) never see each other's stacks.

use crate::config::RecorderConfig;
use crate::features::lock_order::domain::{OrderViolation, OrderWitness};
use crate::features::lock_order::infrastructure::order_graph::OrderGraph;
use crate::features::lock_order::infrastructure::probe::MonitorProbe;
use crate::features::lock_order::ports::{HeldLockProbe, ViolationSink};
use crate::shared::models::{CapturedContext, LockClassifier};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

static NEXT_RECORDER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// recorder id -> classifiers held by this thread, outermost first
    static STACKS: RefCell<FxHashMap<u64, Vec<LockClassifier>>> = RefCell::new(FxHashMap::default());
}

enum StackUpdate {
    /// Already on the stack, or thread-local storage is gone
    Untracked,
    /// Pushed onto an empty stack
    First,
    /// Pushed; holds the classifiers that were below it
    Nested(Vec<LockClassifier>),
}

/// Records lock acquisition order and reports AB-BA violations
pub struct LockOrderRecorder {
    id: u64,
    graph: Arc<OrderGraph>,
    probe: Arc<dyn HeldLockProbe>,
    sink: Option<Arc<dyn ViolationSink>>,
    config: RecorderConfig,
    history: Mutex<Vec<OrderViolation>>,
}

impl LockOrderRecorder {
    /// Recorder with its own graph, probing the classifiers' monitors
    pub fn new(config: RecorderConfig) -> Self {
        let graph = Arc::new(OrderGraph::with_sweep_every(config.sweep_every));
        Self::with_graph(config, graph)
    }

    /// Recorder sharing an existing graph
    pub fn with_graph(config: RecorderConfig, graph: Arc<OrderGraph>) -> Self {
        Self {
            id: NEXT_RECORDER_ID.fetch_add(1, Ordering::Relaxed),
            graph,
            probe: Arc::new(MonitorProbe),
            sink: None,
            config,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Replace the held-lock probe
    pub fn with_probe(mut self, probe: Arc<dyn HeldLockProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Deliver each violation to `sink` as well
    pub fn with_sink(mut self, sink: Arc<dyn ViolationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Pre-acquisition hook
    ///
    /// Returns the classifier the caller should synchronize on. Never fails;
    /// violations are logged and collected, or panic in strict mode.
    #[track_caller]
    pub fn begin(&self, candidate: &LockClassifier) -> LockClassifier {
        let location = Location::caller();

        let older = match self.push(candidate) {
            StackUpdate::Untracked | StackUpdate::First => return candidate.clone(),
            StackUpdate::Nested(older) => older,
        };

        let missing = self.graph.missing_edges(&older, candidate);
        if missing.is_empty() {
            return candidate.clone();
        }

        // Backtraces are captured before the graph lock is taken.
        let context = CapturedContext::at(location, self.config.capture_backtrace);
        let outcome = self.graph.record(&missing, candidate, &context);

        if outcome.swept > 0 {
            debug!("order graph swept {} dead classifiers", outcome.swept);
        }
        if self.config.echo_witnesses {
            for witness in &outcome.inserted {
                debug!("lock order: {}", witness);
            }
        }
        self.report(outcome.violations);

        candidate.clone()
    }

    /// Pop `classifier` from this thread's stack
    ///
    /// Optional: stale entries are also pruned lazily by the next `begin`.
    pub fn release(&self, classifier: &LockClassifier) -> bool {
        STACKS
            .try_with(|stacks| {
                let mut stacks = stacks.borrow_mut();
                let Some(stack) = stacks.get_mut(&self.id) else {
                    return false;
                };
                let removed = match stack.iter().rposition(|c| c == classifier) {
                    Some(pos) => {
                        stack.remove(pos);
                        true
                    }
                    None => false,
                };
                if stack.is_empty() {
                    stacks.remove(&self.id);
                }
                removed
            })
            .unwrap_or(false)
    }

    /// This thread's stack, outermost first
    pub fn held(&self) -> Vec<LockClassifier> {
        STACKS
            .try_with(|stacks| stacks.borrow().get(&self.id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Every violation this recorder has reported, oldest first
    pub fn violations(&self) -> Vec<OrderViolation> {
        self.history.lock().clone()
    }

    /// First witness of `older -> younger`
    pub fn witness(&self, older: &LockClassifier, younger: &LockClassifier) -> Option<OrderWitness> {
        self.graph.witness(older, younger)
    }

    pub fn graph(&self) -> &Arc<OrderGraph> {
        &self.graph
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    fn push(&self, candidate: &LockClassifier) -> StackUpdate {
        let result = STACKS.try_with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            let stack = stacks.entry(self.id).or_default();

            // A stale entry for the candidate is not reentrancy: the caller
            // released it without popping and is acquiring it afresh.
            if stack.contains(candidate) && self.probe.is_held_by_current_thread(candidate) {
                return (StackUpdate::Untracked, 0);
            }

            // Drop entries whose lock is no longer held; releases need not be
            // strictly nested, so stale entries can sit anywhere in the stack.
            let before = stack.len();
            stack.retain(|held| self.probe.is_held_by_current_thread(held));
            let pruned = before - stack.len();

            let update = if stack.is_empty() {
                StackUpdate::First
            } else {
                StackUpdate::Nested(stack.clone())
            };
            stack.push(candidate.clone());
            (update, pruned)
        });

        match result {
            Ok((update, pruned)) => {
                if pruned > 0 {
                    trace!("pruned {} stale lock(s) before {}", pruned, candidate);
                }
                update
            }
            Err(_) => StackUpdate::Untracked,
        }
    }

    fn report(&self, violations: Vec<OrderViolation>) {
        if violations.is_empty() {
            return;
        }

        for violation in &violations {
            warn!("{}", violation.describe());
            if let Some(sink) = &self.sink {
                sink.on_violation(violation);
            }
        }
        self.history.lock().extend(violations.iter().cloned());

        if self.config.strict {
            panic!("{}", violations[0].describe());
        }
    }
}

impl Drop for LockOrderRecorder {
    fn drop(&mut self) {
        // Other threads' entries die with their thread-local maps.
        let _ = STACKS.try_with(|stacks| {
            stacks.borrow_mut().remove(&self.id);
        });
    }
}
