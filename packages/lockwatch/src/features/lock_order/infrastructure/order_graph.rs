//! OrderGraph - shared lock-order registry
//!
//! Maps each classifier to the classifiers known to have been acquired while it
//! was held, each edge carrying the witness that first established it. The
//! registry also keeps the set of unordered pairs already reported, so every
//! AB-BA pair is reported at most once per graph.
//!
//! ## Concurrency
//! One coarse `parking_lot::Mutex` protects nodes, edges and known violations.
//! It is only ever held across in-memory map operations: no logging, no
//! callbacks, no backtrace capture, nothing that can block on another lock.
//!
//! ## Memory
//! Node keys are weak. A classifier with no other live reference is removed
//! by the next sweep, together with every edge and known pair that mentions it.
//! Sweeps run every `sweep_every` edge insertions, or on demand.

use crate::features::lock_order::domain::{OrderCycle, OrderViolation, OrderWitness, UnorderedPair};
use crate::shared::models::{CapturedContext, ClassifierRef, LockClassifier, WeakClassifier};
use parking_lot::Mutex;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

const DEFAULT_SWEEP_EVERY: usize = 1024;

struct GraphNode {
    key: WeakClassifier,
    name: String,
    /// younger id -> witness of `self -> younger`
    after: FxHashMap<u64, OrderWitness>,
}

#[derive(Default)]
struct GraphState {
    nodes: FxHashMap<u64, GraphNode>,
    known_violations: FxHashSet<UnorderedPair>,
    inserts_since_sweep: usize,
}

impl GraphState {
    fn ensure_node(&mut self, classifier: &LockClassifier) {
        self.nodes
            .entry(classifier.id())
            .or_insert_with(|| GraphNode {
                key: classifier.downgrade(),
                name: classifier.name().to_string(),
                after: FxHashMap::default(),
            });
    }

    fn edge(&self, older: u64, younger: u64) -> Option<&OrderWitness> {
        self.nodes.get(&older).and_then(|n| n.after.get(&younger))
    }

    fn has_edge(&self, older: u64, younger: u64) -> bool {
        self.edge(older, younger).is_some()
    }

    fn sweep(&mut self) -> usize {
        let dead: FxHashSet<u64> = self
            .nodes
            .iter()
            .filter(|(_, node)| !node.key.is_alive())
            .map(|(id, _)| *id)
            .collect();

        if !dead.is_empty() {
            self.nodes.retain(|id, _| !dead.contains(id));
            for node in self.nodes.values_mut() {
                node.after.retain(|id, _| !dead.contains(id));
            }
            self.known_violations.retain(|pair| {
                let (a, b) = pair.ids();
                !dead.contains(&a) && !dead.contains(&b)
            });
        }
        self.inserts_since_sweep = 0;
        dead.len()
    }
}

/// Result of recording one acquisition
#[derive(Debug, Default)]
pub struct RecordOutcome {
    /// Witnesses of the edges this call inserted
    pub inserted: Vec<OrderWitness>,
    /// Violations found for the first time by this call
    pub violations: Vec<OrderViolation>,
    /// Classifiers dropped by a sweep triggered by this call
    pub swept: usize,
}

/// Shared order graph; share between recorders with `Arc`
pub struct OrderGraph {
    state: Mutex<GraphState>,
    sweep_every: usize,
}

impl OrderGraph {
    pub fn new() -> Self {
        Self::with_sweep_every(DEFAULT_SWEEP_EVERY)
    }

    pub fn with_sweep_every(sweep_every: usize) -> Self {
        Self {
            state: Mutex::new(GraphState::default()),
            sweep_every: sweep_every.max(1),
        }
    }

    /// Held classifiers that have no edge to `younger` yet
    pub fn missing_edges(
        &self,
        older: &[LockClassifier],
        younger: &LockClassifier,
    ) -> Vec<LockClassifier> {
        let state = self.state.lock();
        older
            .iter()
            .filter(|o| *o != younger && !state.has_edge(o.id(), younger.id()))
            .cloned()
            .collect()
    }

    /// Record `o -> younger` for every `o` in `older` that is not yet known
    ///
    /// Before each insertion, a reverse edge `younger -> o` makes the pair a
    /// violation, reported only if the pair is not already known.
    pub fn record(
        &self,
        older: &[LockClassifier],
        younger: &LockClassifier,
        context: &CapturedContext,
    ) -> RecordOutcome {
        let younger_ref = younger.to_ref();
        let mut outcome = RecordOutcome::default();

        let mut state = self.state.lock();
        state.ensure_node(younger);

        for o in older {
            if o == younger {
                continue;
            }
            state.ensure_node(o);
            if state.has_edge(o.id(), younger.id()) {
                continue;
            }

            let witness = OrderWitness {
                older: o.to_ref(),
                younger: younger_ref.clone(),
                context: context.clone(),
            };

            if let Some(reverse) = state.edge(younger.id(), o.id()).cloned() {
                if state
                    .known_violations
                    .insert(UnorderedPair::new(o.id(), younger.id()))
                {
                    outcome.violations.push(OrderViolation {
                        established: reverse,
                        conflicting: witness.clone(),
                    });
                }
            }

            if let Some(node) = state.nodes.get_mut(&o.id()) {
                node.after.insert(younger.id(), witness.clone());
            }
            state.inserts_since_sweep += 1;
            outcome.inserted.push(witness);
        }

        if state.inserts_since_sweep >= self.sweep_every {
            outcome.swept = state.sweep();
        }

        outcome
    }

    /// Drop dead classifiers now; returns how many were removed
    pub fn sweep(&self) -> usize {
        let removed = self.state.lock().sweep();
        if removed > 0 {
            tracing::debug!("order graph swept {} dead classifiers", removed);
        }
        removed
    }

    /// Number of classifiers in the graph
    pub fn len(&self) -> usize {
        self.state.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of order edges
    pub fn edge_count(&self) -> usize {
        self.state
            .lock()
            .nodes
            .values()
            .map(|n| n.after.len())
            .sum()
    }

    pub fn contains_edge(&self, older: &LockClassifier, younger: &LockClassifier) -> bool {
        self.state.lock().has_edge(older.id(), younger.id())
    }

    /// Witness of `older -> younger`, if recorded
    pub fn witness(&self, older: &LockClassifier, younger: &LockClassifier) -> Option<OrderWitness> {
        self.state.lock().edge(older.id(), younger.id()).cloned()
    }

    pub fn known_violation_count(&self) -> usize {
        self.state.lock().known_violations.len()
    }

    pub fn is_known_violation(&self, a: &LockClassifier, b: &LockClassifier) -> bool {
        self.state
            .lock()
            .known_violations
            .contains(&UnorderedPair::new(a.id(), b.id()))
    }

    /// Strongly connected components with two or more live classifiers
    ///
    /// Catches longer cycles (A -> B -> C -> A) that no single pair reveals.
    /// Runs on a snapshot; the graph lock is released before the SCC pass.
    pub fn cycles(&self) -> Vec<OrderCycle> {
        let (names, edges) = {
            let state = self.state.lock();
            let names: FxHashMap<u64, String> = state
                .nodes
                .iter()
                .filter(|(_, n)| n.key.is_alive())
                .map(|(id, n)| (*id, n.name.clone()))
                .collect();
            let edges: Vec<(u64, u64)> = state
                .nodes
                .iter()
                .flat_map(|(from, n)| n.after.keys().map(move |to| (*from, *to)))
                .collect();
            (names, edges)
        };

        let mut graph: DiGraph<u64, ()> = DiGraph::new();
        let mut index: FxHashMap<u64, NodeIndex> = FxHashMap::default();
        for id in names.keys() {
            index.insert(*id, graph.add_node(*id));
        }
        for (from, to) in edges {
            if let (Some(a), Some(b)) = (index.get(&from), index.get(&to)) {
                graph.add_edge(*a, *b, ());
            }
        }

        let mut cycles: Vec<OrderCycle> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<ClassifierRef> = scc
                    .into_iter()
                    .map(|ix| {
                        let id = graph[ix];
                        ClassifierRef {
                            id,
                            name: names.get(&id).cloned().unwrap_or_default(),
                        }
                    })
                    .collect();
                members.sort_by_key(|m| m.id);
                OrderCycle { members }
            })
            .collect();
        cycles.sort_by_key(|c| c.members.first().map(|m| m.id));
        cycles
    }
}

impl Default for OrderGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CapturedContext {
        CapturedContext::capture(false)
    }

    #[test]
    fn test_record_inserts_edges_once() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");

        let first = graph.record(&[a.clone()], &b, &ctx());
        assert_eq!(first.inserted.len(), 1);
        assert!(first.violations.is_empty());

        let second = graph.record(&[a.clone()], &b, &ctx());
        assert!(second.inserted.is_empty());

        assert!(graph.contains_edge(&a, &b));
        assert!(!graph.contains_edge(&b, &a));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_reverse_edge_reports_once() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");

        graph.record(&[a.clone()], &b, &ctx());
        let outcome = graph.record(&[b.clone()], &a, &ctx());
        assert_eq!(outcome.violations.len(), 1);
        let violation = &outcome.violations[0];
        assert_eq!(violation.established.older.id, a.id());
        assert_eq!(violation.conflicting.older.id, b.id());

        // Both directions are now recorded; nothing new to report.
        assert!(graph.contains_edge(&b, &a));
        assert!(graph.is_known_violation(&b, &a));
        let again = graph.record(&[b.clone()], &a, &ctx());
        assert!(again.violations.is_empty());
        assert_eq!(graph.known_violation_count(), 1);
    }

    #[test]
    fn test_missing_edges_skips_self_and_known() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");
        let c = LockClassifier::named("C");

        graph.record(&[a.clone()], &c, &ctx());
        let missing = graph.missing_edges(&[a.clone(), b.clone(), c.clone()], &c);
        assert_eq!(missing, vec![b]);
    }

    #[test]
    fn test_witness_is_first_observation() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");

        let first = CapturedContext {
            thread: "t1".to_string(),
            location: "first.rs:1:1".to_string(),
            backtrace: None,
        };
        let later = CapturedContext {
            thread: "t2".to_string(),
            location: "later.rs:2:2".to_string(),
            backtrace: None,
        };
        graph.record(&[a.clone()], &b, &first);
        graph.record(&[a.clone()], &b, &later);

        let witness = graph.witness(&a, &b).unwrap();
        assert_eq!(witness.context, first);
        assert_eq!(witness.older.name, "A");
        assert_eq!(witness.younger.name, "B");
    }

    #[test]
    fn test_sweep_drops_dead_classifiers() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let transient = LockClassifier::named("T");

        graph.record(&[a.clone()], &transient, &ctx());
        graph.record(&[transient.clone()], &a, &ctx());
        assert_eq!(graph.known_violation_count(), 1);

        drop(transient);
        assert_eq!(graph.sweep(), 1);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.known_violation_count(), 0);
    }

    #[test]
    fn test_periodic_sweep() {
        let graph = OrderGraph::with_sweep_every(2);
        let a = LockClassifier::named("A");
        {
            let dead = LockClassifier::named("dead");
            graph.record(&[a.clone()], &dead, &ctx());
        }
        let b = LockClassifier::named("B");
        let outcome = graph.record(&[a.clone()], &b, &ctx());
        assert_eq!(outcome.swept, 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_three_way_cycle() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");
        let c = LockClassifier::named("C");
        let d = LockClassifier::named("D");

        graph.record(&[a.clone()], &b, &ctx());
        graph.record(&[b.clone()], &c, &ctx());
        let outcome = graph.record(&[c.clone()], &a, &ctx());
        // No pair is reversed, so the pairwise check stays silent.
        assert!(outcome.violations.is_empty());
        graph.record(&[a.clone()], &d, &ctx());

        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
        assert!(cycles[0].involves(a.id()));
        assert!(cycles[0].involves(c.id()));
        assert!(!cycles[0].involves(d.id()));
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = OrderGraph::new();
        let a = LockClassifier::named("A");
        let b = LockClassifier::named("B");
        let c = LockClassifier::named("C");
        graph.record(&[a.clone(), b.clone()], &c, &ctx());
        graph.record(&[a.clone()], &b, &ctx());
        assert!(graph.cycles().is_empty());
    }
}
