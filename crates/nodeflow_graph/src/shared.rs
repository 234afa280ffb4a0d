// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared handle for hosts that touch a graph from several threads.
//!
//! The graph itself has no internal locking; every operation, including a
//! whole tick, runs inside one exclusive section.

use crate::evaluation::{ExecutionError, ExecutionReport};
use crate::graph::Graph;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable, thread-safe handle to a graph
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<Graph>>,
}

impl SharedGraph {
    /// Wrap a graph
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Lock the graph for exclusive access
    pub fn lock(&self) -> MutexGuard<'_, Graph> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the graph
    pub fn with<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Run one tick under the lock
    pub fn tick(&self, delta_time: f32) -> Result<ExecutionReport, ExecutionError> {
        self.inner.lock().tick(delta_time)
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeId, NodeInstance, Overrides};
    use crate::nodes::{builtin_registry, ids};
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_concurrent_mutation_is_serialized() {
        let registry = Arc::new(builtin_registry());
        let shared = SharedGraph::default();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..25 {
                        let Some(definition) = registry.get(ids::FLOAT) else {
                            return;
                        };
                        shared.with(|graph| graph.create_node(definition, Overrides::new()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let graph = shared.lock();
        assert_eq!(graph.node_count(), 100);
        // Every ID from 1 to 100 handed out exactly once
        let node_ids: HashSet<NodeId> = graph.nodes().map(NodeInstance::id).collect();
        let expected: HashSet<NodeId> = (1..=100).map(NodeId).collect();
        assert_eq!(node_ids, expected);
    }
}
