//! Snapshot-swapping handle for a graph shared between searches and editors.
//!
//! Searches call [`SharedGraph::snapshot`] and run against the returned
//! `Arc<Graph>` without holding any lock.  Obstacle edits go through an
//! [`ObstacleManager`](crate::ObstacleManager), so its undo history always
//! matches the graph.  Each edit takes the write lock for the duration of a
//! single mutation only.  If a search still holds the previous snapshot,
//! `Arc::make_mut` copies the graph first, so in-flight searches finish
//! against a stale but internally consistent graph and never observe a
//! half-updated adjacency list.

use std::sync::{Arc, PoisonError, RwLock};

use nav_core::NodeId;

use crate::Graph;

#[derive(Clone, Debug)]
pub struct SharedGraph {
    inner: Arc<RwLock<Arc<Graph>>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(graph))) }
    }

    /// The current graph version.  Cheap: one reference-count increment
    /// under a briefly held read lock.
    pub fn snapshot(&self) -> Arc<Graph> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply one mutation under the exclusive lock.
    ///
    /// Keep `f` short: it blocks other writers and new snapshots.  Drop any
    /// snapshot you hold before calling this to avoid a needless copy.
    pub(crate) fn update<T>(&self, f: impl FnOnce(&mut Graph) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut guard))
    }

    pub fn is_obstacle(&self, node: NodeId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_obstacle(node)
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}
