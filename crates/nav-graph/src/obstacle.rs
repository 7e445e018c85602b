//! Region and point obstacle placement with undo.
//!
//! # Ownership of obstacles
//!
//! Each obstructed node is recorded by at most one undo entry: the region
//! batch or point that obstructed it.  A batch only lists nodes that were
//! *not* obstacles when it was applied, so undoing it never clears an
//! obstacle placed by someone else.  Clearing a node directly with
//! [`ObstacleManager::remove_obstacle`] also drops it from whichever entry
//! owned it.
//!
//! # Background regions
//!
//! [`ObstacleManager::add_area_obstacles`] returns immediately with a
//! [`RegionTask`].  A worker thread scans a graph snapshot (in parallel),
//! then applies the batch and pushes it onto the undo stack in one step
//! under the graph's write lock.  Cancelling before that step leaves the
//! graph and the stack untouched; there is no partially recorded batch.
//!
//! Lock order is always graph, then history.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use thiserror::Error;

use nav_core::{BoundingBox, NodeId, RegionId};

use crate::{GraphError, SharedGraph};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ObstacleError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to spawn region worker: {0}")]
    Spawn(std::io::Error),

    #[error("region worker panicked")]
    TaskPanicked,
}

pub type ObstacleResult<T> = Result<T, ObstacleError>;

// ── RegionBatch ───────────────────────────────────────────────────────────────

/// One applied region: the nodes it obstructed, as a single undo unit.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionBatch {
    pub id:    RegionId,
    pub bbox:  BoundingBox,
    pub nodes: Vec<NodeId>,
}

#[derive(Default)]
struct History {
    regions:     Vec<RegionBatch>,
    points:      Vec<NodeId>,
    next_region: u32,
}

impl History {
    fn disown(&mut self, node: NodeId) {
        for batch in &mut self.regions {
            batch.nodes.retain(|&n| n != node);
        }
        self.points.retain(|&n| n != node);
    }
}

// ── RegionTask ────────────────────────────────────────────────────────────────

/// Handle to a region obstacle batch being computed in the background.
///
/// Dropping the handle detaches the worker; the batch still lands.
pub struct RegionTask {
    handle: JoinHandle<Option<RegionBatch>>,
    cancel: Arc<AtomicBool>,
}

impl RegionTask {
    /// Ask the worker not to apply its batch.  Has no effect once the batch
    /// has been applied.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker finishes.  `Ok(None)` means it was cancelled
    /// and nothing was applied.
    pub fn wait(self) -> ObstacleResult<Option<RegionBatch>> {
        self.handle.join().map_err(|_| ObstacleError::TaskPanicked)
    }
}

// ── ObstacleManager ───────────────────────────────────────────────────────────

/// Obstacle editing front-end with region and point undo stacks.
#[derive(Clone)]
pub struct ObstacleManager {
    graph:   SharedGraph,
    history: Arc<Mutex<History>>,
}

impl ObstacleManager {
    pub fn new(graph: SharedGraph) -> Self {
        Self { graph, history: Arc::new(Mutex::new(History::default())) }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Single nodes ──────────────────────────────────────────────────────

    pub fn is_obstacle(&self, node: NodeId) -> bool {
        self.graph.is_obstacle(node)
    }

    /// Obstruct one node and record it on the point undo stack.  Returns
    /// `false` (nothing recorded) if it already was an obstacle.
    pub fn add_obstacle(&self, node: NodeId) -> ObstacleResult<bool> {
        let history = &self.history;
        self.graph.update(|g| -> ObstacleResult<bool> {
            let added = g.add_obstacle(node)?;
            if added {
                history.lock().unwrap_or_else(PoisonError::into_inner).points.push(node);
            }
            Ok(added)
        })
    }

    /// Clear one obstacle, whichever entry placed it.
    pub fn remove_obstacle(&self, node: NodeId) -> ObstacleResult<bool> {
        let history = &self.history;
        self.graph.update(|g| -> ObstacleResult<bool> {
            let removed = g.remove_obstacle(node)?;
            if removed {
                history.lock().unwrap_or_else(PoisonError::into_inner).disown(node);
            }
            Ok(removed)
        })
    }

    /// Undo the most recent point obstacle still on the stack.
    pub fn remove_last_point(&self) -> ObstacleResult<Option<NodeId>> {
        let history = &self.history;
        self.graph.update(|g| -> ObstacleResult<Option<NodeId>> {
            let mut h = history.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(node) = h.points.pop() else {
                return Ok(None);
            };
            g.remove_obstacle(node)?;
            Ok(Some(node))
        })
    }

    // ── Regions ───────────────────────────────────────────────────────────

    /// Obstruct every node inside the rectangle spanned by two corners,
    /// in the background.
    pub fn add_area_obstacles(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    ) -> ObstacleResult<RegionTask> {
        let bbox = BoundingBox::from_corners(lat1, lon1, lat2, lon2);
        let cancel = Arc::new(AtomicBool::new(false));
        let manager = self.clone();
        let flag = Arc::clone(&cancel);

        let handle = std::thread::Builder::new()
            .name("region-obstacles".into())
            .spawn(move || manager.apply_region(bbox, &flag))
            .map_err(ObstacleError::Spawn)?;

        Ok(RegionTask { handle, cancel })
    }

    fn apply_region(&self, bbox: BoundingBox, cancel: &AtomicBool) -> Option<RegionBatch> {
        // Scan without holding any lock; the snapshot is dropped before the
        // write so `update` does not have to copy the graph.
        let candidates = {
            let snapshot = self.graph.snapshot();
            snapshot.nodes_in_bbox(&bbox)
        };
        if cancel.load(Ordering::Acquire) {
            log::debug!("region {bbox} cancelled before apply");
            return None;
        }

        let history = &self.history;
        self.graph.update(|g| {
            if cancel.load(Ordering::Acquire) {
                return None;
            }
            // Another writer may have obstructed some candidates meanwhile.
            let fresh: Vec<NodeId> =
                candidates.into_iter().filter(|&n| !g.is_obstacle(n)).collect();
            let nodes = match g.add_obstacles(&fresh) {
                Ok(nodes) => nodes,
                Err(e) => {
                    // Nodes are never deleted, so every candidate still exists.
                    log::warn!("region {bbox} not applied: {e}");
                    return None;
                }
            };

            let mut h = history.lock().unwrap_or_else(PoisonError::into_inner);
            let batch = RegionBatch { id: RegionId(h.next_region), bbox, nodes };
            h.next_region += 1;
            h.regions.push(batch.clone());
            log::info!("{} obstructed {} node(s) in {}", batch.id, batch.nodes.len(), bbox);
            Some(batch)
        })
    }

    /// Undo the most recent region batch, clearing exactly the nodes it
    /// obstructed.  Returns the undone batch, or `None` if the stack is
    /// empty.
    pub fn remove_last_region(&self) -> ObstacleResult<Option<RegionBatch>> {
        let history = &self.history;
        self.graph.update(|g| -> ObstacleResult<Option<RegionBatch>> {
            let mut h = history.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(batch) = h.regions.pop() else {
                return Ok(None);
            };
            let cleared = g.remove_obstacles(&batch.nodes)?;
            log::info!("{} undone, {} node(s) cleared", batch.id, cleared.len());
            Ok(Some(batch))
        })
    }

    /// Undo every recorded region and point.  Returns the number of nodes
    /// cleared.
    pub fn clear(&self) -> ObstacleResult<usize> {
        let history = &self.history;
        self.graph.update(|g| -> ObstacleResult<usize> {
            let mut h = history.lock().unwrap_or_else(PoisonError::into_inner);
            let mut nodes: Vec<NodeId> = h.points.drain(..).collect();
            for batch in h.regions.drain(..) {
                nodes.extend(batch.nodes);
            }
            Ok(g.remove_obstacles(&nodes)?.len())
        })
    }

    /// Applied region batches, oldest first.
    pub fn regions(&self) -> Vec<RegionBatch> {
        self.history().regions.clone()
    }

    pub fn region_count(&self) -> usize {
        self.history().regions.len()
    }

    /// Point obstacles on the undo stack, oldest first.
    pub fn points(&self) -> Vec<NodeId> {
        self.history().points.clone()
    }
}
