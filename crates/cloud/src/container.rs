//! Point containers and the neighbor links between them.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::CloudError;
use crate::point::PointAdapter;

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity of a [`PointContainer`].
///
/// Drawn from a monotonically increasing counter at construction. Not stable
/// across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointId(u64);

impl PointId {
    fn next() -> Self {
        Self(NEXT_POINT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable address of a container inside a [`PointCloud`](crate::PointCloud).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointHandle(pub(crate) usize);

impl PointHandle {
    /// Creates a handle for arena slot `index`.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena slot addressed by this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directed edge from a container to one of its nearest neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeighborLink {
    target: PointHandle,
    distance_from_point: f64,
}

impl NeighborLink {
    /// Creates a link to `target` with no cached distance (`NaN`).
    pub fn new(target: PointHandle) -> Self {
        Self {
            target,
            distance_from_point: f64::NAN,
        }
    }

    /// The neighbor this link points to.
    pub fn target(&self) -> PointHandle {
        self.target
    }

    /// Cached distance between the owning container and the target.
    pub fn distance_from_point(&self) -> f64 {
        self.distance_from_point
    }

    pub(crate) fn retarget(&mut self, target: PointHandle, distance: f64) {
        self.target = target;
        self.distance_from_point = distance;
    }

    pub(crate) fn set_distance(&mut self, distance: f64) {
        self.distance_from_point = distance;
    }
}

/// A point wrapped with identity, position, a distance cache and its neighbor list.
///
/// The wrapped value is immutable; build a new container to change it.
#[derive(Debug, Clone)]
pub struct PointContainer<P> {
    value: P,
    id: PointId,
    index: usize,
    stored_distance: f64,
    /// Stamp of the metric state `stored_distance` was computed under.
    stored_stamp: Option<u64>,
    neighbors: Vec<NeighborLink>,
}

impl<P: PointAdapter> PointContainer<P> {
    /// Wraps `value`, assigning a fresh [`PointId`].
    pub fn new(value: P, index: usize) -> Self {
        Self {
            value,
            id: PointId::next(),
            index,
            stored_distance: f64::NAN,
            stored_stamp: None,
            neighbors: Vec::new(),
        }
    }

    /// The wrapped point.
    pub fn value(&self) -> &P {
        &self.value
    }

    /// Identity of this container.
    pub fn id(&self) -> PointId {
        self.id
    }

    /// Position hint within the owning list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read-only view of the wrapped point's coordinates.
    pub fn coordinates(&self) -> Cow<'_, [f64]> {
        self.value.coordinates()
    }

    /// Output-space vector of the wrapped point.
    ///
    /// # Errors
    ///
    /// [`CloudError::Unsupported`] if the point type has no output vector.
    pub fn output_vector(&self) -> Result<Cow<'_, [f64]>, CloudError> {
        self.value.output_vector().ok_or(CloudError::Unsupported {
            operation: "output_vector",
        })
    }

    /// Creates a link from this container to `target`. No distance is computed.
    pub fn create_link(&self, target: PointHandle) -> NeighborLink {
        NeighborLink::new(target)
    }

    /// Neighbor links, ascending by cached distance.
    pub fn neighbors(&self) -> &[NeighborLink] {
        &self.neighbors
    }

    /// Targets of the neighbor links, nearest first.
    pub fn neighbor_handles(&self) -> impl Iterator<Item = PointHandle> + '_ {
        self.neighbors.iter().map(NeighborLink::target)
    }

    /// Drops all neighbor links.
    pub fn clear_neighbors(&mut self) {
        self.neighbors.clear();
    }

    pub(crate) fn neighbors_mut(&mut self) -> &mut Vec<NeighborLink> {
        &mut self.neighbors
    }

    /// Overwrites the neighbor list with `ranked`, reusing links by rank and
    /// truncating any surplus.
    pub(crate) fn assign_neighbors(&mut self, ranked: &[(PointHandle, f64)]) {
        for (rank, &(target, distance)) in ranked.iter().enumerate() {
            match self.neighbors.get_mut(rank) {
                Some(link) => link.retarget(target, distance),
                None => {
                    let mut link = self.create_link(target);
                    link.set_distance(distance);
                    self.neighbors.push(link);
                }
            }
        }
        self.neighbors.truncate(ranked.len());
    }

    /// Cached distance to the reference point of the metric state `stamp`.
    ///
    /// Returns `None` if nothing was cached or the cache belongs to another
    /// reference point or parameter set.
    pub fn cached_distance(&self, stamp: u64) -> Option<f64> {
        (self.stored_stamp == Some(stamp)).then_some(self.stored_distance)
    }

    pub(crate) fn store_distance(&mut self, distance: f64, stamp: u64) {
        self.stored_distance = distance;
        self.stored_stamp = Some(stamp);
    }

    /// Raw cache value for sorting right after [`store_distance`](Self::store_distance).
    pub(crate) fn stored_distance(&self) -> f64 {
        self.stored_distance
    }
}
