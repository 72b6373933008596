//! Bounded top-k neighbor selection.

use crate::container::PointHandle;
use crate::distance::ascending;

/// Capacity-bounded neighbor list kept in ascending distance order.
///
/// Candidates are refined by repeated [`offer`](Self::offer) calls. A
/// candidate tied with an entry already held is placed after it, so offering
/// candidates in handle order reproduces the order of a stable sort.
/// Distances are totally ordered with NaN ranked last.
///
/// # Example
///
/// ```
/// use nebula_cloud::{BoundedNeighbors, PointHandle};
///
/// let mut best = BoundedNeighbors::new(2);
/// for (i, d) in [4.0, 1.0, 3.0, 0.5].into_iter().enumerate() {
///     best.offer(PointHandle::new(i), d);
/// }
/// let ranked = best.into_sorted();
/// assert_eq!(ranked, vec![(PointHandle::new(3), 0.5), (PointHandle::new(1), 1.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedNeighbors {
    capacity: usize,
    entries: Vec<(PointHandle, f64)>,
}

impl BoundedNeighbors {
    /// Creates an empty list holding at most `capacity` neighbors.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.saturating_add(1)),
        }
    }

    /// Maximum number of neighbors kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of neighbors currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no neighbor is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once `capacity` neighbors are held.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Distance of the farthest neighbor held, if any.
    pub fn worst(&self) -> Option<f64> {
        self.entries.last().map(|e| e.1)
    }

    /// Offers a candidate. Returns `true` if it was kept.
    pub fn offer(&mut self, handle: PointHandle, distance: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_full() {
            match self.worst() {
                Some(w) if ascending(distance, w).is_lt() => {}
                _ => return false,
            }
        }
        let at = self
            .entries
            .partition_point(|e| ascending(e.1, distance).is_le());
        self.entries.insert(at, (handle, distance));
        self.entries.truncate(self.capacity);
        true
    }

    /// Held neighbors, nearest first.
    pub fn as_slice(&self) -> &[(PointHandle, f64)] {
        &self.entries
    }

    /// Consumes the list, returning neighbors nearest first.
    pub fn into_sorted(self) -> Vec<(PointHandle, f64)> {
        self.entries
    }
}
