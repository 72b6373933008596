//! The point cloud: an arena of containers addressed by [`PointHandle`].

use rand::Rng;
use tracing::debug;

use crate::bounds::{Bounds, estimate_length_scales};
use crate::container::{NeighborLink, PointContainer, PointHandle};
use crate::error::CloudError;
use crate::point::PointAdapter;
use crate::random::random_point;

/// An ordered collection of points and their nearest-neighbor lists.
///
/// Containers live in an arena; a [`PointHandle`] is a container's slot and
/// equals its `index`. Points can be appended or the whole list replaced, but
/// not removed individually. Neighbor lists are only filled by an explicit
/// search ([`find_closest_points`](Self::find_closest_points) and friends) and
/// go stale when the point list changes.
///
/// # Example
///
/// ```
/// use nebula_cloud::{DistanceMetric, PointCloud, VectorPoint};
///
/// let mut cloud = PointCloud::from_points([
///     VectorPoint::from([0.0, 0.0]),
///     VectorPoint::from([1.0, 0.0]),
///     VectorPoint::from([4.0, 0.0]),
/// ]);
/// let mut metric = DistanceMetric::new();
/// cloud.find_closest_points(&mut metric, 1).unwrap();
///
/// let nearest = cloud.points()[2].neighbors()[0];
/// assert_eq!(nearest.target().index(), 1);
/// assert_eq!(nearest.distance_from_point(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct PointCloud<P> {
    points: Vec<PointContainer<P>>,
}

impl<P: PointAdapter> Default for PointCloud<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PointAdapter> PointCloud<P> {
    /// Creates an empty cloud.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a cloud holding `values`, in order.
    pub fn from_points(values: impl IntoIterator<Item = P>) -> Self {
        let mut cloud = Self::new();
        cloud.add_points(values);
        cloud
    }

    /// Wraps `value` in a fresh container for slot `index`.
    pub fn create_point_container(&self, value: P, index: usize) -> PointContainer<P> {
        PointContainer::new(value, index)
    }

    /// Appends `values`, assigning each container its slot index.
    pub fn add_points(&mut self, values: impl IntoIterator<Item = P>) {
        for value in values {
            let container = self.create_point_container(value, self.points.len());
            self.points.push(container);
        }
    }

    /// Replaces all points with `values`.
    pub fn set_points(&mut self, values: impl IntoIterator<Item = P>) {
        self.points.clear();
        self.add_points(values);
    }

    /// Removes all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the cloud holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension of the first point, or `None` for an empty cloud.
    pub fn dimension(&self) -> Option<usize> {
        self.points.first().map(|c| c.value().dimension())
    }

    /// All containers, in slot order.
    pub fn points(&self) -> &[PointContainer<P>] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [PointContainer<P>] {
        &mut self.points
    }

    /// Iterates over the containers in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, PointContainer<P>> {
        self.points.iter()
    }

    /// Handles of all containers, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = PointHandle> + use<P> {
        (0..self.points.len()).map(PointHandle)
    }

    /// The container at `handle`.
    ///
    /// # Errors
    ///
    /// [`CloudError::UnknownPoint`] if `handle` is out of range.
    pub fn get(&self, handle: PointHandle) -> Result<&PointContainer<P>, CloudError> {
        self.points.get(handle.0).ok_or(CloudError::UnknownPoint {
            handle: handle.0,
            len: self.points.len(),
        })
    }

    /// Neighbor links of the container at `handle`, nearest first.
    pub fn neighbors(&self, handle: PointHandle) -> Result<&[NeighborLink], CloudError> {
        self.get(handle).map(PointContainer::neighbors)
    }

    /// Drops every neighbor list.
    pub fn clear_neighbors(&mut self) {
        for c in &mut self.points {
            c.clear_neighbors();
        }
    }

    /// Smallest box enclosing all points, or `None` for an empty cloud.
    pub fn bounds(&self) -> Result<Option<Bounds>, CloudError> {
        Bounds::enclosing(self.points.iter().map(PointContainer::value))
    }

    /// Robust per-axis length scales of the cloud (see [`estimate_length_scales`]).
    pub fn length_scales(&self) -> Result<Vec<f64>, CloudError> {
        estimate_length_scales(self.points.iter().map(PointContainer::value))
    }

    /// Replaces all points with `n` points drawn uniformly from `bounds`.
    ///
    /// # Errors
    ///
    /// Fails like [`random_point`]; the cloud is left untouched on error.
    pub fn generate_random_cloud(
        &mut self,
        n: usize,
        bounds: &Bounds,
        rng: &mut impl Rng,
    ) -> Result<(), CloudError> {
        bounds.validate()?;
        let values = (0..n)
            .map(|_| random_point(bounds, &mut *rng))
            .collect::<Result<Vec<P>, _>>()?;
        self.set_points(values);
        debug!(n_points = n, dimension = bounds.dimension(), "generated random cloud");
        Ok(())
    }
}

impl<'a, P> IntoIterator for &'a PointCloud<P> {
    type Item = &'a PointContainer<P>;
    type IntoIter = std::slice::Iter<'a, PointContainer<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
