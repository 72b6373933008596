//! The distance metric: point distances, reference-point ranking and
//! coordinate normalization.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU64};

use crate::bounds::Bounds;
use crate::container::{PointContainer, PointHandle, PointId};
use crate::distance::{ascending, relative, sq_euclidean, weighted_sq_euclidean};
use crate::error::{CloudError, check_dimension};
use crate::point::PointAdapter;

/// A user-supplied distance function between two points.
pub type DistanceFn<P> = Arc<dyn Fn(&P, &P) -> f64 + Send + Sync>;

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, atomic::Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Reference<P> {
    id: PointId,
    value: P,
}

/// Distance metric over points of type `P`.
///
/// Without a custom distance function the metric is Euclidean over the
/// extracted coordinates, weighted by per-axis length scales when those are
/// set. Bounds (`min`/`max`) drive [`relative_coordinates`](Self::relative_coordinates)
/// and are independent of the length scales. The `output_*` parameters mirror
/// all of this for the output vectors of point types that carry one.
///
/// The metric also holds a *reference point*, the origin against which
/// [`compare`](Self::compare) and the sorts rank containers.
///
/// # Example
///
/// ```
/// use nebula_cloud::{DistanceMetric, VectorPoint};
///
/// let metric = DistanceMetric::new().with_length_scales(vec![1.0, 2.0]);
/// let a = VectorPoint::from([0.0, 0.0]);
/// let b = VectorPoint::from([3.0, 8.0]);
///
/// // sqrt(3² + (8/2)²) = 5
/// assert_eq!(metric.distance(&a, &b).unwrap(), 5.0);
/// ```
#[derive(Clone)]
pub struct DistanceMetric<P> {
    distance_fn: Option<DistanceFn<P>>,
    length_scales: Option<Vec<f64>>,
    min: Option<Vec<f64>>,
    max: Option<Vec<f64>>,
    output_length_scales: Option<Vec<f64>>,
    output_min: Option<Vec<f64>>,
    output_max: Option<Vec<f64>>,
    reference: Option<Reference<P>>,
    /// Identifies the current reference point and parameter set.
    stamp: u64,
}

impl<P> fmt::Debug for DistanceMetric<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistanceMetric")
            .field("custom_distance", &self.distance_fn.is_some())
            .field("length_scales", &self.length_scales)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("output_length_scales", &self.output_length_scales)
            .field("output_min", &self.output_min)
            .field("output_max", &self.output_max)
            .field("reference", &self.reference.as_ref().map(|r| r.id))
            .finish()
    }
}

impl<P: PointAdapter> Default for DistanceMetric<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PointAdapter> DistanceMetric<P> {
    /// Creates a plain Euclidean metric with no normalization and no reference point.
    pub fn new() -> Self {
        Self {
            distance_fn: None,
            length_scales: None,
            min: None,
            max: None,
            output_length_scales: None,
            output_min: None,
            output_max: None,
            reference: None,
            stamp: next_stamp(),
        }
    }

    /// Replaces the default distance with `f`.
    pub fn with_distance_fn(mut self, f: impl Fn(&P, &P) -> f64 + Send + Sync + 'static) -> Self {
        self.distance_fn = Some(Arc::new(f));
        self.touch();
        self
    }

    /// Sets per-axis length scales for the weighted Euclidean distance.
    pub fn with_length_scales(mut self, scales: Vec<f64>) -> Self {
        self.length_scales = Some(scales);
        self.touch();
        self
    }

    /// Sets the bounds used by [`relative_coordinates`](Self::relative_coordinates).
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        let (min, max) = bounds.into_parts();
        self.min = Some(min);
        self.max = Some(max);
        self.touch();
        self
    }

    /// Sets per-axis length scales for [`output_distance`](Self::output_distance).
    pub fn with_output_length_scales(mut self, scales: Vec<f64>) -> Self {
        self.output_length_scales = Some(scales);
        self.touch();
        self
    }

    /// Sets the bounds used by [`output_relative_coordinates`](Self::output_relative_coordinates).
    pub fn with_output_bounds(mut self, bounds: Bounds) -> Self {
        let (min, max) = bounds.into_parts();
        self.output_min = Some(min);
        self.output_max = Some(max);
        self.touch();
        self
    }

    /// Returns the length scales, if set.
    pub fn length_scales(&self) -> Option<&[f64]> {
        self.length_scales.as_deref()
    }

    /// Returns the per-axis minima, if set.
    pub fn min(&self) -> Option<&[f64]> {
        self.min.as_deref()
    }

    /// Returns the per-axis maxima, if set.
    pub fn max(&self) -> Option<&[f64]> {
        self.max.as_deref()
    }

    /// Returns the output-space length scales, if set.
    pub fn output_length_scales(&self) -> Option<&[f64]> {
        self.output_length_scales.as_deref()
    }

    /// Returns `true` when a custom distance function replaces the default.
    pub fn has_custom_distance(&self) -> bool {
        self.distance_fn.is_some()
    }

    /// Stamp identifying the current reference point and parameter set.
    ///
    /// Changes whenever either changes; container caches are only valid
    /// under the stamp they were written with.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    fn touch(&mut self) {
        self.stamp = next_stamp();
    }

    /// Makes `container` the origin for ranking.
    pub fn set_reference_point(&mut self, container: &PointContainer<P>) {
        self.reference = Some(Reference {
            id: container.id(),
            value: container.value().clone(),
        });
        self.touch();
    }

    /// Removes the reference point.
    pub fn clear_reference_point(&mut self) {
        self.reference = None;
        self.touch();
    }

    /// Identity of the current reference point.
    pub fn reference_id(&self) -> Option<PointId> {
        self.reference.as_ref().map(|r| r.id)
    }

    fn reference_value(&self) -> Result<&P, CloudError> {
        self.reference
            .as_ref()
            .map(|r| &r.value)
            .ok_or(CloudError::MissingParameter {
                parameter: "reference_point",
            })
    }

    /// Distance between two points.
    ///
    /// Uses the custom distance function when one is set, otherwise
    /// [`default_distance`](Self::default_distance).
    pub fn distance(&self, a: &P, b: &P) -> Result<f64, CloudError> {
        match &self.distance_fn {
            Some(f) => Ok(f(a, b)),
            None => self.default_distance(a, b),
        }
    }

    /// (Weighted) Euclidean distance between the coordinates of `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`CloudError::DimensionMismatch`] if the points, or the length scales,
    /// disagree in dimension.
    pub fn default_distance(&self, a: &P, b: &P) -> Result<f64, CloudError> {
        let a = a.coordinates();
        let b = b.coordinates();
        scaled_distance(&a, &b, self.length_scales.as_deref(), "length_scales")
    }

    /// Distance between two containers.
    pub fn distance_between(
        &self,
        a: &PointContainer<P>,
        b: &PointContainer<P>,
    ) -> Result<f64, CloudError> {
        self.distance(a.value(), b.value())
    }

    /// Distance from a container to a bare point.
    pub fn distance_to_value(&self, a: &PointContainer<P>, b: &P) -> Result<f64, CloudError> {
        self.distance(a.value(), b)
    }

    /// Distance from a bare point to a container.
    pub fn distance_from_value(&self, a: &P, b: &PointContainer<P>) -> Result<f64, CloudError> {
        self.distance(a, b.value())
    }

    /// Distance from a container to the reference point.
    ///
    /// # Errors
    ///
    /// [`CloudError::MissingParameter`] if no reference point is set.
    pub fn distance_to_reference(&self, a: &PointContainer<P>) -> Result<f64, CloudError> {
        let reference = self.reference_value()?;
        self.distance(a.value(), reference)
    }

    /// Orders two containers by ascending distance to the reference point.
    ///
    /// Ties and incomparable (NaN) distances compare as `Equal`.
    pub fn compare(
        &self,
        a: &PointContainer<P>,
        b: &PointContainer<P>,
    ) -> Result<Ordering, CloudError> {
        let da = self.distance_to_reference(a)?;
        let db = self.distance_to_reference(b)?;
        Ok(da.partial_cmp(&db).unwrap_or(Ordering::Equal))
    }

    /// Rescales `coord` into the unit box given by the metric bounds.
    ///
    /// A zero-width axis uses width 1.
    ///
    /// # Errors
    ///
    /// [`CloudError::MissingParameter`] if `min` or `max` is unset,
    /// [`CloudError::DimensionMismatch`] if they disagree with `coord`.
    pub fn relative_coordinates(&self, coord: &[f64]) -> Result<Vec<f64>, CloudError> {
        let (min, max) = bounds_pair(self.min.as_deref(), self.max.as_deref(), "min", "max")?;
        check_dimension("min", coord.len(), min.len())?;
        check_dimension("max", coord.len(), max.len())?;
        Ok(relative(coord, min, max))
    }

    /// Distance between the output vectors of `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`CloudError::Unsupported`] for point types without output vectors,
    /// [`CloudError::DimensionMismatch`] for disagreeing lengths.
    pub fn output_distance(&self, a: &P, b: &P) -> Result<f64, CloudError> {
        let a = output_of(a, "output_distance")?;
        let b = output_of(b, "output_distance")?;
        scaled_distance(
            &a,
            &b,
            self.output_length_scales.as_deref(),
            "output_length_scales",
        )
    }

    /// Rescales the output vector of `point` into the unit box given by the
    /// output bounds.
    pub fn output_relative_coordinates(&self, point: &P) -> Result<Vec<f64>, CloudError> {
        let output = output_of(point, "output_relative_coordinates")?;
        let (min, max) = bounds_pair(
            self.output_min.as_deref(),
            self.output_max.as_deref(),
            "output_min",
            "output_max",
        )?;
        check_dimension("output_min", output.len(), min.len())?;
        check_dimension("output_max", output.len(), max.len())?;
        Ok(relative(&output, min, max))
    }

    /// Sorts `list` in place by ascending distance to the reference point,
    /// evaluating the distance inside every comparison.
    ///
    /// The sort is stable, so ties keep their relative order. NaN distances
    /// rank after every number.
    pub fn sort(
        &self,
        arena: &[PointContainer<P>],
        list: &mut [PointHandle],
    ) -> Result<(), CloudError> {
        self.reference_value()?;
        check_handles(arena.len(), list)?;

        let mut failure = None;
        list.sort_by(|a, b| {
            let da = self.distance_to_reference(&arena[a.0]);
            let db = self.distance_to_reference(&arena[b.0]);
            match (da, db) {
                (Ok(da), Ok(db)) => ascending(da, db),
                (Err(e), _) | (_, Err(e)) => {
                    failure.get_or_insert(e);
                    Ordering::Equal
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Sorts `list` in place by ascending distance to the reference point,
    /// computing each distance once.
    ///
    /// Writes every listed container's cached distance (under the current
    /// [`stamp`](Self::stamp)), then sorts on the cached scalars. Produces the
    /// same order as [`sort`](Self::sort).
    pub fn sort_using_cached_distance(
        &self,
        arena: &mut [PointContainer<P>],
        list: &mut [PointHandle],
    ) -> Result<(), CloudError> {
        let reference = self.reference_value()?;
        check_handles(arena.len(), list)?;

        for &h in list.iter() {
            let d = self.distance(arena[h.0].value(), reference)?;
            arena[h.0].store_distance(d, self.stamp);
        }
        list.sort_by(|a, b| {
            ascending(arena[a.0].stored_distance(), arena[b.0].stored_distance())
        });
        Ok(())
    }
}

fn scaled_distance(
    a: &[f64],
    b: &[f64],
    scales: Option<&[f64]>,
    scales_name: &'static str,
) -> Result<f64, CloudError> {
    check_dimension("point", a.len(), b.len())?;
    let sq = match scales {
        None => sq_euclidean(a, b),
        Some(s) => {
            check_dimension(scales_name, a.len(), s.len())?;
            weighted_sq_euclidean(a, b, s)
        }
    };
    Ok(sq.sqrt())
}

fn bounds_pair<'a>(
    min: Option<&'a [f64]>,
    max: Option<&'a [f64]>,
    min_name: &'static str,
    max_name: &'static str,
) -> Result<(&'a [f64], &'a [f64]), CloudError> {
    let min = min.ok_or(CloudError::MissingParameter {
        parameter: min_name,
    })?;
    let max = max.ok_or(CloudError::MissingParameter {
        parameter: max_name,
    })?;
    Ok((min, max))
}

fn output_of<'a, P: PointAdapter>(
    point: &'a P,
    operation: &'static str,
) -> Result<std::borrow::Cow<'a, [f64]>, CloudError> {
    point
        .output_vector()
        .ok_or(CloudError::Unsupported { operation })
}

fn check_handles(len: usize, list: &[PointHandle]) -> Result<(), CloudError> {
    match list.iter().find(|h| h.0 >= len) {
        Some(h) => Err(CloudError::UnknownPoint { handle: h.0, len }),
        None => Ok(()),
    }
}
