//! Brute-force k-nearest-neighbor search over a [`PointCloud`].

use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cloud::PointCloud;
use crate::container::PointHandle;
use crate::error::CloudError;
use crate::metric::DistanceMetric;
use crate::point::PointAdapter;
use crate::select::BoundedNeighbors;

/// Checks `1 <= k <= n_points - 1`.
fn validate_k(k: usize, n_points: usize) -> Result<(), CloudError> {
    if k == 0 || k >= n_points {
        return Err(CloudError::InvalidK { k, n_points });
    }
    Ok(())
}

impl<P: PointAdapter> PointCloud<P> {
    /// Fills every container's neighbor list with its `k` nearest neighbors.
    ///
    /// For each point in turn the metric's reference point is moved to it, all
    /// points are ranked by the cached-distance sort, and the first `k`
    /// entries other than the point itself become its links. Existing links
    /// are reused by rank; surplus links are dropped.
    ///
    /// The metric is left with its reference point set to the last point.
    ///
    /// # Errors
    ///
    /// [`CloudError::InvalidK`] unless `1 <= k <= len() - 1`; any metric
    /// error. On a metric error earlier points keep their new lists.
    #[tracing::instrument(skip_all, fields(n_points = self.len(), k = k))]
    pub fn find_closest_points(
        &mut self,
        metric: &mut DistanceMetric<P>,
        k: usize,
    ) -> Result<(), CloudError> {
        let all = 0..self.len();
        self.find_closest_points_in(metric, k, all)
    }

    /// Like [`find_closest_points`](Self::find_closest_points), but only
    /// rebuilds the lists of the points in `range`. Candidates are still drawn
    /// from the whole cloud.
    ///
    /// # Errors
    ///
    /// [`CloudError::UnknownPoint`] if `range` reaches past the last point,
    /// otherwise as [`find_closest_points`](Self::find_closest_points).
    pub fn find_closest_points_in(
        &mut self,
        metric: &mut DistanceMetric<P>,
        k: usize,
        range: Range<usize>,
    ) -> Result<(), CloudError> {
        let n = self.len();
        validate_k(k, n)?;
        if range.end > n {
            return Err(CloudError::UnknownPoint {
                handle: range.end - 1,
                len: n,
            });
        }

        let mut snapshot: Vec<PointHandle> = self.handles().collect();
        let mut ranked: Vec<(PointHandle, f64)> = Vec::with_capacity(k);

        for i in range.clone() {
            let origin = PointHandle(i);
            metric.set_reference_point(&self.points()[i]);
            metric.sort_using_cached_distance(self.points_mut(), &mut snapshot)?;

            let points = self.points();
            ranked.clear();
            for &target in snapshot.iter().filter(|&&h| h != origin).take(k) {
                let d = metric.distance_between(&points[i], &points[target.0])?;
                ranked.push((target, d));
            }
            self.points_mut()[i].assign_neighbors(&ranked);
            trace!(point = i, nearest = ?ranked.first(), "neighbors assigned");
        }

        debug!(from = range.start, to = range.end, k, "brute-force search done");
        Ok(())
    }

    /// Parallel brute-force search.
    ///
    /// Every point's candidates are ranked on a rayon task against a shared
    /// borrow of the cloud, using a private [`BoundedNeighbors`]. Neighbor
    /// lists are written only after all tasks succeed, so an error leaves the
    /// cloud untouched. The metric's reference point is not used.
    ///
    /// Produces the same neighbor distances as the sequential search; tied
    /// candidates may be picked differently.
    ///
    /// # Errors
    ///
    /// As [`find_closest_points`](Self::find_closest_points).
    #[tracing::instrument(skip_all, fields(n_points = self.len(), k = k))]
    pub fn par_find_closest_points(
        &mut self,
        metric: &DistanceMetric<P>,
        k: usize,
    ) -> Result<(), CloudError>
    where
        P: Send + Sync,
    {
        validate_k(k, self.len())?;

        let points = self.points();
        let lists = (0..points.len())
            .into_par_iter()
            .map(|i| -> Result<Vec<(PointHandle, f64)>, CloudError> {
                let mut best = BoundedNeighbors::new(k);
                for (j, other) in points.iter().enumerate() {
                    if j != i {
                        best.offer(PointHandle(j), metric.distance_between(&points[i], other)?);
                    }
                }
                Ok(best.into_sorted())
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (container, ranked) in self.points_mut().iter_mut().zip(&lists) {
            container.assign_neighbors(ranked);
        }
        debug!(k, "parallel brute-force search done");
        Ok(())
    }
}

/// A strategy that fills the neighbor lists of a cloud.
pub trait NeighborSearch<P: PointAdapter> {
    /// Rebuilds every point's `k` nearest neighbors.
    fn search(
        &self,
        cloud: &mut PointCloud<P>,
        metric: &mut DistanceMetric<P>,
        k: usize,
    ) -> Result<(), CloudError>;
}

/// Sequential search, see [`PointCloud::find_closest_points`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl<P: PointAdapter> NeighborSearch<P> for BruteForce {
    fn search(
        &self,
        cloud: &mut PointCloud<P>,
        metric: &mut DistanceMetric<P>,
        k: usize,
    ) -> Result<(), CloudError> {
        cloud.find_closest_points(metric, k)
    }
}

/// Parallel search, see [`PointCloud::par_find_closest_points`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBruteForce;

impl<P: PointAdapter + Send + Sync> NeighborSearch<P> for ParallelBruteForce {
    fn search(
        &self,
        cloud: &mut PointCloud<P>,
        metric: &mut DistanceMetric<P>,
        k: usize,
    ) -> Result<(), CloudError> {
        cloud.par_find_closest_points(metric, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::PointContainer;
    use crate::point::VectorPoint;
    use approx::assert_abs_diff_eq;

    fn square_and_outlier() -> PointCloud<VectorPoint> {
        PointCloud::from_points([
            VectorPoint::from([0.0, 0.0]),
            VectorPoint::from([1.0, 0.0]),
            VectorPoint::from([0.0, 1.0]),
            VectorPoint::from([5.0, 5.0]),
        ])
    }

    fn targets(cloud: &PointCloud<VectorPoint>, i: usize) -> Vec<usize> {
        cloud.points()[i]
            .neighbor_handles()
            .map(PointHandle::index)
            .collect()
    }

    #[test]
    fn test_validate_k() {
        assert!(validate_k(1, 2).is_ok());
        assert!(validate_k(3, 4).is_ok());
        assert!(matches!(
            validate_k(0, 4),
            Err(CloudError::InvalidK { k: 0, n_points: 4 })
        ));
        assert!(validate_k(4, 4).is_err());
        assert!(validate_k(1, 1).is_err());
        assert!(validate_k(1, 0).is_err());
    }

    #[test]
    fn test_nearest_of_each_point() {
        let mut cloud = square_and_outlier();
        let mut metric = DistanceMetric::new();
        cloud.find_closest_points(&mut metric, 1).unwrap();

        assert_eq!(targets(&cloud, 1), vec![0]);
        assert_eq!(targets(&cloud, 2), vec![0]);
        let link = cloud.points()[1].neighbors()[0];
        assert_abs_diff_eq!(link.distance_from_point(), 1.0, epsilon = 1e-12);
        // the outlier's nearest is one of (1,0) or (0,1), both at sqrt(41)
        let outlier = cloud.points()[3].neighbors()[0];
        assert!(matches!(outlier.target().index(), 1 | 2));
        assert_abs_diff_eq!(outlier.distance_from_point(), 41f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_self_is_never_a_neighbor() {
        let mut cloud = square_and_outlier();
        let mut metric = DistanceMetric::new();
        cloud.find_closest_points(&mut metric, 3).unwrap();
        for (i, c) in cloud.iter().enumerate() {
            assert_eq!(c.neighbors().len(), 3);
            assert!(c.neighbor_handles().all(|h| h.index() != i));
        }
    }

    #[test]
    fn test_duplicate_points_skip_by_identity() {
        let mut cloud = PointCloud::from_points([
            VectorPoint::from([2.0]),
            VectorPoint::from([2.0]),
            VectorPoint::from([7.0]),
        ]);
        let mut metric = DistanceMetric::new();
        cloud.find_closest_points(&mut metric, 1).unwrap();
        assert_eq!(targets(&cloud, 0), vec![1]);
        assert_eq!(targets(&cloud, 1), vec![0]);
        assert_eq!(cloud.points()[0].neighbors()[0].distance_from_point(), 0.0);
    }

    #[test]
    fn test_rejects_bad_k() {
        let mut cloud = square_and_outlier();
        let mut metric = DistanceMetric::new();
        assert!(matches!(
            cloud.find_closest_points(&mut metric, 4),
            Err(CloudError::InvalidK { k: 4, n_points: 4 })
        ));
        assert!(cloud.find_closest_points(&mut metric, 0).is_err());
        assert!(cloud.par_find_closest_points(&metric, 0).is_err());
        assert!(cloud.iter().all(|c| c.neighbors().is_empty()));
    }

    #[test]
    fn test_range_only_touches_listed_points() {
        let mut cloud = square_and_outlier();
        let mut metric = DistanceMetric::new();
        cloud.find_closest_points_in(&mut metric, 2, 1..3).unwrap();
        assert!(cloud.points()[0].neighbors().is_empty());
        assert_eq!(cloud.points()[1].neighbors().len(), 2);
        assert_eq!(cloud.points()[2].neighbors().len(), 2);
        assert!(cloud.points()[3].neighbors().is_empty());

        assert!(matches!(
            cloud.find_closest_points_in(&mut metric, 1, 2..5),
            Err(CloudError::UnknownPoint { handle: 4, len: 4 })
        ));
    }

    #[test]
    fn test_smaller_k_truncates() {
        let mut cloud = square_and_outlier();
        let mut metric = DistanceMetric::new();
        cloud.find_closest_points(&mut metric, 3).unwrap();
        cloud.find_closest_points(&mut metric, 1).unwrap();
        assert!(cloud.iter().all(|c| c.neighbors().len() == 1));
    }

    #[test]
    fn test_metric_error_propagates() {
        let mut cloud = PointCloud::from_points([
            VectorPoint::from([0.0, 0.0]),
            VectorPoint::from([1.0]),
        ]);
        let mut metric = DistanceMetric::new();
        assert!(matches!(
            cloud.find_closest_points(&mut metric, 1),
            Err(CloudError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            cloud.par_find_closest_points(&metric, 1),
            Err(CloudError::DimensionMismatch { .. })
        ));
        assert!(cloud.points()[0].neighbors().is_empty());
    }

    #[test]
    fn test_nan_distances_rank_last() {
        let poisoned = |x: f64| x as usize % 7 == 3;
        let metric_fn = move |a: &VectorPoint, b: &VectorPoint| {
            let (x, y) = (a.coordinates()[0], b.coordinates()[0]);
            if poisoned(x) || poisoned(y) {
                f64::NAN
            } else {
                (x - y).abs()
            }
        };
        let mut cloud = PointCloud::from_points((0..200).map(|i| VectorPoint::from([i as f64])));
        let mut metric = DistanceMetric::new().with_distance_fn(metric_fn);
        cloud.find_closest_points(&mut metric, 3).unwrap();

        for (i, c) in cloud.iter().enumerate() {
            let d: Vec<f64> = c.neighbors().iter().map(|l| l.distance_from_point()).collect();
            assert_eq!(d.len(), 3);
            if poisoned(i as f64) {
                assert!(d.iter().all(|x| x.is_nan()));
            } else {
                assert_abs_diff_eq!(d[0], 1.0);
                assert!(d.iter().all(|x| x.is_finite()));
                assert!(d.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        let mut parallel = cloud.clone();
        parallel.par_find_closest_points(&metric, 3).unwrap();
        let distances = |c: &PointContainer<VectorPoint>| -> Vec<f64> {
            c.neighbors().iter().map(|l| l.distance_from_point()).collect()
        };
        for (seq, par) in cloud.iter().zip(parallel.iter()) {
            if !poisoned(seq.index() as f64) {
                assert_eq!(distances(seq), distances(par));
            }
        }
    }

    #[test]
    fn test_parallel_on_small_cloud() {
        let mut cloud = square_and_outlier();
        let metric = DistanceMetric::new();
        cloud.par_find_closest_points(&metric, 2).unwrap();
        // (0,0): (1,0) and (0,1), tie broken by handle order
        assert_eq!(targets(&cloud, 0), vec![1, 2]);
        let d: Vec<f64> = cloud.points()[1]
            .neighbors()
            .iter()
            .map(|l| l.distance_from_point())
            .collect();
        assert_abs_diff_eq!(d[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[1], 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_search_strategies_through_trait() {
        let strategies: Vec<Box<dyn NeighborSearch<VectorPoint>>> =
            vec![Box::new(BruteForce), Box::new(ParallelBruteForce)];
        for s in &strategies {
            let mut cloud = square_and_outlier();
            let mut metric = DistanceMetric::new();
            s.search(&mut cloud, &mut metric, 1).unwrap();
            assert_eq!(targets(&cloud, 1), vec![0]);
        }
    }
}
