//! Per-rank statistics of cached neighbor distances.

use std::fmt;

use nebula_stats::{Deviations, RunningSummary};
use serde::Serialize;
use tracing::debug;

use crate::cloud::PointCloud;
use crate::error::CloudError;
use crate::metric::DistanceMetric;
use crate::point::PointAdapter;

/// Configuration for [`PointCloud::neighbor_distance_statistics`].
///
/// # Example
///
/// ```
/// use nebula_cloud::StatisticsConfig;
///
/// let config = StatisticsConfig::new(3).with_deviations(false);
/// assert_eq!(config.num_ranks(), 3);
/// assert!(!config.deviations());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsConfig {
    /// Number of neighbor ranks to summarise, starting at the nearest.
    num_ranks: usize,
    /// Whether to run the second pass for spread measures.
    deviations: bool,
}

impl StatisticsConfig {
    /// Creates a configuration for ranks `0..num_ranks`.
    ///
    /// Defaults: `deviations = true`.
    pub fn new(num_ranks: usize) -> Self {
        Self {
            num_ranks,
            deviations: true,
        }
    }

    /// Enables or disables the standard and mean absolute deviation pass.
    pub fn with_deviations(mut self, deviations: bool) -> Self {
        self.deviations = deviations;
        self
    }

    /// Returns the number of ranks.
    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    /// Returns whether deviations are computed.
    pub fn deviations(&self) -> bool {
        self.deviations
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Distance statistics of one neighbor rank across the cloud.
///
/// Rank 0 is every point's nearest neighbor. A rank no point reaches has
/// `count = 0`, `min = +inf`, `max = -inf` and a `NaN` mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankStatistics {
    rank: usize,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    /// Population standard deviation about `mean`.
    std_dev: Option<f64>,
    /// Mean absolute deviation about `mean`.
    mean_abs_deviation: Option<f64>,
}

impl RankStatistics {
    /// Neighbor rank, 0 for the nearest.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of points with a neighbor at this rank.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest distance.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest distance.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Mean distance.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation, if the deviation pass ran.
    pub fn std_dev(&self) -> Option<f64> {
        self.std_dev
    }

    /// Mean absolute deviation, if the deviation pass ran.
    pub fn mean_abs_deviation(&self) -> Option<f64> {
        self.mean_abs_deviation
    }
}

/// Report produced by [`PointCloud::neighbor_distance_statistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborStatistics {
    n_points: usize,
    ranks: Vec<RankStatistics>,
}

impl NeighborStatistics {
    /// Number of points in the cloud when the report was taken.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Per-rank statistics, nearest first.
    pub fn ranks(&self) -> &[RankStatistics] {
        &self.ranks
    }

    /// Statistics of `rank`, if it was requested.
    pub fn rank(&self, rank: usize) -> Option<&RankStatistics> {
        self.ranks.get(rank)
    }
}

fn optional(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => write!(f, " {v:>12.6}"),
        None => write!(f, " {:>12}", "-"),
    }
}

impl fmt::Display for NeighborStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "neighbor distances over {} points", self.n_points)?;
        writeln!(
            f,
            "{:>4} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "rank", "count", "min", "max", "mean", "std_dev", "mean_abs_dev"
        )?;
        for r in &self.ranks {
            write!(
                f,
                "{:>4} {:>6} {:>12.6} {:>12.6} {:>12.6}",
                r.rank, r.count, r.min, r.max, r.mean
            )?;
            optional(f, r.std_dev)?;
            optional(f, r.mean_abs_deviation)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<P: PointAdapter> PointCloud<P> {
    /// Recomputes the cached distance of every neighbor link under `metric`.
    ///
    /// Link membership and order are left alone, so after a metric change the
    /// lists may no longer be sorted. All distances are computed before any is
    /// written; on error the cloud is unchanged.
    ///
    /// # Errors
    ///
    /// [`CloudError::UnknownPoint`] for a link whose target is gone; any
    /// metric error.
    pub fn update_neighbor_distances(
        &mut self,
        metric: &DistanceMetric<P>,
    ) -> Result<(), CloudError> {
        let mut fresh = Vec::with_capacity(self.len());
        for container in self.iter() {
            let distances = container
                .neighbor_handles()
                .map(|target| metric.distance_between(container, self.get(target)?))
                .collect::<Result<Vec<f64>, _>>()?;
            fresh.push(distances);
        }

        let mut n_links = 0;
        for (container, distances) in self.points_mut().iter_mut().zip(fresh) {
            n_links += distances.len();
            for (link, d) in container.neighbors_mut().iter_mut().zip(distances) {
                link.set_distance(d);
            }
        }
        debug!(n_links, "neighbor distances updated");
        Ok(())
    }

    /// Summarises cached neighbor distances by rank.
    ///
    /// For each rank in `0..config.num_ranks()` collects count, min, max and
    /// running mean over every container that has a link at that rank. With
    /// deviations enabled a second pass adds the standard deviation and the
    /// mean absolute deviation about that mean.
    pub fn neighbor_distance_statistics(&self, config: &StatisticsConfig) -> NeighborStatistics {
        let num_ranks = config.num_ranks();
        let mut summaries = vec![RunningSummary::new(); num_ranks];
        for container in self {
            for (summary, link) in summaries.iter_mut().zip(container.neighbors()) {
                summary.push(link.distance_from_point());
            }
        }

        let deviations = config.deviations().then(|| {
            let mut devs: Vec<Deviations> =
                summaries.iter().map(|s| Deviations::about(s.mean())).collect();
            for container in self {
                for (dev, link) in devs.iter_mut().zip(container.neighbors()) {
                    dev.push(link.distance_from_point());
                }
            }
            devs
        });

        let ranks = summaries
            .iter()
            .enumerate()
            .map(|(rank, s)| {
                let dev = deviations.as_ref().map(|d| d[rank]);
                RankStatistics {
                    rank,
                    count: s.count(),
                    min: s.min(),
                    max: s.max(),
                    mean: s.mean(),
                    std_dev: dev.map(|d| d.std_dev()),
                    mean_abs_deviation: dev.map(|d| d.mean_abs_deviation()),
                }
            })
            .collect();

        NeighborStatistics {
            n_points: self.len(),
            ranks,
        }
    }
}
