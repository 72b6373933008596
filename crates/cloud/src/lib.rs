//! Point clouds with brute-force k-nearest-neighbor search.
//!
//! A [`PointCloud`] holds values of any type implementing [`PointAdapter`],
//! each wrapped in a [`PointContainer`] that carries an identity, a cached
//! distance and a list of [`NeighborLink`]s. A [`DistanceMetric`] measures and
//! ranks points:
//!
//! | Setting | Effect |
//! |---------|--------|
//! | none | Euclidean distance over the coordinates |
//! | length scales | `sqrt(Σ ((a[j] - b[j]) / s[j])²)` |
//! | custom function | replaces the default distance entirely |
//! | bounds | drive [`DistanceMetric::relative_coordinates`] |
//!
//! The same settings exist for the output space of point types that carry an
//! output vector (see [`SamplePoint`]).
//!
//! # Quick start
//!
//! ```
//! use nebula_cloud::{Bounds, DistanceMetric, PointCloud, StatisticsConfig, VectorPoint};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut cloud: PointCloud<VectorPoint> = PointCloud::new();
//! cloud.generate_random_cloud(200, &Bounds::unit(3), &mut rng).unwrap();
//!
//! let mut metric = DistanceMetric::new();
//! cloud.find_closest_points(&mut metric, 4).unwrap();
//!
//! let stats = cloud.neighbor_distance_statistics(&StatisticsConfig::new(4));
//! assert_eq!(stats.rank(0).unwrap().count(), 200);
//! ```
//!
//! # Architecture
//!
//! ```text
//! PointCloud::find_closest_points()
//!   ├─ validate k
//!   └─ for each point
//!        ├─ DistanceMetric::set_reference_point()
//!        ├─ DistanceMetric::sort_using_cached_distance()   (metric.rs)
//!        └─ PointContainer::assign_neighbors()             (container.rs)
//!
//! PointCloud::par_find_closest_points()
//!   ├─ rayon task per point → BoundedNeighbors             (select.rs)
//!   └─ assign all lists
//!
//! PointCloud::neighbor_distance_statistics()
//!   ├─ RunningSummary per rank                             (nebula-stats)
//!   └─ Deviations per rank (optional second pass)
//! ```
//!
//! Mutation needs `&mut PointCloud`; share a cloud across threads behind a
//! `std::sync::RwLock`.

pub mod bounds;
pub mod cloud;
pub mod container;
pub mod error;
pub mod knn;
pub mod metric;
pub mod point;
pub mod random;
pub mod select;
pub mod statistics;

pub(crate) mod distance;

pub use bounds::{Bounds, estimate_length_scales};
pub use cloud::PointCloud;
pub use container::{NeighborLink, PointContainer, PointHandle, PointId};
pub use error::{CloudError, ErrorKind};
pub use knn::{BruteForce, NeighborSearch, ParallelBruteForce};
pub use metric::{DistanceFn, DistanceMetric};
pub use point::{PointAdapter, SamplePoint, VectorPoint};
pub use random::{random_point, random_point_in, random_unit_point};
pub use select::BoundedNeighbors;
pub use statistics::{NeighborStatistics, RankStatistics, StatisticsConfig};
