//! Neighbors command: print the neighbor lists of the first points.

use std::fmt::Write as _;

use anyhow::Result;
use tracing::info_span;

use nebula_cloud::{DistanceMetric, PointContainer, VectorPoint};

use crate::cli::NeighborsArgs;
use crate::config;
use crate::generate::searched_cloud;

/// Run the neighbors listing.
pub fn run(args: NeighborsArgs) -> Result<()> {
    let _cmd = info_span!("neighbors").entered();
    let config = config::load(&args.config)?;
    let (cloud, metric) = searched_cloud(&config, args.seed)?;

    for container in cloud.iter().take(args.limit) {
        println!("{}", describe(container, &metric)?);
    }
    Ok(())
}

/// One line per point: slot, coordinates (relative ones when the metric has
/// bounds) and `target:distance` pairs, nearest first.
fn describe(
    container: &PointContainer<VectorPoint>,
    metric: &DistanceMetric<VectorPoint>,
) -> Result<String> {
    let coords = match metric.min() {
        Some(_) => metric.relative_coordinates(&container.coordinates())?,
        None => container.coordinates().into_owned(),
    };
    let coords: Vec<String> = coords.iter().map(|c| format!("{c:.4}")).collect();

    let mut line = format!("{:>6} [{}]", container.index(), coords.join(", "));
    for link in container.neighbors() {
        write!(line, " {}:{:.6}", link.target(), link.distance_from_point())?;
    }
    Ok(line)
}
