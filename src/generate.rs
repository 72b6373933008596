//! Generate command: random cloud, neighbor search, statistics report.

use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use nebula_cloud::{DistanceMetric, NeighborStatistics, PointCloud, VectorPoint};

use crate::cli::GenerateArgs;
use crate::config::{self, NebulaConfig};
use crate::convert;

/// Run the generate pipeline.
pub fn run(args: GenerateArgs) -> Result<()> {
    let _cmd = info_span!("generate").entered();
    let config = config::load(&args.config)?;

    let (cloud, _metric) = searched_cloud(&config, args.seed)?;

    let stats_cfg = convert::build_statistics_config(&config.report, config.search.k);
    let stats = cloud.neighbor_distance_statistics(&stats_cfg);
    print!("{stats}");

    if let Some(path) = &args.output {
        write_report(path, &stats)?;
        info!(path = %path.display(), "JSON report written");
    }
    Ok(())
}

/// Builds the random cloud described by `config` and fills its neighbor lists.
///
/// `seed` overrides the config seed; with neither the RNG is seeded from the OS.
pub fn searched_cloud(
    config: &NebulaConfig,
    seed: Option<u64>,
) -> Result<(PointCloud<VectorPoint>, DistanceMetric<VectorPoint>)> {
    let bounds = convert::build_bounds(&config.cloud)?;
    let search = convert::build_search(&config.search)?;

    let mut rng = match seed.or(config.seed) {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let mut cloud = PointCloud::new();
    cloud
        .generate_random_cloud(config.cloud.n_points, &bounds, &mut rng)
        .context("failed to generate random cloud")?;
    info!(
        n_points = cloud.len(),
        dimension = bounds.dimension(),
        "random cloud generated"
    );

    let mut metric = convert::build_metric(&config.metric, &bounds, &cloud)?;
    search
        .search(&mut cloud, &mut metric, config.search.k)
        .with_context(|| format!("neighbor search with k = {} failed", config.search.k))?;
    info!(k = config.search.k, parallel = config.search.parallel, "neighbor search complete");

    Ok((cloud, metric))
}

fn write_report(path: &Path, stats: &NeighborStatistics) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).context("failed to serialise report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))
}
