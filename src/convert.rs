//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use nebula_cloud::{
    Bounds, BruteForce, DistanceMetric, NeighborSearch, ParallelBruteForce, PointCloud,
    StatisticsConfig, VectorPoint,
};

use crate::config::*;

/// Builds the sampling [`Bounds`] of the random cloud.
///
/// Missing `min`/`max` default to 0 and 1 on every axis.
pub fn build_bounds(cloud: &CloudToml) -> Result<Bounds> {
    if cloud.dimension == 0 {
        bail!("[cloud].dimension must be at least 1");
    }
    let min = axis_values(cloud.min.as_deref(), cloud.dimension, 0.0, "min")?;
    let max = axis_values(cloud.max.as_deref(), cloud.dimension, 1.0, "max")?;
    let bounds = Bounds::new(min, max)?;
    bounds.validate().context("invalid [cloud] bounds")?;
    Ok(bounds)
}

fn axis_values(
    values: Option<&[f64]>,
    dimension: usize,
    default: f64,
    name: &str,
) -> Result<Vec<f64>> {
    match values {
        None => Ok(vec![default; dimension]),
        Some(v) if v.len() == dimension => Ok(v.to_vec()),
        Some(v) => bail!(
            "[cloud].{name} has {} values but dimension is {dimension}",
            v.len()
        ),
    }
}

/// Builds a [`DistanceMetric`] from the TOML metric configuration.
///
/// `auto_scale` estimates the length scales from `cloud`; `normalize` sets
/// the metric bounds to the sampling box.
pub fn build_metric(
    metric: &MetricToml,
    bounds: &Bounds,
    cloud: &PointCloud<VectorPoint>,
) -> Result<DistanceMetric<VectorPoint>> {
    let scales = match (&metric.length_scales, metric.auto_scale) {
        (Some(_), true) => bail!("[metric] sets both length_scales and auto_scale"),
        (Some(s), false) => Some(check_length_scales(s, bounds.dimension())?),
        (None, true) => Some(
            cloud
                .length_scales()
                .context("failed to estimate length scales")?,
        ),
        (None, false) => None,
    };

    let mut cfg = DistanceMetric::new();
    if let Some(s) = scales {
        cfg = cfg.with_length_scales(s);
    }
    if metric.normalize {
        cfg = cfg.with_bounds(bounds.clone());
    }
    Ok(cfg)
}

fn check_length_scales(scales: &[f64], dimension: usize) -> Result<Vec<f64>> {
    if scales.len() != dimension {
        bail!(
            "[metric].length_scales has {} values but dimension is {dimension}",
            scales.len()
        );
    }
    if let Some(bad) = scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
        bail!("[metric].length_scales must be finite and positive, got {bad}");
    }
    Ok(scales.to_vec())
}

/// Selects the neighbor search strategy.
pub fn build_search(search: &SearchToml) -> Result<Box<dyn NeighborSearch<VectorPoint>>> {
    if search.k == 0 {
        bail!("[search].k must be at least 1");
    }
    Ok(if search.parallel {
        Box::new(ParallelBruteForce)
    } else {
        Box::new(BruteForce)
    })
}

/// Builds a [`StatisticsConfig`]; the rank count defaults to `k`.
pub fn build_statistics_config(report: &ReportToml, k: usize) -> StatisticsConfig {
    StatisticsConfig::new(report.ranks.unwrap_or(k)).with_deviations(report.deviations)
}
