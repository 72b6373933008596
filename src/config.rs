use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level Nebula configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NebulaConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Random cloud settings.
    #[serde(default)]
    pub cloud: CloudToml,

    /// Distance metric settings.
    #[serde(default)]
    pub metric: MetricToml,

    /// Neighbor search settings.
    #[serde(default)]
    pub search: SearchToml,

    /// Statistics report settings.
    #[serde(default)]
    pub report: ReportToml,
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<NebulaConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Sampling box of the random cloud. Omitted bounds default to the unit cube.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudToml {
    #[serde(default = "default_n_points")]
    pub n_points: usize,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default)]
    pub min: Option<Vec<f64>>,
    #[serde(default)]
    pub max: Option<Vec<f64>>,
}

impl Default for CloudToml {
    fn default() -> Self {
        Self {
            n_points: default_n_points(),
            dimension: default_dimension(),
            min: None,
            max: None,
        }
    }
}

fn default_n_points() -> usize {
    1000
}
fn default_dimension() -> usize {
    3
}

/// Length scales and normalization bounds.
///
/// `auto_scale` estimates length scales from the generated cloud and is
/// mutually exclusive with explicit `length_scales`.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricToml {
    #[serde(default)]
    pub length_scales: Option<Vec<f64>>,
    #[serde(default)]
    pub auto_scale: bool,
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchToml {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for SearchToml {
    fn default() -> Self {
        Self {
            k: default_k(),
            parallel: false,
        }
    }
}

fn default_k() -> usize {
    5
}

/// `ranks` defaults to the search `k`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportToml {
    #[serde(default)]
    pub ranks: Option<usize>,
    #[serde(default = "default_true")]
    pub deviations: bool,
}

impl Default for ReportToml {
    fn default() -> Self {
        Self {
            ranks: None,
            deviations: true,
        }
    }
}

fn default_true() -> bool {
    true
}
