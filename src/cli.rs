use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nebula point-cloud neighbor explorer.
#[derive(Parser)]
#[command(
    name = "nebula",
    version,
    about = "Random point clouds and brute-force nearest-neighbor statistics"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate a random cloud, search neighbors and report distance statistics.
    Generate(GenerateArgs),
    /// Generate a random cloud, search neighbors and print the neighbor lists.
    Neighbors(NeighborsArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "nebula.toml")]
    pub config: PathBuf,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Also write the statistics report as JSON to this path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `neighbors` subcommand.
#[derive(clap::Args)]
pub struct NeighborsArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "nebula.toml")]
    pub config: PathBuf,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of points to print.
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}
