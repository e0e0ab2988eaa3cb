//! Command-line arguments for Monte Carlo runs

use clap::Parser;

/// Hard-disk and Lennard-Jones Monte Carlo with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the number of production sweeps
    #[arg(long)]
    pub sweeps: Option<usize>,

    /// Override the number of equilibration sweeps
    #[arg(long)]
    pub equilibration: Option<usize>,

    /// Override the maximum trial displacement
    #[arg(long)]
    pub step_size: Option<f64>,

    /// Seed for the random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the normalized g(r) table to this file
    #[arg(long)]
    pub gr_output: Option<String>,

    /// Write the final particle positions to this file
    #[arg(long)]
    pub positions_output: Option<String>,
}
