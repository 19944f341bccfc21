//! Command-line parsing for the MMM feature engineering tool.
//!
//! Argument parsing and command dispatch stay separate from the pipeline code;
//! `crate::app` turns these structs into library calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::decomp::DecomposerOptions;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mmmfe", version, about = "Marketing-mix feature engineering")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run feature engineering over a CSV dataset described by a JSON run file.
    Run(RunArgs),
    /// Run feature engineering over a synthetic weekly dataset.
    Demo(DemoArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Raw dataset (CSV, one row per date).
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Run file with the data spec, decomposition request and hyperparameters.
    #[arg(long, value_name = "JSON")]
    pub config: PathBuf,

    /// Holiday calendar (CSV with ds, holiday, country[, year]).
    #[arg(long, value_name = "CSV")]
    pub holidays: Option<PathBuf>,

    #[command(flatten)]
    pub export: ExportArgs,

    #[command(flatten)]
    pub decomposer: DecomposerArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct DemoArgs {
    /// Random seed for the synthetic dataset.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip the trend/season/holiday decomposition.
    #[arg(long)]
    pub no_decompose: bool,

    #[command(flatten)]
    pub export: ExportArgs,

    #[command(flatten)]
    pub decomposer: DecomposerArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Write the full transformed frame (dt_mod) to CSV.
    #[arg(long = "export-full", value_name = "CSV")]
    pub full: Option<PathBuf>,

    /// Write the windowed frame (dt_mod_roll_wind) to CSV.
    #[arg(long = "export-window", value_name = "CSV")]
    pub window: Option<PathBuf>,
}

/// Settings of the built-in regression decomposer.
#[derive(Debug, Clone, Args)]
pub struct DecomposerArgs {
    /// Number of trend changepoints.
    #[arg(long, default_value_t = 3)]
    pub changepoints: usize,

    /// Share of history in which changepoints are placed.
    #[arg(long, default_value_t = 0.8)]
    pub changepoint_range: f64,

    /// Fourier order of the yearly (season) component.
    #[arg(long, default_value_t = 10)]
    pub yearly_order: usize,

    /// Fourier order of the monthly component.
    #[arg(long, default_value_t = 5)]
    pub monthly_order: usize,

    /// Fourier order of the weekday component.
    #[arg(long, default_value_t = 3)]
    pub weekly_order: usize,
}

impl DecomposerArgs {
    pub fn options(&self) -> DecomposerOptions {
        DecomposerOptions {
            changepoints: self.changepoints,
            changepoint_range: self.changepoint_range,
            yearly_order: self.yearly_order,
            monthly_order: self.monthly_order,
            weekly_order: self.weekly_order,
        }
    }
}
