//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates the inputs
//! - runs feature engineering
//! - prints the summary and writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, ExportArgs, RunArgs};
use crate::data::generate_sample;
use crate::engineering::FeaturizedMmmData;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mmmfe` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let inputs = pipeline::load_run_inputs(&args)?;
    let result = pipeline::run_feature_engineering(&inputs, args.decomposer.options())?;
    finish(&result, &inputs, &args.export)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let sample = generate_sample(args.seed)?;
    let inputs = pipeline::demo_inputs(sample, !args.no_decompose)?;
    let result = pipeline::run_feature_engineering(&inputs, args.decomposer.options())?;
    finish(&result, &inputs, &args.export)
}

fn finish(result: &FeaturizedMmmData, inputs: &pipeline::RunInputs, export: &ExportArgs) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(result, inputs.mmm_data.spec())
    );

    if let Some(path) = &export.full {
        crate::io::write_frame_csv(path, &result.dt_mod)?;
    }
    if let Some(path) = &export.window {
        crate::io::write_frame_csv(path, &result.dt_mod_roll_wind)?;
    }
    Ok(())
}
