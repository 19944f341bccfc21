//! Shared pipeline used by both `run` and `demo`.
//!
//! load inputs -> build orchestrator -> perform feature engineering
//!
//! The subcommands then only differ in where their inputs come from.

use tracing::info;

use crate::cli::RunArgs;
use crate::data::{SAMPLE_REGION, SampleData};
use crate::decomp::{DecomposerOptions, RegressionDecomposer};
use crate::domain::{ComponentKind, HolidaysData, Hyperparameters, MmmData};
use crate::engineering::{FeatureEngineering, FeaturizedMmmData};
use crate::error::AppError;
use crate::io::{load_frame_csv, load_holidays_csv, read_run_file};

/// Everything a feature engineering run consumes.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub mmm_data: MmmData,
    pub hyperparameters: Hyperparameters,
    pub holidays: Option<HolidaysData>,
}

/// Load the inputs of `mmmfe run` from disk.
pub fn load_run_inputs(args: &RunArgs) -> Result<RunInputs, AppError> {
    let run = read_run_file(&args.config)?;
    let data = load_frame_csv(&args.data)?;

    let events = match &args.holidays {
        Some(path) => load_holidays_csv(path)?,
        None => Vec::new(),
    };
    let holidays = match run.decomposition {
        Some(section) => Some(section.into_holidays(events)?),
        None => None,
    };

    Ok(RunInputs {
        mmm_data: MmmData::new(data, run.data_spec),
        hyperparameters: run.hyperparameters.into_registry()?,
        holidays,
    })
}

/// Inputs of `mmmfe demo`: the synthetic sample, optionally decomposed into
/// trend, season and holiday.
pub fn demo_inputs(sample: SampleData, decompose: bool) -> Result<RunInputs, AppError> {
    let holidays = if decompose {
        let components = vec![ComponentKind::Trend, ComponentKind::Season, ComponentKind::Holiday];
        Some(HolidaysData::new(sample.holidays, components, SAMPLE_REGION, Vec::new())?)
    } else {
        None
    };
    Ok(RunInputs {
        mmm_data: sample.mmm_data,
        hyperparameters: sample.hyperparameters,
        holidays,
    })
}

/// Run feature engineering with the built-in decomposer.
pub fn run_feature_engineering(
    inputs: &RunInputs,
    options: DecomposerOptions,
) -> Result<FeaturizedMmmData, AppError> {
    let engine = FeatureEngineering::new(&inputs.mmm_data, &inputs.hyperparameters, inputs.holidays.as_ref())?
        .with_decomposer(RegressionDecomposer::new(options));
    let result = engine.perform_feature_engineering()?;
    info!(
        rows = result.dt_mod.n_rows(),
        window_rows = result.dt_mod_roll_wind.n_rows(),
        "run finished"
    );
    Ok(result)
}
