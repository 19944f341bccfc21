//! Feature-engineering orchestrator.
//!
//! `FeatureEngineering` borrows the caller's inputs, validates them once at
//! construction and then runs the pipeline on demand:
//!
//! 1. prepare the canonical frame (`prepare`)
//! 2. append decomposition columns when enabled (`crate::decomp`)
//! 3. fit spend → exposure response curves (`crate::fit`)
//! 4. cut the modelling window (`window`)
//!
//! Every step is a pure function of the stored inputs, so repeated runs on
//! the same instance produce identical results.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::decomp::{Decomposer, DecompositionError, RegressionDecomposer, active_components, check_output, detect_interval};
use crate::domain::{
    Column, ComponentKind, DATE_KEY, DEP_VAR_KEY, DecompositionConfig, Frame, HolidaysData, Hyperparameters, MmmData,
    SignConstraint, decomposition_config,
};
use crate::error::FeatureError;
use crate::fit::fit_exposures;

pub mod prepare;
pub mod result;
pub mod schema;
pub mod window;

pub use prepare::*;
pub use result::*;
pub use schema::*;
pub use window::*;

/// Runs feature engineering over borrowed inputs.
pub struct FeatureEngineering<'a> {
    mmm_data: &'a MmmData,
    hyperparameters: &'a Hyperparameters,
    holidays_data: Option<&'a HolidaysData>,
    decomposer: Box<dyn Decomposer + Send + Sync + 'a>,
    schema: Schema,
}

impl<'a> FeatureEngineering<'a> {
    /// Validate the inputs and resolve every declared column.
    ///
    /// `holidays_data = None` disables decomposition. The built-in
    /// `RegressionDecomposer` is used unless replaced via `with_decomposer`.
    pub fn new(
        mmm_data: &'a MmmData,
        hyperparameters: &'a Hyperparameters,
        holidays_data: Option<&'a HolidaysData>,
    ) -> Result<Self, FeatureError> {
        let spec = mmm_data.spec();
        spec.validate()?;
        let schema = resolve_schema(mmm_data.data(), spec)?;
        debug!(covariates = schema.covariates().len(), "resolved data schema");
        hyperparameters.validate()?;
        hyperparameters.check_alignment(spec)?;

        if let Some(holidays) = holidays_data {
            let declared = spec.declared_columns();
            for kind in holidays.components() {
                if let Some((name, role)) = declared.iter().find(|(name, _)| *name == kind.as_str()) {
                    return Err(FeatureError::spec(format!(
                        "{role} `{name}` collides with the `{kind}` decomposition column."
                    )));
                }
            }
        }

        Ok(Self {
            mmm_data,
            hyperparameters,
            holidays_data,
            decomposer: Box::new(RegressionDecomposer::default()),
            schema,
        })
    }

    /// Replace the decomposition model.
    pub fn with_decomposer(mut self, decomposer: impl Decomposer + Send + Sync + 'a) -> Self {
        self.decomposer = Box::new(decomposer);
        self
    }

    pub fn mmm_data(&self) -> &'a MmmData {
        self.mmm_data
    }

    pub fn hyperparameters(&self) -> &'a Hyperparameters {
        self.hyperparameters
    }

    pub fn holidays_data(&self) -> Option<&'a HolidaysData> {
        self.holidays_data
    }

    /// Canonical full-range frame, before decomposition and windowing.
    pub fn prepare_data(&self) -> Result<Frame, FeatureError> {
        prepare_frame(self.mmm_data.data(), &self.schema)
    }

    /// Run the full pipeline.
    pub fn perform_feature_engineering(&self) -> Result<FeaturizedMmmData, FeatureError> {
        let spec = self.mmm_data.spec();
        let mut dt_mod = self.prepare_data()?;

        let dates: Vec<NaiveDate> = dt_mod
            .dates(DATE_KEY)
            .map(<[NaiveDate]>::to_vec)
            .ok_or_else(|| FeatureError::data(format!("Prepared frame has no `{DATE_KEY}` date column.")))?;
        let interval = detect_interval(&dates)?;

        let config = decomposition_config(self.holidays_data);
        let active = active_components(&config, interval);
        let components = match (self.holidays_data, active.is_empty()) {
            (Some(holidays), false) => self.decompose(&mut dt_mod, &dates, holidays, &active)?,
            _ => {
                if let DecompositionConfig::Enabled { .. } = config {
                    debug!("no decomposition component applies at this cadence");
                }
                Vec::new()
            }
        };

        let exposure_fits = fit_exposures(&dt_mod, spec)?;

        let window = resolve_window(&dates, spec.window_start, spec.window_end)?;
        let dt_mod_roll_wind = dt_mod.slice(window.rows());

        info!(
            rows = dt_mod.n_rows(),
            window_rows = window.length,
            cols = dt_mod.n_cols(),
            interval = interval.label(),
            components = components.len(),
            "feature engineering complete"
        );

        Ok(FeaturizedMmmData {
            dt_mod,
            dt_mod_roll_wind,
            window,
            interval,
            components,
            exposure_fits,
        })
    }

    fn decompose(
        &self,
        frame: &mut Frame,
        dates: &[NaiveDate],
        holidays: &HolidaysData,
        active: &[(ComponentKind, SignConstraint)],
    ) -> Result<Vec<ComponentKind>, FeatureError> {
        let values = frame
            .numeric(DEP_VAR_KEY)
            .ok_or_else(|| FeatureError::data(format!("Prepared frame has no numeric `{DEP_VAR_KEY}` column.")))?;
        let series: Vec<(NaiveDate, f64)> = dates.iter().copied().zip(values.iter().copied()).collect();
        let kinds: Vec<ComponentKind> = active.iter().map(|&(kind, _)| kind).collect();
        let signs: Vec<SignConstraint> = active.iter().map(|&(_, sign)| sign).collect();

        let calendar = holidays.events_for_region();
        if calendar.is_empty() && kinds.contains(&ComponentKind::Holiday) {
            warn!(region = holidays.region(), "no holiday events for region; holiday component will be flat");
        }

        let mut output = self
            .decomposer
            .decompose(&series, &calendar, holidays.region(), &kinds, &signs)?;
        check_output(&output, &kinds, series.len())?;

        for &kind in &kinds {
            let column = output
                .remove(&kind)
                .ok_or(DecompositionError::Incomplete { component: kind })?;
            frame.push_column(Column::numeric(kind.as_str(), column))?;
        }
        debug!(components = ?kinds, "appended decomposition columns");
        Ok(kinds)
    }
}
