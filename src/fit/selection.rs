//! Spend → exposure model selection (linear vs Michaelis–Menten).
//!
//! For each paid-media channel whose exposure column differs from its spend
//! column we fit both curves and keep the one with the higher R².
//! The linear model wins ties (fewer parameters).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{DataSpec, Frame};
use crate::error::FeatureError;
use crate::fit::fitter::{CurveFit, fit_linear, fit_michaelis_menten};
use crate::fit::km_grid::{KM_STEPS, km_grid};
use crate::models::ResponseKind;

/// Fitted spend → exposure relationship for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureFit {
    pub spend_var: String,
    pub exposure_var: String,
    pub selected: ResponseKind,
    pub linear: CurveFit,
    pub michaelis_menten: Option<CurveFit>,
}

impl ExposureFit {
    /// The curve that was selected.
    pub fn best(&self) -> &CurveFit {
        match (&self.selected, &self.michaelis_menten) {
            (ResponseKind::MichaelisMenten, Some(mm)) => mm,
            _ => &self.linear,
        }
    }
}

/// Fit every spend/exposure pair with distinct columns.
///
/// Columns are read from `frame`, which must already hold them as numeric.
pub fn fit_exposures(frame: &Frame, spec: &DataSpec) -> Result<Vec<ExposureFit>, FeatureError> {
    let mut out = Vec::new();

    for (spend_var, exposure_var) in spec.paid_media_spends.iter().zip(spec.exposure_vars()) {
        if spend_var == exposure_var {
            continue;
        }
        let spend = numeric_column(frame, spend_var)?;
        let exposure = numeric_column(frame, exposure_var)?;

        if !spend.iter().any(|&s| s > 0.0) {
            warn!(channel = %spend_var, "spend is zero everywhere; skipping exposure fit");
            continue;
        }

        let linear = fit_linear(spend, exposure)?;
        let grid = km_grid(spend, KM_STEPS)?;
        let michaelis_menten = fit_michaelis_menten(spend, exposure, &grid)?;

        let selected = match &michaelis_menten {
            Some(mm) if mm.rsq > linear.rsq => ResponseKind::MichaelisMenten,
            _ => ResponseKind::Linear,
        };
        debug!(
            spend = %spend_var,
            exposure = %exposure_var,
            rsq_linear = linear.rsq,
            rsq_mm = michaelis_menten.as_ref().map(|m| m.rsq),
            selected = selected.display_name(),
            "exposure fit"
        );

        out.push(ExposureFit {
            spend_var: spend_var.clone(),
            exposure_var: exposure_var.clone(),
            selected,
            linear,
            michaelis_menten,
        });
    }

    Ok(out)
}

fn numeric_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a [f64], FeatureError> {
    frame
        .numeric(name)
        .ok_or_else(|| FeatureError::data(format!("Column `{name}` is not numeric.")))
}
