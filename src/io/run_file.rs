//! JSON run file.
//!
//! A run file bundles everything `mmmfe run` needs besides the data itself:
//!
//! ```json
//! {
//!   "data_spec": { "dep_var": "revenue", "dep_var_type": "revenue", "date_var": "DATE", ... },
//!   "decomposition": { "components": ["trend", "season", "holiday"], "region": "US" },
//!   "hyperparameters": {
//!     "adstock": "geometric",
//!     "lambda": [0, 1],
//!     "train_size": [0.5, 0.8],
//!     "channels": { "tv_S": { "alphas": [0.5, 3], "gammas": [0.3, 1], "thetas": [0.3, 0.8] } }
//!   }
//! }
//! ```
//!
//! Component, sign and adstock names go through `FromStr`, so unknown names
//! surface as specification errors rather than serde errors.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AdstockType, ChannelHyperparameters, ComponentKind, DataSpec, HolidayEvent, HolidaysData, Hyperparameters,
    ParamRange, SignConstraint,
};
use crate::error::{AppError, FeatureError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub data_spec: DataSpec,
    #[serde(default)]
    pub decomposition: Option<DecompositionSection>,
    pub hyperparameters: HyperparameterSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionSection {
    pub components: Vec<String>,
    pub region: String,
    #[serde(default)]
    pub signs: Vec<String>,
}

impl DecompositionSection {
    /// Combine with a calendar into a validated holiday spec.
    pub fn into_holidays(self, events: Vec<HolidayEvent>) -> Result<HolidaysData, FeatureError> {
        let components = self
            .components
            .iter()
            .map(|c| c.parse::<ComponentKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let signs = self
            .signs
            .iter()
            .map(|s| s.parse::<SignConstraint>())
            .collect::<Result<Vec<_>, _>>()?;
        HolidaysData::new(events, components, self.region, signs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperparameterSection {
    pub adstock: String,
    pub lambda: ParamRange,
    pub train_size: ParamRange,
    pub channels: BTreeMap<String, ChannelHyperparameters>,
}

impl HyperparameterSection {
    pub fn into_registry(self) -> Result<Hyperparameters, FeatureError> {
        Ok(Hyperparameters {
            channels: self.channels,
            adstock: self.adstock.parse::<AdstockType>()?,
            lambda: self.lambda,
            train_size: self.train_size,
        })
    }
}

/// Read a run file.
pub fn read_run_file(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open run file '{}': {e}", path.display())))?;
    let run: RunFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid run file JSON: {e}")))?;
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const RUN: &str = r#"{
        "data_spec": {
            "dep_var": "revenue",
            "dep_var_type": "revenue",
            "date_var": "DATE",
            "context_vars": ["custom_context"],
            "paid_media_spends": ["tv_S"],
            "window_start": "01/03/2020",
            "window_end": "2021-06-30"
        },
        "decomposition": { "components": ["trend", "Season"], "region": "US", "signs": ["default", "positive"] },
        "hyperparameters": {
            "adstock": "geometric",
            "lambda": [0, 1],
            "train_size": [0.5, 0.8],
            "channels": { "tv_S": { "alphas": [0.5, 3], "gammas": [0.3, 1], "thetas": [0.3, 0.8] } }
        }
    }"#;

    #[test]
    fn parses_full_run_file() {
        let run: RunFile = serde_json::from_str(RUN).unwrap();
        assert_eq!(run.data_spec.window_start, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(run.data_spec.window_end, NaiveDate::from_ymd_opt(2021, 6, 30));

        let holidays = run.decomposition.unwrap().into_holidays(vec![]).unwrap();
        assert_eq!(holidays.components(), &[ComponentKind::Trend, ComponentKind::Season]);
        assert_eq!(holidays.signs()[1], SignConstraint::Positive);

        let registry = run.hyperparameters.into_registry().unwrap();
        assert_eq!(registry.adstock, AdstockType::Geometric);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn unknown_names_are_specification_errors() {
        let section = DecompositionSection {
            components: vec!["trend".to_string(), "lunar".to_string()],
            region: "US".to_string(),
            signs: vec![],
        };
        assert!(matches!(
            section.into_holidays(vec![]),
            Err(FeatureError::InvalidSpecification(_))
        ));

        let mut run: RunFile = serde_json::from_str(RUN).unwrap();
        run.hyperparameters.adstock = "exponential".to_string();
        assert!(matches!(
            run.hyperparameters.into_registry(),
            Err(FeatureError::InvalidSpecification(_))
        ));
    }
}
