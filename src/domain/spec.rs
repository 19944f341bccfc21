//! Data specification and the MMM data container.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::frame::RawDataset;
use crate::domain::types::{ColumnRole, DEP_VAR_KEY, DATE_KEY, DepVarType};
use crate::error::FeatureError;

/// Which columns play which semantic role, plus the modeling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    pub dep_var: String,
    pub dep_var_type: DepVarType,
    pub date_var: String,
    #[serde(default)]
    pub context_vars: Vec<String>,
    #[serde(default)]
    pub paid_media_spends: Vec<String>,
    /// Exposure columns, parallel to `paid_media_spends`. Empty means "same as spends".
    #[serde(default)]
    pub paid_media_vars: Vec<String>,
    #[serde(default)]
    pub organic_vars: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub window_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub window_end: Option<NaiveDate>,
}

fn deserialize_opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| crate::io::parse_date(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

impl DataSpec {
    /// Exposure column for each spend column, in spend order.
    pub fn exposure_vars(&self) -> &[String] {
        if self.paid_media_vars.is_empty() {
            &self.paid_media_spends
        } else {
            &self.paid_media_vars
        }
    }

    /// Channels that carry transform hyperparameters: paid spends then organic.
    pub fn channels(&self) -> Vec<&str> {
        self.paid_media_spends
            .iter()
            .chain(self.organic_vars.iter())
            .map(String::as_str)
            .collect()
    }

    /// Every declared name with its role, in canonical frame order.
    ///
    /// Exposure columns that repeat their spend column are listed once.
    pub fn declared_columns(&self) -> Vec<(&str, ColumnRole)> {
        let mut out = vec![
            (self.date_var.as_str(), ColumnRole::Date),
            (self.dep_var.as_str(), ColumnRole::DependentVariable),
        ];
        out.extend(self.context_vars.iter().map(|c| (c.as_str(), ColumnRole::Context)));
        out.extend(
            self.paid_media_spends
                .iter()
                .map(|c| (c.as_str(), ColumnRole::PaidMediaSpend)),
        );
        for (spend, exposure) in self.paid_media_spends.iter().zip(self.exposure_vars()) {
            if exposure != spend {
                out.push((exposure.as_str(), ColumnRole::PaidMediaExposure));
            }
        }
        out.extend(self.organic_vars.iter().map(|c| (c.as_str(), ColumnRole::Organic)));
        out
    }

    /// Structural checks that do not need the data.
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.dep_var.trim().is_empty() || self.date_var.trim().is_empty() {
            return Err(FeatureError::spec("`dep_var` and `date_var` must be non-empty."));
        }
        if !self.paid_media_vars.is_empty() && self.paid_media_vars.len() != self.paid_media_spends.len() {
            return Err(FeatureError::spec(format!(
                "`paid_media_vars` has {} entries but `paid_media_spends` has {}.",
                self.paid_media_vars.len(),
                self.paid_media_spends.len()
            )));
        }
        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start > end {
                return Err(FeatureError::spec(format!(
                    "window_start ({start}) is after window_end ({end})."
                )));
            }
        }

        let declared = self.declared_columns();
        for (i, (name, role)) in declared.iter().enumerate() {
            if let Some((_, other)) = declared[..i].iter().find(|(prev, _)| prev == name) {
                return Err(FeatureError::spec(format!(
                    "Column `{name}` is declared both as {other} and as {role}."
                )));
            }
            let is_covariate = !matches!(role, ColumnRole::Date | ColumnRole::DependentVariable);
            if is_covariate && (*name == DATE_KEY || *name == DEP_VAR_KEY) {
                return Err(FeatureError::spec(format!(
                    "Column `{name}` collides with a canonical key; rename it."
                )));
            }
        }
        if self.dep_var == DATE_KEY || self.date_var == DEP_VAR_KEY {
            return Err(FeatureError::spec("Date and dependent variable names collide with canonical keys."));
        }
        Ok(())
    }
}

/// Raw dataset and its data specification, owned together.
///
/// Immutable after construction; the feature engineering stage only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct MmmData {
    data: RawDataset,
    spec: DataSpec,
}

impl MmmData {
    pub fn new(data: RawDataset, spec: DataSpec) -> Self {
        Self { data, spec }
    }

    pub fn data(&self) -> &RawDataset {
        &self.data
    }

    pub fn spec(&self) -> &DataSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> DataSpec {
        DataSpec {
            dep_var: "revenue".to_string(),
            dep_var_type: DepVarType::Revenue,
            date_var: "DATE".to_string(),
            context_vars: vec!["custom_context".to_string()],
            paid_media_spends: vec!["tv_S".to_string(), "facebook_S".to_string()],
            paid_media_vars: vec!["tv_S".to_string(), "facebook_I".to_string()],
            organic_vars: vec!["newsletter".to_string()],
            window_start: None,
            window_end: None,
        }
    }

    #[test]
    fn declared_columns_list_shared_spend_exposure_once() {
        let s = spec();
        let names: Vec<&str> = s.declared_columns().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["DATE", "revenue", "custom_context", "tv_S", "facebook_S", "facebook_I", "newsletter"]
        );
    }

    #[test]
    fn validate_rejects_role_overlap_and_ragged_exposures() {
        let mut s = spec();
        s.organic_vars.push("custom_context".to_string());
        assert!(matches!(s.validate(), Err(FeatureError::InvalidSpecification(_))));

        let mut s = spec();
        s.paid_media_vars.pop();
        assert!(matches!(s.validate(), Err(FeatureError::InvalidSpecification(_))));
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let mut s = spec();
        s.window_start = NaiveDate::from_ymd_opt(2022, 1, 1);
        s.window_end = NaiveDate::from_ymd_opt(2021, 1, 1);
        assert!(matches!(s.validate(), Err(FeatureError::InvalidSpecification(_))));
        assert!(spec().validate().is_ok());
    }
}
