//! Channel hyperparameter registry.
//!
//! The registry belongs to the transform search that runs after feature
//! engineering. Here it is only validated for internal consistency and checked
//! against the channels declared in the data specification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::spec::DataSpec;
use crate::domain::types::AdstockType;
use crate::error::FeatureError;

/// A closed numeric range `[low, high]`; `low == high` is a fixed value.
///
/// Serialized as `[low, high]` or `[value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ParamRange {
    low: f64,
    high: f64,
}

impl ParamRange {
    pub fn new(low: f64, high: f64) -> Result<Self, FeatureError> {
        if !(low.is_finite() && high.is_finite()) {
            return Err(FeatureError::spec(format!("Range [{low}, {high}] must be finite.")));
        }
        if low > high {
            return Err(FeatureError::spec(format!("Range [{low}, {high}] is inverted.")));
        }
        Ok(Self { low, high })
    }

    pub fn fixed(value: f64) -> Result<Self, FeatureError> {
        Self::new(value, value)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn is_fixed(&self) -> bool {
        self.low == self.high
    }

    fn check_within(&self, name: &str, channel: &str, min: f64, max: f64, max_inclusive: bool) -> Result<(), FeatureError> {
        let above = if max_inclusive { self.high > max } else { self.high >= max };
        if self.low < min || above {
            let close = if max_inclusive { ']' } else { ')' };
            return Err(FeatureError::spec(format!(
                "`{name}` for `{channel}` is [{}, {}], must lie within [{min}, {max}{close}.",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for ParamRange {
    type Error = FeatureError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [v] => ParamRange::fixed(*v),
            [lo, hi] => ParamRange::new(*lo, *hi),
            other => Err(FeatureError::spec(format!(
                "A range needs one or two values, got {}.",
                other.len()
            ))),
        }
    }
}

impl From<ParamRange> for Vec<f64> {
    fn from(range: ParamRange) -> Self {
        if range.is_fixed() {
            vec![range.low]
        } else {
            vec![range.low, range.high]
        }
    }
}

/// Transform parameter ranges for one channel.
///
/// Geometric adstock uses `thetas` (decay); Weibull adstock uses `shapes` and
/// `scales`. `alphas`/`gammas` shape the saturation curve for every family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelHyperparameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphas: Option<ParamRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gammas: Option<ParamRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thetas: Option<ParamRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<ParamRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scales: Option<ParamRange>,
}

impl ChannelHyperparameters {
    /// Geometric-adstock channel.
    pub fn geometric(alphas: ParamRange, gammas: ParamRange, thetas: ParamRange) -> Self {
        Self {
            alphas: Some(alphas),
            gammas: Some(gammas),
            thetas: Some(thetas),
            ..Self::default()
        }
    }

    /// Weibull-adstock channel.
    pub fn weibull(alphas: ParamRange, gammas: ParamRange, shapes: ParamRange, scales: ParamRange) -> Self {
        Self {
            alphas: Some(alphas),
            gammas: Some(gammas),
            shapes: Some(shapes),
            scales: Some(scales),
            ..Self::default()
        }
    }

    fn validate(&self, channel: &str, adstock: AdstockType) -> Result<(), FeatureError> {
        let require = |range: Option<ParamRange>, name: &str| {
            range.ok_or_else(|| {
                FeatureError::spec(format!(
                    "Channel `{channel}` is missing `{name}` (required for {} adstock).",
                    adstock.as_str()
                ))
            })
        };

        require(self.alphas, "alphas")?.check_within("alphas", channel, 0.0, f64::MAX, true)?;
        require(self.gammas, "gammas")?.check_within("gammas", channel, 0.0, 1.0, true)?;

        if adstock.is_weibull() {
            require(self.shapes, "shapes")?.check_within("shapes", channel, 0.0, 20.0, true)?;
            require(self.scales, "scales")?.check_within("scales", channel, 0.0, 1.0, true)?;
        } else {
            require(self.thetas, "thetas")?.check_within("thetas", channel, 0.0, 1.0, false)?;
        }
        Ok(())
    }
}

/// Per-channel ranges plus global search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub channels: BTreeMap<String, ChannelHyperparameters>,
    pub adstock: AdstockType,
    pub lambda: ParamRange,
    pub train_size: ParamRange,
}

impl Hyperparameters {
    /// Internal consistency: required ranges present and within their domains.
    pub fn validate(&self) -> Result<(), FeatureError> {
        for (channel, hyps) in &self.channels {
            hyps.validate(channel, self.adstock)?;
        }
        self.lambda
            .check_within("lambda", "global", 0.0, f64::MAX, true)?;
        self.train_size
            .check_within("train_size", "global", 0.1, 1.0, true)?;
        Ok(())
    }

    /// Registry keys must cover every declared paid/organic channel.
    ///
    /// Extra keys are allowed and logged.
    pub fn check_alignment(&self, spec: &DataSpec) -> Result<(), FeatureError> {
        let channels = spec.channels();
        let missing: Vec<&str> = channels
            .iter()
            .copied()
            .filter(|c| !self.channels.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(FeatureError::spec(format!(
                "No hyperparameters for channel(s): {}.",
                missing.join(", ")
            )));
        }

        for extra in self.channels.keys().filter(|k| !channels.contains(&k.as_str())) {
            warn!(channel = %extra, "hyperparameters given for a channel not declared in the data spec");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DepVarType;

    fn r(lo: f64, hi: f64) -> ParamRange {
        ParamRange::new(lo, hi).unwrap()
    }

    fn registry() -> Hyperparameters {
        let mut channels = BTreeMap::new();
        channels.insert(
            "tv_S".to_string(),
            ChannelHyperparameters::geometric(r(0.5, 3.0), r(0.3, 1.0), r(0.3, 0.8)),
        );
        channels.insert(
            "newsletter".to_string(),
            ChannelHyperparameters::geometric(r(0.5, 3.0), r(0.3, 1.0), r(0.1, 0.4)),
        );
        Hyperparameters {
            channels,
            adstock: AdstockType::Geometric,
            lambda: r(0.0, 1.0),
            train_size: r(0.5, 0.8),
        }
    }

    fn spec(spends: &[&str]) -> DataSpec {
        DataSpec {
            dep_var: "revenue".to_string(),
            dep_var_type: DepVarType::Revenue,
            date_var: "DATE".to_string(),
            context_vars: vec![],
            paid_media_spends: spends.iter().map(|s| s.to_string()).collect(),
            paid_media_vars: vec![],
            organic_vars: vec!["newsletter".to_string()],
            window_start: None,
            window_end: None,
        }
    }

    #[test]
    fn range_parses_from_one_or_two_values() {
        let fixed: ParamRange = serde_json::from_str("[0.3]").unwrap();
        assert!(fixed.is_fixed());
        let range: ParamRange = serde_json::from_str("[0.1, 0.4]").unwrap();
        assert_eq!((range.low(), range.high()), (0.1, 0.4));
        assert!(serde_json::from_str::<ParamRange>("[0.4, 0.1]").is_err());
        assert!(serde_json::from_str::<ParamRange>("[]").is_err());
    }

    #[test]
    fn validate_checks_domains() {
        assert!(registry().validate().is_ok());

        let mut bad = registry();
        bad.channels.get_mut("tv_S").unwrap().thetas = Some(r(0.3, 1.0));
        assert!(matches!(bad.validate(), Err(FeatureError::InvalidSpecification(_))));

        let mut weibull = registry();
        weibull.adstock = AdstockType::WeibullPdf;
        assert!(matches!(weibull.validate(), Err(FeatureError::InvalidSpecification(_))));

        let mut small_train = registry();
        small_train.train_size = r(0.05, 0.8);
        assert!(small_train.validate().is_err());
    }

    #[test]
    fn alignment_requires_superset() {
        let hyps = registry();
        assert!(hyps.check_alignment(&spec(&["tv_S"])).is_ok());
        assert!(hyps.check_alignment(&spec(&[])).is_ok());
        let err = hyps.check_alignment(&spec(&["tv_S", "facebook_S"])).unwrap_err();
        assert!(err.to_string().contains("facebook_S"));
    }
}
