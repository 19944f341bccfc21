//! Shared domain enums and canonical names.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - parsed from run files and CLI flags
//! - used as map keys during decomposition
//! - printed in reports

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Canonical name of the date axis in every output frame.
pub const DATE_KEY: &str = "ds";

/// Canonical name of the dependent variable in every output frame.
pub const DEP_VAR_KEY: &str = "dep_var";

/// What the dependent variable measures.
///
/// Opaque to feature engineering; carried along for the model-fitting stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepVarType {
    Revenue,
    Conversion,
}

/// Sampling cadence of the input series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Day,
    Week,
    Month,
}

impl IntervalType {
    /// Nominal length of one period in days.
    pub fn days(self) -> i64 {
        match self {
            IntervalType::Day => 1,
            IntervalType::Week => 7,
            IntervalType::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalType::Day => "daily",
            IntervalType::Week => "weekly",
            IntervalType::Month => "monthly",
        }
    }
}

/// Adstock family used by the (downstream) transform search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdstockType {
    Geometric,
    WeibullCdf,
    WeibullPdf,
}

impl AdstockType {
    pub fn as_str(self) -> &'static str {
        match self {
            AdstockType::Geometric => "geometric",
            AdstockType::WeibullCdf => "weibull_cdf",
            AdstockType::WeibullPdf => "weibull_pdf",
        }
    }

    pub fn is_weibull(self) -> bool {
        matches!(self, AdstockType::WeibullCdf | AdstockType::WeibullPdf)
    }
}

impl FromStr for AdstockType {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "geometric" => Ok(AdstockType::Geometric),
            "weibull_cdf" => Ok(AdstockType::WeibullCdf),
            "weibull_pdf" => Ok(AdstockType::WeibullPdf),
            other => Err(FeatureError::spec(format!(
                "Unknown adstock family `{other}` (expected geometric, weibull_cdf or weibull_pdf)."
            ))),
        }
    }
}

/// One additive element of the dependent-variable decomposition.
///
/// The column produced for a component is named exactly `as_str()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Trend,
    Season,
    Holiday,
    Monthly,
    Weekday,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Trend,
        ComponentKind::Season,
        ComponentKind::Holiday,
        ComponentKind::Monthly,
        ComponentKind::Weekday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Trend => "trend",
            ComponentKind::Season => "season",
            ComponentKind::Holiday => "holiday",
            ComponentKind::Monthly => "monthly",
            ComponentKind::Weekday => "weekday",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| {
                FeatureError::spec(format!(
                    "Unknown decomposition component `{s}` (expected trend, season, holiday, monthly or weekday)."
                ))
            })
    }
}

/// Sign constraint attached to a requested component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignConstraint {
    #[default]
    Default,
    Positive,
    Negative,
    Zero,
}

impl SignConstraint {
    pub fn as_str(self) -> &'static str {
        match self {
            SignConstraint::Default => "default",
            SignConstraint::Positive => "positive",
            SignConstraint::Negative => "negative",
            SignConstraint::Zero => "zero",
        }
    }

    /// Whether a coefficient value satisfies this constraint.
    pub fn admits(self, coef: f64) -> bool {
        match self {
            SignConstraint::Default => true,
            SignConstraint::Positive => coef >= 0.0,
            SignConstraint::Negative => coef <= 0.0,
            SignConstraint::Zero => coef == 0.0,
        }
    }
}

impl FromStr for SignConstraint {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(SignConstraint::Default),
            "positive" => Ok(SignConstraint::Positive),
            "negative" => Ok(SignConstraint::Negative),
            "zero" => Ok(SignConstraint::Zero),
            other => Err(FeatureError::spec(format!(
                "Unknown sign constraint `{other}` (expected default, positive, negative or zero)."
            ))),
        }
    }
}

/// Semantic role a column plays in the data specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    DependentVariable,
    Context,
    PaidMediaSpend,
    PaidMediaExposure,
    Organic,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnRole::Date => "date variable",
            ColumnRole::DependentVariable => "dependent variable",
            ColumnRole::Context => "context variable",
            ColumnRole::PaidMediaSpend => "paid media spend",
            ColumnRole::PaidMediaExposure => "paid media exposure",
            ColumnRole::Organic => "organic variable",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_names_round_trip_through_from_str() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.as_str().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("holidays".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn adstock_accepts_dashed_names() {
        assert_eq!("Weibull-CDF".parse::<AdstockType>().unwrap(), AdstockType::WeibullCdf);
        assert!(matches!(
            "exponential".parse::<AdstockType>(),
            Err(FeatureError::InvalidSpecification(_))
        ));
    }

    #[test]
    fn sign_admits() {
        assert!(SignConstraint::Positive.admits(0.0));
        assert!(!SignConstraint::Positive.admits(-1e-9));
        assert!(SignConstraint::Negative.admits(-3.0));
        assert!(SignConstraint::Default.admits(-3.0));
    }
}
