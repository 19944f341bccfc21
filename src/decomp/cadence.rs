//! Series cadence and cadence-gated components.
//!
//! `monthly` needs sub-monthly data and `weekday` needs daily data; on coarser
//! series those components carry no information and are not produced.

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{ComponentKind, DecompositionConfig, IntervalType, SignConstraint};
use crate::error::FeatureError;

/// Detect the sampling interval from sorted, distinct dates.
///
/// Uses the median gap so that a few irregular rows do not flip the result.
pub fn detect_interval(dates: &[NaiveDate]) -> Result<IntervalType, FeatureError> {
    if dates.len() < 2 {
        return Err(FeatureError::data(format!(
            "At least two rows are needed to detect the data interval, got {}.",
            dates.len()
        )));
    }

    let mut gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    gaps.sort_unstable();
    let median = gaps[gaps.len() / 2];

    match median {
        1 => Ok(IntervalType::Day),
        7 => Ok(IntervalType::Week),
        28..=31 => Ok(IntervalType::Month),
        other => Err(FeatureError::data(format!(
            "Input data has to be daily, weekly or monthly; median gap is {other} days."
        ))),
    }
}

/// Whether `kind` is meaningful for a series sampled at `interval`.
pub fn supports(kind: ComponentKind, interval: IntervalType) -> bool {
    match kind {
        ComponentKind::Weekday => interval == IntervalType::Day,
        ComponentKind::Monthly => matches!(interval, IntervalType::Day | IntervalType::Week),
        ComponentKind::Trend | ComponentKind::Season | ComponentKind::Holiday => true,
    }
}

/// Components (with their signs) that will actually be produced.
///
/// Pure function of the decomposition variant and the cadence; dropped
/// components are logged.
pub fn active_components(
    config: &DecompositionConfig,
    interval: IntervalType,
) -> Vec<(ComponentKind, SignConstraint)> {
    let DecompositionConfig::Enabled { components, signs } = config else {
        return Vec::new();
    };

    components
        .iter()
        .zip(signs.iter())
        .filter(|&(&kind, _)| {
            let keep = supports(kind, interval);
            if !keep {
                warn!(
                    component = %kind,
                    interval = interval.label(),
                    "component is not meaningful at this cadence; skipping"
                );
            }
            keep
        })
        .map(|(&kind, &sign)| (kind, sign))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(start: NaiveDate, step: i64, n: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| start + Duration::days(step * i as i64)).collect()
    }

    #[test]
    fn detects_day_week_month() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        assert_eq!(detect_interval(&series(start, 1, 10)).unwrap(), IntervalType::Day);
        assert_eq!(detect_interval(&series(start, 7, 10)).unwrap(), IntervalType::Week);

        let months: Vec<NaiveDate> = (1..=12)
            .map(|m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap())
            .collect();
        assert_eq!(detect_interval(&months).unwrap(), IntervalType::Month);

        assert!(detect_interval(&series(start, 3, 10)).is_err());
        assert!(detect_interval(&series(start, 7, 1)).is_err());
    }

    #[test]
    fn weekly_series_drops_weekday_but_keeps_monthly() {
        let config = DecompositionConfig::Enabled {
            components: vec![
                ComponentKind::Trend,
                ComponentKind::Monthly,
                ComponentKind::Weekday,
            ],
            signs: vec![SignConstraint::Default; 3],
        };
        let weekly: Vec<ComponentKind> = active_components(&config, IntervalType::Week)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(weekly, vec![ComponentKind::Trend, ComponentKind::Monthly]);

        let monthly: Vec<ComponentKind> = active_components(&config, IntervalType::Month)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(monthly, vec![ComponentKind::Trend]);

        assert!(active_components(&DecompositionConfig::Disabled, IntervalType::Day).is_empty());
    }

    #[test]
    fn daily_series_keeps_every_component() {
        let config = DecompositionConfig::Enabled {
            components: vec![
                ComponentKind::Trend,
                ComponentKind::Weekday,
                ComponentKind::Monthly,
            ],
            signs: vec![SignConstraint::Default, SignConstraint::Positive, SignConstraint::Default],
        };
        assert_eq!(
            active_components(&config, IntervalType::Day),
            vec![
                (ComponentKind::Trend, SignConstraint::Default),
                (ComponentKind::Weekday, SignConstraint::Positive),
                (ComponentKind::Monthly, SignConstraint::Default),
            ]
        );
    }
}
