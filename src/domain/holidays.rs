//! Holiday calendar and decomposition request.

use chrono::{Datelike, NaiveDate};

use crate::domain::types::{ComponentKind, SignConstraint};
use crate::error::FeatureError;

/// One row of the calendar/events table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayEvent {
    pub ds: NaiveDate,
    pub holiday: String,
    pub country: String,
    pub year: i32,
}

impl HolidayEvent {
    pub fn new(ds: NaiveDate, holiday: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            ds,
            holiday: holiday.into(),
            country: country.into(),
            year: ds.year(),
        }
    }
}

/// Decomposition as a tagged variant.
///
/// Column membership of the output is a pure function of this value and the
/// series cadence (see `decomp::cadence::active_components`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompositionConfig {
    Disabled,
    Enabled {
        components: Vec<ComponentKind>,
        signs: Vec<SignConstraint>,
    },
}

/// Calendar table plus the requested components, region and signs.
#[derive(Debug, Clone, PartialEq)]
pub struct HolidaysData {
    events: Vec<HolidayEvent>,
    components: Vec<ComponentKind>,
    region: String,
    signs: Vec<SignConstraint>,
}

impl HolidaysData {
    /// Validate and build.
    ///
    /// An empty `signs` list with requested components means "default" for all.
    pub fn new(
        events: Vec<HolidayEvent>,
        components: Vec<ComponentKind>,
        region: impl Into<String>,
        signs: Vec<SignConstraint>,
    ) -> Result<Self, FeatureError> {
        for (i, kind) in components.iter().enumerate() {
            if components[..i].contains(kind) {
                return Err(FeatureError::spec(format!(
                    "Decomposition component `{kind}` is requested twice."
                )));
            }
        }

        let signs = if signs.is_empty() {
            vec![SignConstraint::Default; components.len()]
        } else {
            signs
        };
        if signs.len() != components.len() {
            return Err(FeatureError::spec(format!(
                "{} sign constraints given for {} decomposition components.",
                signs.len(),
                components.len()
            )));
        }

        Ok(Self {
            events,
            components,
            region: region.into(),
            signs,
        })
    }

    pub fn components(&self) -> &[ComponentKind] {
        &self.components
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn signs(&self) -> &[SignConstraint] {
        &self.signs
    }

    /// Events whose country matches the configured region (case-insensitive).
    pub fn events_for_region(&self) -> Vec<HolidayEvent> {
        let region = self.region.trim();
        self.events
            .iter()
            .filter(|e| e.country.trim().eq_ignore_ascii_case(region))
            .cloned()
            .collect()
    }

    pub fn decomposition_config(&self) -> DecompositionConfig {
        if self.components.is_empty() {
            DecompositionConfig::Disabled
        } else {
            DecompositionConfig::Enabled {
                components: self.components.clone(),
                signs: self.signs.clone(),
            }
        }
    }
}

/// Decomposition variant for an optional holiday spec.
pub fn decomposition_config(holidays: Option<&HolidaysData>) -> DecompositionConfig {
    holidays.map_or(DecompositionConfig::Disabled, HolidaysData::decomposition_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn signs_must_match_components() {
        let err = HolidaysData::new(
            vec![],
            vec![ComponentKind::Trend, ComponentKind::Season],
            "US",
            vec![SignConstraint::Default],
        );
        assert!(matches!(err, Err(FeatureError::InvalidSpecification(_))));

        let ok = HolidaysData::new(vec![], vec![ComponentKind::Trend], "US", vec![]).unwrap();
        assert_eq!(ok.signs(), &[SignConstraint::Default]);
    }

    #[test]
    fn empty_components_are_disabled_but_configured() {
        let h = HolidaysData::new(vec![], vec![], "US", vec![]).unwrap();
        assert_eq!(h.decomposition_config(), DecompositionConfig::Disabled);
        assert_eq!(decomposition_config(None), DecompositionConfig::Disabled);
    }

    #[test]
    fn region_filter_is_case_insensitive() {
        let h = HolidaysData::new(
            vec![
                HolidayEvent::new(d(2020, 1, 1), "new_year", "US"),
                HolidayEvent::new(d(2020, 1, 1), "new_year", "DE"),
                HolidayEvent::new(d(2020, 7, 4), "independence", "us"),
            ],
            vec![ComponentKind::Holiday],
            "US",
            vec![],
        )
        .unwrap();
        let events = h.events_for_region();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].year, 2020);
    }

    #[test]
    fn duplicate_component_is_rejected() {
        let err = HolidaysData::new(
            vec![],
            vec![ComponentKind::Trend, ComponentKind::Trend],
            "US",
            vec![],
        );
        assert!(matches!(err, Err(FeatureError::InvalidSpecification(_))));
    }
}
