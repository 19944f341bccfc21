//! Decomposition of the dependent variable into additive components.
//!
//! The decomposition model is a collaborator behind the `Decomposer` trait:
//! given the dependent-variable series, the region's calendar and the requested
//! components, it returns one aligned series per component. The pipeline
//! checks the result for completeness and never substitutes defaults.
//!
//! - `cadence`: interval detection and cadence-gated component selection
//! - `regression`: the built-in additive least squares decomposer

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{ComponentKind, HolidayEvent, SignConstraint};

pub mod cadence;
pub mod regression;

pub use cadence::*;
pub use regression::*;

/// Per-component values, one per input row.
pub type ComponentSeries = BTreeMap<ComponentKind, Vec<f64>>;

/// Failure of a decomposition model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecompositionError {
    #[error("Decomposition needs at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Decomposition did not converge: {0}")]
    NonConvergence(String),

    #[error("Decomposition returned no values for component `{component}`")]
    Incomplete { component: ComponentKind },

    #[error("Decomposition returned {actual} values for component `{component}`, expected {expected}")]
    LengthMismatch {
        component: ComponentKind,
        expected: usize,
        actual: usize,
    },

    #[error("Decomposition returned non-finite values for component `{component}`")]
    NonFinite { component: ComponentKind },

    #[error("Decomposition model error: {0}")]
    Model(String),
}

/// A decomposition model.
///
/// `series` is sorted ascending by date without duplicates; `calendar` is
/// already filtered to `region`; `signs` is parallel to `components`.
pub trait Decomposer {
    fn decompose(
        &self,
        series: &[(NaiveDate, f64)],
        calendar: &[HolidayEvent],
        region: &str,
        components: &[ComponentKind],
        signs: &[SignConstraint],
    ) -> Result<ComponentSeries, DecompositionError>;
}

impl<D: Decomposer + ?Sized> Decomposer for &D {
    fn decompose(
        &self,
        series: &[(NaiveDate, f64)],
        calendar: &[HolidayEvent],
        region: &str,
        components: &[ComponentKind],
        signs: &[SignConstraint],
    ) -> Result<ComponentSeries, DecompositionError> {
        (**self).decompose(series, calendar, region, components, signs)
    }
}

/// Check a decomposer's output against what was requested.
///
/// Extra components in `output` are ignored by the caller; missing, short or
/// non-finite ones are errors.
pub fn check_output(
    output: &ComponentSeries,
    components: &[ComponentKind],
    n_rows: usize,
) -> Result<(), DecompositionError> {
    for &component in components {
        let values = output
            .get(&component)
            .ok_or(DecompositionError::Incomplete { component })?;
        if values.len() != n_rows {
            return Err(DecompositionError::LengthMismatch {
                component,
                expected: n_rows,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DecompositionError::NonFinite { component });
        }
    }
    Ok(())
}
