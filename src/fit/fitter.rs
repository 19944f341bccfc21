//! Low-level fitting routines for a single response curve.
//!
//! Given:
//! - spends `s_i`
//! - observed exposures `e_i`
//! - a list of candidate `km` values (Michaelis–Menten only)
//!
//! we solve, for each candidate:
//! - a one-column least squares problem for the scale coefficient
//! - the resulting SSE
//!
//! and return the best (lowest SSE) candidate.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::math::{r_squared, solve_least_squares};
use crate::models::{ResponseKind, design_value, predict};

/// Best fit for one response curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFit {
    pub kind: ResponseKind,
    /// `β` for linear, `vmax` for Michaelis–Menten.
    pub coef: f64,
    /// Half-saturation spend (Michaelis–Menten only).
    pub km: Option<f64>,
    pub sse: f64,
    pub rsq: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    km: f64,
    coef: f64,
    sse: f64,
}

/// Linear fit through the origin.
pub fn fit_linear(spend: &[f64], exposure: &[f64]) -> Result<CurveFit, FeatureError> {
    check_inputs(spend, exposure)?;
    let (coef, sse) = evaluate_candidate(ResponseKind::Linear, 0.0, spend, exposure).ok_or_else(|| {
        FeatureError::data("Linear spend/exposure fit is degenerate (no positive spend).")
    })?;
    Ok(finish(ResponseKind::Linear, coef, None, sse, spend, exposure))
}

/// Michaelis–Menten fit over a `km` grid.
///
/// Returns `Ok(None)` when no grid point yields a valid (non-negative, finite) fit.
pub fn fit_michaelis_menten(
    spend: &[f64],
    exposure: &[f64],
    km_grid: &[f64],
) -> Result<Option<CurveFit>, FeatureError> {
    check_inputs(spend, exposure)?;
    if km_grid.is_empty() {
        return Err(FeatureError::data("km grid is empty."));
    }

    // Evaluate each km independently (parallel).
    let candidates: Vec<Candidate> = km_grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &km)| {
            evaluate_candidate(ResponseKind::MichaelisMenten, km, spend, exposure)
                .map(|(coef, sse)| Candidate { idx, km, coef, sse })
        })
        .collect();

    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    // Deterministic selection: pick the minimum SSE; break ties by original grid index.
    let mut best = first;
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    Ok(Some(finish(
        ResponseKind::MichaelisMenten,
        best.coef,
        Some(best.km),
        best.sse,
        spend,
        exposure,
    )))
}

fn check_inputs(spend: &[f64], exposure: &[f64]) -> Result<(), FeatureError> {
    if spend.is_empty() || spend.len() != exposure.len() {
        return Err(FeatureError::data(format!(
            "Spend/exposure length mismatch or empty ({} vs {}).",
            spend.len(),
            exposure.len()
        )));
    }
    Ok(())
}

fn evaluate_candidate(kind: ResponseKind, km: f64, spend: &[f64], exposure: &[f64]) -> Option<(f64, f64)> {
    let n = spend.len();
    let mut x = DMatrix::<f64>::zeros(n, 1);
    let mut y = DVector::<f64>::zeros(n);
    for i in 0..n {
        x[(i, 0)] = design_value(kind, spend[i], km);
        y[i] = exposure[i];
    }
    if x.iter().all(|v| *v == 0.0) {
        return None;
    }

    let beta = solve_least_squares(&x, &y)?;
    let coef = beta[0];
    if !coef.is_finite() || coef < 0.0 {
        return None;
    }

    let sse: f64 = spend
        .iter()
        .zip(exposure)
        .map(|(&s, &e)| {
            let r = e - predict(kind, s, coef, km);
            r * r
        })
        .sum();

    if sse.is_finite() { Some((coef, sse)) } else { None }
}

fn finish(kind: ResponseKind, coef: f64, km: Option<f64>, sse: f64, spend: &[f64], exposure: &[f64]) -> CurveFit {
    let fitted: Vec<f64> = spend
        .iter()
        .map(|&s| predict(kind, s, coef, km.unwrap_or(0.0)))
        .collect();
    CurveFit {
        kind,
        coef,
        km,
        sse,
        rsq: r_squared(exposure, &fitted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::km_grid::km_grid;

    #[test]
    fn linear_fit_recovers_slope() {
        let spend = [10.0, 20.0, 30.0, 40.0];
        let exposure: Vec<f64> = spend.iter().map(|s| 3.0 * s).collect();
        let fit = fit_linear(&spend, &exposure).unwrap();
        assert!((fit.coef - 3.0).abs() < 1e-9);
        assert!((fit.rsq - 1.0).abs() < 1e-9);
    }

    #[test]
    fn michaelis_menten_picks_true_km_from_grid() {
        let spend: Vec<f64> = (1..=30).map(|i| i as f64 * 10.0).collect();
        let exposure: Vec<f64> = spend.iter().map(|&s| predict(ResponseKind::MichaelisMenten, s, 5000.0, 100.0)).collect();

        let grid = vec![25.0, 50.0, 100.0, 200.0, 400.0];
        let fit = fit_michaelis_menten(&spend, &exposure, &grid).unwrap().unwrap();
        assert_eq!(fit.km, Some(100.0));
        assert!((fit.coef - 5000.0).abs() < 1e-6);
        assert!(fit.rsq > 0.999_999);
    }

    #[test]
    fn michaelis_menten_is_deterministic_across_runs() {
        let spend: Vec<f64> = (0..40).map(|i| (i % 7) as f64 * 15.0 + 1.0).collect();
        let exposure: Vec<f64> = spend.iter().map(|s| 2.0 * s + 5.0).collect();
        let grid = km_grid(&spend, 30).unwrap();
        let a = fit_michaelis_menten(&spend, &exposure, &grid).unwrap();
        let b = fit_michaelis_menten(&spend, &exposure, &grid).unwrap();
        assert_eq!(a, b);
    }
}
