//! Half-saturation (`km`) grid generation.
//!
//! We fit the Michaelis–Menten curve using a deterministic grid search over
//! `km` with the scale coefficient solved in closed form at each point.
//!
//! Why grid search?
//! - It avoids local minima issues common in nonlinear optimization.
//! - It is deterministic given the same inputs.
//! - With a single nonlinear parameter, a modest grid is fast enough.

use crate::error::FeatureError;

/// Default number of grid points.
pub const KM_STEPS: usize = 60;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FeatureError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(FeatureError::data(format!(
            "Invalid km range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(FeatureError::data("km steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// `km` grid spanning three decades below to one decade above the largest spend.
pub fn km_grid(spend: &[f64], steps: usize) -> Result<Vec<f64>, FeatureError> {
    let max_spend = spend
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max_spend <= 0.0 {
        return Err(FeatureError::data("Spend has no positive values; cannot build a km grid."));
    }
    log_space(max_spend * 1e-3, max_spend * 10.0, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn km_grid_scales_with_spend() {
        let grid = km_grid(&[0.0, 50.0, 200.0], 4).unwrap();
        assert!((grid[0] - 0.2).abs() < 1e-9);
        assert!((grid[3] - 2000.0).abs() < 1e-6);
        assert!(km_grid(&[0.0, 0.0], 4).is_err());
    }
}
