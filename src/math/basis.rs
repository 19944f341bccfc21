//! Basis functions for additive time-series regression.
//!
//! - Fourier pairs `sin(2πkt/P)`, `cos(2πkt/P)` for `k = 1..=order`
//! - hinge `max(0, t - c)` for piecewise-linear trends
//!
//! `t` is measured in days since the Unix epoch so that seasonal phases are
//! anchored to the calendar rather than to the first observation.

use std::f64::consts::PI;

use chrono::NaiveDate;

/// Days since 1970-01-01 (negative before).
pub fn epoch_days(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Fill `2 * order` Fourier terms for day `t` and period `period` into `out`.
///
/// Layout: `[sin_1, cos_1, sin_2, cos_2, ...]`.
pub fn fill_fourier(t: f64, period: f64, order: usize, out: &mut [f64]) {
    for k in 0..order {
        let x = 2.0 * PI * (k as f64 + 1.0) * t / period;
        out[2 * k] = x.sin();
        out[2 * k + 1] = x.cos();
    }
}

/// `max(0, t - knot)`.
pub fn hinge(t: f64, knot: f64) -> f64 {
    (t - knot).max(0.0)
}
