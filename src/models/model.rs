//! Spend → exposure response curves.
//!
//! The fitter relies on two primitive operations:
//! - build the (single) design value for a given spend and nonlinear parameter
//! - predict exposure given the linear coefficient and nonlinear parameter
//!
//! Both models are linear in one coefficient once the nonlinear parameter is
//! fixed:
//!
//! - linear:            `exposure = β · spend`
//! - Michaelis–Menten:  `exposure = vmax · spend / (km + spend)`

use serde::{Deserialize, Serialize};

/// Which response curve maps spend to exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Linear,
    MichaelisMenten,
}

impl ResponseKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ResponseKind::Linear => "linear",
            ResponseKind::MichaelisMenten => "michaelis-menten",
        }
    }
}

/// Regressor value for one observation.
///
/// `km` is ignored by the linear model.
pub fn design_value(kind: ResponseKind, spend: f64, km: f64) -> f64 {
    match kind {
        ResponseKind::Linear => spend,
        ResponseKind::MichaelisMenten => {
            let denom = km + spend;
            if denom <= 0.0 { 0.0 } else { spend / denom }
        }
    }
}

/// Predicted exposure.
pub fn predict(kind: ResponseKind, spend: f64, coef: f64, km: f64) -> f64 {
    coef * design_value(kind, spend, km)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn michaelis_menten_half_saturation_at_km() {
        let y = predict(ResponseKind::MichaelisMenten, 50.0, 1000.0, 50.0);
        assert!((y - 500.0).abs() < 1e-12);
        assert_eq!(predict(ResponseKind::MichaelisMenten, 0.0, 1000.0, 50.0), 0.0);
    }

    #[test]
    fn linear_ignores_km() {
        assert_eq!(predict(ResponseKind::Linear, 4.0, 2.5, 123.0), 10.0);
    }
}
