//! Feature-engineering output.

use crate::domain::{ComponentKind, Frame, IntervalType};
use crate::engineering::window::WindowInfo;
use crate::fit::ExposureFit;

/// Everything the downstream model needs from feature engineering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturizedMmmData {
    /// Full-range canonical frame, with decomposition columns appended.
    pub dt_mod: Frame,
    /// Rows of `dt_mod` inside the modelling window, same columns.
    pub dt_mod_roll_wind: Frame,
    pub window: WindowInfo,
    pub interval: IntervalType,
    /// Decomposition columns appended to both frames, in request order.
    pub components: Vec<ComponentKind>,
    pub exposure_fits: Vec<ExposureFit>,
}

impl FeaturizedMmmData {
    pub fn has_decomposition(&self) -> bool {
        !self.components.is_empty()
    }
}
