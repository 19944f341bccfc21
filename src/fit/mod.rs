//! Spend → exposure curve fitting.
//!
//! Responsibilities:
//!
//! - generate the `km` grid for the Michaelis–Menten curve
//! - evaluate each candidate (parallel) and keep the lowest SSE
//! - select linear vs Michaelis–Menten per channel by R²

pub mod fitter;
pub mod km_grid;
pub mod selection;

pub use fitter::*;
pub use km_grid::*;
pub use selection::*;
