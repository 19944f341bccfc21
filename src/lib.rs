//! `mmm-features` library crate.
//!
//! Feature engineering for marketing-mix modelling: canonicalizes a raw
//! dataset against a declarative data spec, optionally decomposes the
//! dependent variable into trend/season/holiday/calendar components, fits
//! spend → exposure response curves, and cuts the modelling window.
//!
//! The binary (`mmmfe`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline is reusable by a downstream model-fitting stage

pub mod app;
pub mod cli;
pub mod data;
pub mod decomp;
pub mod domain;
pub mod engineering;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use decomp::{Decomposer, DecompositionError, RegressionDecomposer};
pub use engineering::{FeatureEngineering, FeaturizedMmmData};
pub use error::{AppError, FeatureError};
