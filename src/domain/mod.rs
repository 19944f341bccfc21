//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - shared enums and canonical names (`types`)
//! - the columnar table (`frame`)
//! - the data specification and MMM data container (`spec`)
//! - the holiday calendar and decomposition request (`holidays`)
//! - the channel hyperparameter registry (`hyperparameters`)

pub mod frame;
pub mod holidays;
pub mod hyperparameters;
pub mod spec;
pub mod types;

pub use frame::*;
pub use holidays::*;
pub use hyperparameters::*;
pub use spec::*;
pub use types::*;
