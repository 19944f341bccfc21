//! Built-in datasets.
//!
//! - `sample`: seeded synthetic weekly MMM dataset used by `mmmfe demo`

pub mod sample;

pub use sample::*;
