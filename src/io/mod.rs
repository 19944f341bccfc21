//! Input/output helpers.
//!
//! - CSV ingest of raw datasets and holiday calendars (`ingest`)
//! - CSV export of frames (`export`)
//! - JSON run file (`run_file`)

pub mod export;
pub mod ingest;
pub mod run_file;

pub use export::*;
pub use ingest::*;
pub use run_file::*;
