//! Output files written alongside the database load.
//!
//! # Submodules
//!
//! - [`json`]: dated JSON snapshot of the extracted batch

pub mod json;
