//! Specimen image intake
//!
//! Reads the staging sheet, places each staged folder in the collection
//! tree, records it in the tracking sheet and clears it from staging.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod intake;
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod sheets;
pub mod thumbnail;
pub mod transfer;

pub use error::{IntakeError, Result};
