//! Staging queue and audit log
//!
//! The staging sheet is the input queue (header row plus one row per
//! submitted folder); the tracking sheet is an append-only audit log.

pub mod xlsx;

use crate::error::Result;
use specimen_intake_common::TrackingRecord;

pub use xlsx::{XlsxAuditLog, XlsxStagingSheet};

/// Form-response rows waiting to be processed
pub trait StagingQueue {
    /// All rows of the sheet, header included
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>>;

    /// Remove one sheet row (0-based, header is row 0)
    fn delete_row(&mut self, index: usize) -> Result<()>;

    /// Data rows still in the sheet
    fn remaining_rows(&mut self) -> Result<usize> {
        Ok(self.fetch_rows()?.len().saturating_sub(1))
    }
}

/// Append-only record of processed folders
pub trait AuditLog {
    fn append(&mut self, record: &TrackingRecord) -> Result<()>;
}
