//! xlsx-backed staging queue and audit log
//!
//! Reads go through calamine, writes through rust_xlsxwriter. Both sheets
//! are rewritten whole on every change, so each workbook holds only the one
//! sheet this tool manages and every cell is stored as text.

use super::{AuditLog, StagingQueue};
use crate::config::PathRewrite;
use crate::error::{IntakeError, Result};
use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use specimen_intake_common::{TrackingRecord, TRACKING_HEADER};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read every row of `sheet` as text, keeping absolute row/column positions
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;

    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];

    for cells in range.rows() {
        let mut row = vec![String::new(); first_col as usize];
        row.extend(cells.iter().map(|c| c.to_string()));
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Write `rows` as the only sheet of a new workbook at `path`
pub fn write_sheet(path: &Path, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (r, row) in rows.iter().enumerate() {
        let r = u32::try_from(r)
            .map_err(|_| IntakeError::Sheet(format!("too many rows for {}", path.display())))?;
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let c = u16::try_from(c)
                .map_err(|_| IntakeError::Sheet(format!("too many columns for {}", path.display())))?;
            worksheet.write_string(r, c, value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

pub struct XlsxStagingSheet {
    path: PathBuf,
    sheet: String,
}

impl XlsxStagingSheet {
    pub fn open(path: &Path, sheet: &str) -> Result<Self> {
        if !path.exists() {
            return Err(IntakeError::Sheet(format!(
                "staging workbook not found: {}",
                path.display()
            )));
        }
        let staging = Self {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        };
        // fail at startup, not on the first row
        read_sheet(&staging.path, &staging.sheet)?;
        info!("Staging sheet connection successful: {} [{}]", path.display(), sheet);
        Ok(staging)
    }
}

impl StagingQueue for XlsxStagingSheet {
    fn fetch_rows(&mut self) -> Result<Vec<Vec<String>>> {
        read_sheet(&self.path, &self.sheet)
    }

    fn delete_row(&mut self, index: usize) -> Result<()> {
        let mut rows = read_sheet(&self.path, &self.sheet)?;
        if index == 0 || index >= rows.len() {
            return Err(IntakeError::Sheet(format!(
                "row {} out of range in {} ({} rows)",
                index,
                self.sheet,
                rows.len()
            )));
        }
        rows.remove(index);
        write_sheet(&self.path, &self.sheet, &rows)?;
        debug!("Deleted staging row {}", index);
        Ok(())
    }
}

pub struct XlsxAuditLog {
    path: PathBuf,
    sheet: String,
    rewrite: Option<PathRewrite>,
}

impl XlsxAuditLog {
    pub fn new(path: &Path, sheet: &str, rewrite: Option<PathRewrite>) -> Self {
        Self {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            rewrite,
        }
    }

    fn cells(&self, record: &TrackingRecord) -> Vec<String> {
        let mut row = record.to_row();
        if let Some(rewrite) = &self.rewrite {
            row[20] = rewrite.apply(&row[20]);
        }
        row.into()
    }
}

impl AuditLog for XlsxAuditLog {
    fn append(&mut self, record: &TrackingRecord) -> Result<()> {
        let mut rows = if self.path.exists() {
            read_sheet(&self.path, &self.sheet)?
        } else {
            Vec::new()
        };
        if rows.is_empty() {
            rows.push(TRACKING_HEADER.iter().map(|h| h.to_string()).collect());
        }
        rows.push(self.cells(record));

        write_sheet(&self.path, &self.sheet, &rows)?;
        info!("Successfully added record to tracking sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_write_then_read_trims_trailing_empties() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        let rows = vec![strings(&["a", "b", ""]), strings(&["", "c"])];
        write_sheet(&path, "Data", &rows).unwrap();

        let read = read_sheet(&path, "Data").unwrap();
        assert_eq!(read, vec![strings(&["a", "b"]), strings(&["", "c"])]);
    }

    #[test]
    fn test_staging_delete_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staging.xlsx");
        let rows = vec![
            strings(&["Timestamp", "Image Type"]),
            strings(&["t1", "Type"]),
            strings(&["t2", "Field"]),
        ];
        write_sheet(&path, "Form Responses 1", &rows).unwrap();

        let mut staging = XlsxStagingSheet::open(&path, "Form Responses 1").unwrap();
        assert_eq!(staging.remaining_rows().unwrap(), 2);

        staging.delete_row(1).unwrap();
        let left = staging.fetch_rows().unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left[1][0], "t2");

        assert!(staging.delete_row(0).is_err());
        assert!(staging.delete_row(5).is_err());
    }

    #[test]
    fn test_audit_log_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracking.xlsx");
        let mut log = XlsxAuditLog::new(
            &path,
            "BPBM_Images_Database",
            Some(PathRewrite {
                strip_prefix: "/mnt/d".into(),
                replace_with: "D:".into(),
                windows_separators: true,
            }),
        );

        let record = TrackingRecord {
            image_type: "Field".into(),
            folder_pathway: "/mnt/d/Images/Field/X".into(),
            ..Default::default()
        };
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let rows = read_sheet(&path, "BPBM_Images_Database").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "occid");
        assert_eq!(rows[1][10], "Field");
        assert_eq!(rows[2][20], "D:\\Images\\Field\\X");
    }
}
