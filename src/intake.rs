//! Batch orchestrator: staging rows in, placed folders out
//!
//! Rows are handled strictly one after another. Whatever goes wrong inside
//! a row is logged, counted and the batch moves on to the next row.

use crate::error::{IntakeError, Result};
use crate::pipeline::{Pipeline, PipelineReport, Step};
use crate::scanner;
use serde::Serialize;
use specimen_intake_common::{
    pad_row, parse_staging_row, CollectionStore, Placement, RowClassifier, StagingRow,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Counters threaded through one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub moved: usize,
    pub errors: usize,
    /// Sheet row of the next row to process (row 0 is the header)
    pub row_index: usize,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            moved: 0,
            errors: 0,
            row_index: 1,
        }
    }
}

#[derive(Debug)]
pub enum RowOutcome {
    Moved {
        placement: Placement,
        report: PipelineReport,
    },
    Skipped {
        folder_name: Option<String>,
        error: IntakeError,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: String,
    pub finished_at: String,
    pub moved: usize,
    pub errors: usize,
    pub remaining_rows: Option<usize>,
    pub remaining_folders: Option<usize>,
}

impl RunSummary {
    pub fn log(&self) {
        info!("=== SUMMARY ===");
        info!("Started: {}  Finished: {}", self.started_at, self.finished_at);
        info!("Folders moved: {}", self.moved);
        info!("Errors: {}", self.errors);
        match self.remaining_rows {
            Some(n) => info!("Rows left in staging sheet: {}", n),
            None => warn!("Rows left in staging sheet: unknown"),
        }
        match self.remaining_folders {
            Some(n) => info!("Folders left in staging directory: {}", n),
            None => warn!("Folders left in staging directory: unknown"),
        }
    }
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Parse and locate one raw row; the staging folder must exist
fn prepare(raw: Vec<String>, staging_root: &Path) -> Result<(StagingRow, PathBuf)> {
    let row = parse_staging_row(&pad_row(raw))?;
    let staging_folder = staging_root.join(&row.folder_name);
    if !staging_folder.is_dir() {
        return Err(IntakeError::FolderNotFound(staging_folder.display().to_string()));
    }
    Ok((row, staging_folder))
}

/// Folder name column of a row that may not parse
fn raw_folder_name(raw: &[String]) -> Option<String> {
    raw.get(specimen_intake_common::parser::col::FOLDER_NAME)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct Intake<'a, S: CollectionStore + ?Sized> {
    classifier: RowClassifier<'a, S>,
    staging_root: &'a Path,
    pipeline: Pipeline<'a>,
}

impl<'a, S: CollectionStore + ?Sized> Intake<'a, S> {
    pub fn new(store: &'a S, base: &'a Path, staging_root: &'a Path, pipeline: Pipeline<'a>) -> Self {
        Self {
            classifier: RowClassifier::new(store, base),
            staging_root,
            pipeline,
        }
    }

    fn handle_row(&mut self, raw: Vec<String>, row_index: usize) -> Result<(Placement, PipelineReport)> {
        let (row, staging_folder) = prepare(raw, self.staging_root)?;
        info!("Processing {} ({})", row.folder_name, row.category());

        let placement = self.classifier.classify(&row)?;
        info!("Destination: {}", placement.destination);

        let report = self
            .pipeline
            .execute(&placement, &staging_folder, row_index)
            .into_result()?;
        Ok((placement, report))
    }

    /// Process one staging row, updating `state`
    pub fn process_row(&mut self, raw: Vec<String>, state: &mut RunState) -> RowOutcome {
        let folder_name = raw_folder_name(&raw);
        let outcome = match self.handle_row(raw, state.row_index) {
            Ok((placement, report)) => {
                state.moved += 1;
                info!("Moved {} -> {}", placement.folder_name, placement.destination);
                RowOutcome::Moved { placement, report }
            }
            Err(e) => {
                state.errors += 1;
                let name = folder_name.as_deref().unwrap_or("<unnamed>");
                match &e {
                    IntakeError::Core(core) if core.is_row_local() => {
                        warn!("Skipping {}: {}", name, e)
                    }
                    _ => error!("Error processing {}: {}", name, e),
                }
                RowOutcome::Skipped {
                    folder_name,
                    error: e,
                }
            }
        };

        // a deleted sheet row shifts every later row up by one
        if let RowOutcome::Moved { report, .. } = &outcome {
            if report.is_done(Step::DeleteStagingRow) {
                state.row_index -= 1;
            }
        }
        state.row_index += 1;
        outcome
    }

    /// Process every data row in the staging queue
    pub fn run(&mut self) -> Result<RunSummary> {
        let started_at = now();
        let rows = self.pipeline.queue().fetch_rows()?;
        info!("{} rows in staging sheet", rows.len().saturating_sub(1));

        let mut state = RunState::default();
        for raw in rows.into_iter().skip(1) {
            self.process_row(raw, &mut state);
        }

        let remaining_rows = self
            .pipeline
            .queue()
            .remaining_rows()
            .map_err(|e| error!("Could not count staging rows: {}", e))
            .ok();
        let remaining_folders = scanner::count_subfolders(self.staging_root)
            .map_err(|e| error!("Could not count staging folders: {}", e))
            .ok();

        let summary = RunSummary {
            started_at,
            finished_at: now(),
            moved: state.moved,
            errors: state.errors,
            remaining_rows,
            remaining_folders,
        };
        summary.log();
        Ok(summary)
    }
}

/// Planned placement for one row, no side effects
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub row: usize,
    pub folder_name: Option<String>,
    pub placement: Option<Placement>,
    pub error: Option<String>,
}

/// Classify every data row of `rows` (header first) without touching anything
pub fn preview<S: CollectionStore + ?Sized>(
    store: &S,
    base: &Path,
    staging_root: &Path,
    rows: Vec<Vec<String>>,
) -> Vec<PreviewEntry> {
    let classifier = RowClassifier::new(store, base);

    rows.into_iter()
        .enumerate()
        .skip(1)
        .map(|(row, raw)| {
            let folder_name = raw_folder_name(&raw);
            let result = prepare(raw, staging_root)
                .and_then(|(parsed, _)| classifier.classify(&parsed).map_err(IntakeError::from));
            match result {
                Ok(placement) => PreviewEntry {
                    row,
                    folder_name,
                    placement: Some(placement),
                    error: None,
                },
                Err(e) => PreviewEntry {
                    row,
                    folder_name,
                    placement: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_starts_after_header() {
        let state = RunState::default();
        assert_eq!(state.row_index, 1);
        assert_eq!(state.moved + state.errors, 0);
    }

    #[test]
    fn test_raw_folder_name() {
        let mut raw = vec![String::new(); 12];
        assert_eq!(raw_folder_name(&raw), None);
        raw[11] = "  Shell_1 ".into();
        assert_eq!(raw_folder_name(&raw).as_deref(), Some("Shell_1"));
        assert_eq!(raw_folder_name(&[]), None);
    }

    #[test]
    fn test_prepare_requires_staging_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = vec![String::new(); 21];
        raw[1] = "Field".into();
        raw[10] = "F-1".into();
        raw[11] = "Field_1".into();

        let err = prepare(raw.clone(), dir.path()).unwrap_err();
        assert!(matches!(err, IntakeError::FolderNotFound(_)));

        std::fs::create_dir(dir.path().join("Field_1")).unwrap();
        let (row, folder) = prepare(raw, dir.path()).unwrap();
        assert_eq!(row.folder_name, "Field_1");
        assert_eq!(folder, dir.path().join("Field_1"));
    }
}
