//! Side effects for one classified row
//!
//! Steps run in `Step::ORDER`. Each one reports `Done`, `Skipped` or
//! `Failed`; the first failure stops the row and nothing already done is
//! undone. Every step can be re-run on a partially processed folder.

use crate::error::{IntakeError, Result};
use crate::scanner::{self, PILSBRY_FOLDER};
use crate::sheets::{AuditLog, StagingQueue};
use crate::{thumbnail, transfer};
use serde::Serialize;
use specimen_intake_common::{ImageCategory, Placement};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    CreateFolder,
    RecordTracking,
    MovePilsbryImages,
    DuplicateOutreach,
    MoveFiles,
    DeleteStagingFolder,
    DeleteStagingRow,
}

impl Step {
    pub const ORDER: [Step; 7] = [
        Step::CreateFolder,
        Step::RecordTracking,
        Step::MovePilsbryImages,
        Step::DuplicateOutreach,
        Step::MoveFiles,
        Step::DeleteStagingFolder,
        Step::DeleteStagingRow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Step::CreateFolder => "create folder",
            Step::RecordTracking => "record tracking",
            Step::MovePilsbryImages => "move pilsbry images",
            Step::DuplicateOutreach => "duplicate to outreach",
            Step::MoveFiles => "move files",
            Step::DeleteStagingFolder => "delete staging folder",
            Step::DeleteStagingRow => "delete staging row",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    Done(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.failure().is_none()
    }

    pub fn failure(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|r| matches!(r.outcome, StepOutcome::Failed(_)))
    }

    pub fn is_done(&self, step: Step) -> bool {
        self.steps
            .iter()
            .any(|r| r.step == step && matches!(r.outcome, StepOutcome::Done(_)))
    }

    /// The failed step as an error, if any
    pub fn into_result(self) -> Result<Self> {
        if let Some(StepReport { step, outcome: StepOutcome::Failed(reason) }) = self.failure() {
            return Err(IntakeError::Transfer {
                step: step.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self)
    }
}

/// Collaborators shared by every row of a run
pub struct Pipeline<'a> {
    audit: &'a mut dyn AuditLog,
    queue: &'a mut dyn StagingQueue,
    thumbnail_width: Option<u32>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        audit: &'a mut dyn AuditLog,
        queue: &'a mut dyn StagingQueue,
        thumbnail_width: Option<u32>,
    ) -> Self {
        Self {
            audit,
            queue,
            thumbnail_width,
        }
    }

    pub fn queue(&mut self) -> &mut dyn StagingQueue {
        &mut *self.queue
    }

    /// Run every step for `placement`, whose files sit in `staging_folder`
    /// and whose sheet row is `row_index`
    pub fn execute(
        &mut self,
        placement: &Placement,
        staging_folder: &Path,
        row_index: usize,
    ) -> PipelineReport {
        let mut report = PipelineReport::default();

        for step in Step::ORDER {
            let outcome = match self.run_step(step, placement, staging_folder, row_index) {
                Ok(outcome) => outcome,
                Err(e) => StepOutcome::Failed(e.to_string()),
            };
            debug!("{}: {} -> {:?}", placement.folder_name, step, outcome);

            let failed = matches!(outcome, StepOutcome::Failed(_));
            if let StepOutcome::Failed(reason) = &outcome {
                error!("{}: {} failed: {}", placement.folder_name, step, reason);
            }
            report.steps.push(StepReport { step, outcome });
            if failed {
                break;
            }
        }

        report
    }

    fn run_step(
        &mut self,
        step: Step,
        placement: &Placement,
        staging_folder: &Path,
        row_index: usize,
    ) -> Result<StepOutcome> {
        let destination = placement.destination.to_path_buf();

        match step {
            Step::CreateFolder => {
                if transfer::create_folder(&destination)? {
                    Ok(StepOutcome::Done(destination.display().to_string()))
                } else {
                    info!("Folder already exists: {}", destination.display());
                    Ok(StepOutcome::Skipped("folder already exists".into()))
                }
            }

            Step::RecordTracking => {
                self.audit.append(&placement.tracking)?;
                Ok(StepOutcome::Done("tracking row appended".into()))
            }

            Step::MovePilsbryImages => {
                if !placement.category.has_specimen_record() {
                    return Ok(StepOutcome::Skipped(format!(
                        "no catalog images for {}",
                        placement.category
                    )));
                }
                self.move_pilsbry(staging_folder, &destination)
            }

            Step::DuplicateOutreach => match (&placement.outreach_copy, placement.category) {
                (Some(copy), ImageCategory::Specimen) => {
                    let target = copy.to_path_buf();
                    transfer::create_folder(&target)?;
                    let copied = transfer::copy_files(staging_folder, &target)?;
                    Ok(StepOutcome::Done(format!(
                        "{} files copied to {}",
                        copied.len(),
                        target.display()
                    )))
                }
                _ => Ok(StepOutcome::Skipped("not flagged for outreach".into())),
            },

            Step::MoveFiles => {
                let moved = transfer::move_files(staging_folder, &destination)?;
                Ok(StepOutcome::Done(format!("{} entries moved", moved.len())))
            }

            Step::DeleteStagingFolder => {
                if transfer::delete_folder_if_empty(staging_folder)? {
                    Ok(StepOutcome::Done(staging_folder.display().to_string()))
                } else {
                    Ok(StepOutcome::Failed(format!(
                        "{} not removed",
                        staging_folder.display()
                    )))
                }
            }

            Step::DeleteStagingRow => {
                self.queue.delete_row(row_index)?;
                Ok(StepOutcome::Done(format!("row {}", row_index)))
            }
        }
    }

    fn move_pilsbry(&self, staging_folder: &Path, destination: &Path) -> Result<StepOutcome> {
        let files = scanner::pilsbry_files(staging_folder)?;
        let pilsbry = staging_folder.join(PILSBRY_FOLDER);
        if files.is_empty() && !pilsbry.is_dir() {
            return Ok(StepOutcome::Skipped("no pilsbry folder".into()));
        }

        for file in &files {
            let Some(name) = file.file_name() else { continue };
            let target = destination.join(transfer::pilsbry_file_name(&name.to_string_lossy()));
            transfer::move_entry(file, &target)?;

            if let Some(width) = self.thumbnail_width {
                if scanner::is_image(&target) {
                    thumbnail::write_thumbnail(&target, destination, width)?;
                }
            }
        }

        if !transfer::delete_folder_if_empty(&pilsbry)? {
            warn!(
                "{} still has entries after the move; they go to the destination with the other files",
                pilsbry.display()
            );
            return Ok(StepOutcome::Done(format!(
                "{} pilsbry images, pilsbry folder kept",
                files.len()
            )));
        }
        Ok(StepOutcome::Done(format!("{} pilsbry images", files.len())))
    }
}
