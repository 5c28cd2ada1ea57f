//! End-to-end intake runs
//!
//! Fixture database + staging workbook + staged folders, driven through
//! `Intake::run` exactly as the `run` subcommand does.

mod helpers;

use helpers::{add_occurrence, add_specimen, Fixture, Occurrence, RowBuilder, STAGING_SHEET, TRACKING_SHEET};
use image::{Rgb, RgbImage};
use specimen_intake::db::CollectionDb;
use specimen_intake::intake::{preview, Intake, RowOutcome, RunState};
use specimen_intake::pipeline::Pipeline;
use specimen_intake::sheets::xlsx::read_sheet;
use specimen_intake::sheets::{StagingQueue, XlsxAuditLog, XlsxStagingSheet};
use specimen_intake::IntakeError;
use std::fs;

fn seed(fx: &Fixture) -> CollectionDb {
    let conn = fx.db();
    add_occurrence(
        &conn,
        &Occurrence {
            occid: 10,
            collid: 1,
            family: Some("Achatinellidae"),
            sciname: Some("Achatinella mustelina"),
            catalog_number: Some("123"),
            ..Default::default()
        },
    );
    add_specimen(&conn, "S-1", 10, 555);

    for occid in [20, 21] {
        add_occurrence(
            &conn,
            &Occurrence {
                occid,
                collid: 1,
                family: Some("Achatinellidae"),
                sciname: Some("Achatinella mustelina"),
                catalog_number: Some("77"),
                ..Default::default()
            },
        );
    }

    add_occurrence(
        &conn,
        &Occurrence {
            occid: 30,
            field_number: Some("F-9"),
            country: Some("USA"),
            state: Some("Hawaii"),
            island: Some("Oahu"),
            locality: Some("Palikea"),
            ..Default::default()
        },
    );

    CollectionDb::from_connection(conn, 1)
}

fn specimen_row() -> Vec<String> {
    RowBuilder::new("Specimen", "Shell_A")
        .set(6, "S-1")
        .set(7, "BPBM123")
        .set(9, "Dorsal view")
        .set(12, "Yes")
        .build()
}

fn outreach_row() -> Vec<String> {
    RowBuilder::new("Outreach", "Outreach_X")
        .set(13, "Nonexistus")
        .set(14, "Genus")
        .build()
}

fn ambiguous_type_row() -> Vec<String> {
    RowBuilder::new("Type", "Type_B").set(3, "77").build()
}

fn field_row() -> Vec<String> {
    RowBuilder::new("Field", "Field_C").set(10, "F-9").build()
}

fn stage_all(fx: &Fixture) {
    let folder = fx.stage_folder("Shell_A", &[("a.jpg", b"a")]);
    fs::create_dir_all(folder.join("pilsbry")).unwrap();
    RgbImage::from_pixel(32, 16, Rgb([10, 20, 30]))
        .save(folder.join("pilsbry").join("p.png"))
        .unwrap();

    fx.stage_folder("Outreach_X", &[("o.jpg", b"o")]);
    fx.stage_folder("Type_B", &[("t.jpg", b"t")]);
    fx.stage_folder("Field_C", &[("f1.jpg", b"f"), ("f2.jpg", b"f")]);
}

#[test]
fn test_full_run_moves_good_rows_and_keeps_bad_ones() {
    let fx = Fixture::new();
    let db = seed(&fx);
    stage_all(&fx);
    fx.write_staging(&[specimen_row(), outreach_row(), ambiguous_type_row(), field_row()]);

    let mut staging = XlsxStagingSheet::open(&fx.staging_workbook, STAGING_SHEET).unwrap();
    let mut audit = XlsxAuditLog::new(&fx.tracking_workbook, TRACKING_SHEET, None);
    let summary = {
        let pipeline = Pipeline::new(&mut audit, &mut staging, Some(8));
        let mut intake = Intake::new(&db, &fx.base, &fx.staging, pipeline);
        intake.run().unwrap()
    };

    assert_eq!(summary.moved, 2);
    assert_eq!(summary.errors, 2);
    assert_eq!(summary.remaining_rows, Some(2));
    assert_eq!(summary.remaining_folders, Some(2));

    // Specimen: subfamily routing, subtype, pilsbry rename + thumbnail, outreach copy
    let specimen = fx
        .base
        .join("Specimen/Gastropoda/Achatinellidae/Achatinellinae/Achatinella_mustelina_BPBM123_S1/Dorsal_view");
    assert!(specimen.join("a.jpg").is_file());
    assert!(specimen.join("p_pilsbry.png").is_file());
    assert!(specimen.join("thumbnails").join("p_pilsbry.png").is_file());
    assert!(!specimen.join("pilsbry").exists());
    let outreach = fx
        .base
        .join("Outreach/Gastropoda/Achatinellidae/Achatinellinae/Achatinella_mustelina_BPBM123_S1");
    assert!(outreach.join("a.jpg").is_file());
    assert!(!fx.staging.join("Shell_A").exists());

    // Field: municipality missing, locality used
    let field = fx.base.join("Field/USA/Hawaii/Oahu/Palikea/F9");
    assert_eq!(fs::read_dir(&field).unwrap().count(), 2);
    assert!(!fx.staging.join("Field_C").exists());

    // unresolved outreach and ambiguous type: nothing created, nothing moved
    assert!(!fx.base.join("Outreach").join("Nonexistus").exists());
    assert!(!fx.base.join("Type").exists());
    assert!(fx.staging.join("Outreach_X").join("o.jpg").is_file());
    assert!(fx.staging.join("Type_B").join("t.jpg").is_file());

    // the failed rows are the ones left in the staging sheet, in order
    let left = read_sheet(&fx.staging_workbook, STAGING_SHEET).unwrap();
    assert_eq!(left.len(), 3);
    assert_eq!(left[1][11], "Outreach_X");
    assert_eq!(left[2][11], "Type_B");

    let tracking = read_sheet(&fx.tracking_workbook, TRACKING_SHEET).unwrap();
    assert_eq!(tracking.len(), 3);
    assert_eq!(tracking[0][0], "occid");
    assert_eq!(tracking[1][0], "10");
    assert_eq!(tracking[1][1], "555");
    assert_eq!(tracking[1][6], "Achatinella mustelina");
    assert_eq!(tracking[1][10], "Specimen");
    assert_eq!(tracking[1][20], specimen.display().to_string());
    assert_eq!(tracking[2][10], "Field");
}

#[test]
fn test_row_index_follows_deletions() {
    let fx = Fixture::new();
    let db = seed(&fx);
    stage_all(&fx);
    fx.write_staging(&[field_row(), outreach_row(), specimen_row()]);

    let mut staging = XlsxStagingSheet::open(&fx.staging_workbook, STAGING_SHEET).unwrap();
    let mut audit = XlsxAuditLog::new(&fx.tracking_workbook, TRACKING_SHEET, None);
    let rows = staging.fetch_rows().unwrap();

    let pipeline = Pipeline::new(&mut audit, &mut staging, None);
    let mut intake = Intake::new(&db, &fx.base, &fx.staging, pipeline);
    let mut state = RunState::default();
    let mut indices = Vec::new();

    for raw in rows.into_iter().skip(1) {
        indices.push(state.row_index);
        intake.process_row(raw, &mut state);
    }

    // deleted row 1, kept the outreach row at 1, then deleted row 2
    assert_eq!(indices, vec![1, 1, 2]);
    assert_eq!(state.row_index, 2);
    assert_eq!((state.moved, state.errors), (2, 1));
    drop(intake);

    let left = read_sheet(&fx.staging_workbook, STAGING_SHEET).unwrap();
    assert_eq!(left.len(), 2);
    assert_eq!(left[1][11], "Outreach_X");
}

#[test]
fn test_missing_staging_folder_is_counted_and_kept() {
    let fx = Fixture::new();
    let db = seed(&fx);
    fx.write_staging(&[field_row()]);

    let mut staging = XlsxStagingSheet::open(&fx.staging_workbook, STAGING_SHEET).unwrap();
    let mut audit = XlsxAuditLog::new(&fx.tracking_workbook, TRACKING_SHEET, None);
    let rows = staging.fetch_rows().unwrap();

    let pipeline = Pipeline::new(&mut audit, &mut staging, None);
    let mut intake = Intake::new(&db, &fx.base, &fx.staging, pipeline);
    let mut state = RunState::default();
    let outcome = intake.process_row(rows[1].clone(), &mut state);

    match outcome {
        RowOutcome::Skipped { folder_name, error } => {
            assert_eq!(folder_name.as_deref(), Some("Field_C"));
            assert!(matches!(error, IntakeError::FolderNotFound(_)));
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(state.errors, 1);
    assert_eq!(state.row_index, 2);
    assert!(!fx.base.join("Field").exists());
    assert!(!fx.tracking_workbook.exists());
}

#[test]
fn test_preview_has_no_side_effects() {
    let fx = Fixture::new();
    let db = seed(&fx);
    stage_all(&fx);
    fx.write_staging(&[specimen_row(), outreach_row(), field_row()]);

    let rows = read_sheet(&fx.staging_workbook, STAGING_SHEET).unwrap();
    let plan = preview(&db, &fx.base, &fx.staging, rows);

    assert_eq!(plan.len(), 3);
    assert_eq!(plan[0].row, 1);
    assert!(plan[0].placement.is_some());
    assert!(plan[1].placement.is_none());
    assert!(plan[1].error.as_deref().unwrap().contains("Nonexistus"));
    assert_eq!(
        plan[2].placement.as_ref().unwrap().destination.to_path_buf(),
        fx.base.join("Field/USA/Hawaii/Oahu/Palikea/F9")
    );

    assert!(fs::read_dir(&fx.base).unwrap().next().is_none());
    assert!(fx.staging.join("Shell_A").join("a.jpg").is_file());
    assert!(!fx.tracking_workbook.exists());
}
