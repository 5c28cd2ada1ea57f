//! Test helpers
//!
//! Fixture collection database, staging workbook and folder layout shared
//! by the integration tests.

#![allow(dead_code)]

use rusqlite::{params, Connection};
use specimen_intake::sheets::xlsx::write_sheet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const STAGING_SHEET: &str = "Form Responses 1";
pub const TRACKING_SHEET: &str = "BPBM_Images_Database";

const SCHEMA: &str = "
    CREATE TABLE spcollectionspecimen (specimennumber TEXT, occid INTEGER, specimenid INTEGER);
    CREATE TABLE omoccurrences (
        occid INTEGER PRIMARY KEY, collid INTEGER, family TEXT, sciname TEXT,
        identificationQualifier TEXT, catalognumber TEXT, fieldnumber TEXT,
        country TEXT, stateProvince TEXT, island TEXT, municipality TEXT,
        locality TEXT, typestatus TEXT, boxnumber TEXT
    );
    CREATE TABLE taxa (tid INTEGER PRIMARY KEY, sciname TEXT, rankid INTEGER);
    CREATE TABLE taxaenumtree (tid INTEGER, parenttid INTEGER);
    CREATE TABLE taxonunits (rankid INTEGER, rankname TEXT);
";

/// (tid, sciname, rankid, parent tids)
const TAXA: &[(i64, &str, i64, &[i64])] = &[
    (1, "Animalia", 10, &[]),
    (2, "Mollusca", 30, &[1]),
    (3, "Gastropoda", 60, &[1, 2]),
    (4, "Achatinellidae", 140, &[1, 2, 3]),
    (5, "Achatinellinae", 150, &[1, 2, 3, 4]),
    (6, "Achatinella", 180, &[1, 2, 3, 4, 5]),
    (7, "Achatinella mustelina", 220, &[1, 2, 3, 4, 5, 6]),
    (8, "Bivalvia", 60, &[1, 2]),
];

const RANKS: &[(i64, &str)] = &[
    (10, "Kingdom"),
    (30, "Phylum"),
    (60, "Class"),
    (140, "Family"),
    (150, "Subfamily"),
    (180, "Genus"),
    (220, "Species"),
];

#[derive(Debug, Default, Clone)]
pub struct Occurrence<'a> {
    pub occid: i64,
    pub collid: i64,
    pub family: Option<&'a str>,
    pub sciname: Option<&'a str>,
    pub qualifier: Option<&'a str>,
    pub catalog_number: Option<&'a str>,
    pub field_number: Option<&'a str>,
    pub country: Option<&'a str>,
    pub state: Option<&'a str>,
    pub island: Option<&'a str>,
    pub municipality: Option<&'a str>,
    pub locality: Option<&'a str>,
    pub type_status: Option<&'a str>,
    pub box_number: Option<&'a str>,
}

/// Create the collection schema at `path` with the fixture taxonomy loaded
pub fn create_collection_db(path: &Path) -> Connection {
    let conn = Connection::open(path).expect("open fixture db");
    conn.execute_batch(SCHEMA).expect("create schema");

    for (rankid, name) in RANKS {
        conn.execute(
            "INSERT INTO taxonunits (rankid, rankname) VALUES (?1, ?2)",
            params![rankid, name],
        )
        .unwrap();
    }
    for (tid, sciname, rankid, parents) in TAXA {
        conn.execute(
            "INSERT INTO taxa (tid, sciname, rankid) VALUES (?1, ?2, ?3)",
            params![tid, sciname, rankid],
        )
        .unwrap();
        for parent in parents.iter() {
            conn.execute(
                "INSERT INTO taxaenumtree (tid, parenttid) VALUES (?1, ?2)",
                params![tid, parent],
            )
            .unwrap();
        }
    }
    conn
}

pub fn add_occurrence(conn: &Connection, occ: &Occurrence<'_>) {
    conn.execute(
        "INSERT INTO omoccurrences (occid, collid, family, sciname, identificationQualifier,
            catalognumber, fieldnumber, country, stateProvince, island, municipality,
            locality, typestatus, boxnumber)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            occ.occid,
            occ.collid,
            occ.family,
            occ.sciname,
            occ.qualifier,
            occ.catalog_number,
            occ.field_number,
            occ.country,
            occ.state,
            occ.island,
            occ.municipality,
            occ.locality,
            occ.type_status,
            occ.box_number,
        ],
    )
    .unwrap();
}

pub fn add_specimen(conn: &Connection, specimen_number: &str, occid: i64, specimen_id: i64) {
    conn.execute(
        "INSERT INTO spcollectionspecimen (specimennumber, occid, specimenid) VALUES (?1, ?2, ?3)",
        params![specimen_number, occid, specimen_id],
    )
    .unwrap();
}

/// One staging row, built column by column
#[derive(Debug, Clone)]
pub struct RowBuilder(Vec<String>);

impl RowBuilder {
    pub fn new(category: &str, folder_name: &str) -> Self {
        let mut cells = vec![String::new(); 21];
        cells[0] = "2026-10-01 09:00:00".into();
        cells[1] = category.into();
        cells[11] = folder_name.into();
        Self(cells)
    }

    pub fn set(mut self, column: usize, value: &str) -> Self {
        self.0[column] = value.into();
        self
    }

    pub fn build(self) -> Vec<String> {
        self.0
    }
}

fn header() -> Vec<String> {
    (0..21).map(|i| format!("Question {}", i)).collect()
}

/// Scratch layout: staging + base folders, database, staging and tracking workbooks
pub struct Fixture {
    pub dir: TempDir,
    pub staging: PathBuf,
    pub base: PathBuf,
    pub db_path: PathBuf,
    pub staging_workbook: PathBuf,
    pub tracking_workbook: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let staging = dir.path().join("staging");
        let base = dir.path().join("collection");
        fs::create_dir_all(&staging).unwrap();
        fs::create_dir_all(&base).unwrap();

        Self {
            db_path: dir.path().join("collection.sqlite3"),
            staging_workbook: dir.path().join("staging.xlsx"),
            tracking_workbook: dir.path().join("tracking.xlsx"),
            staging,
            base,
            dir,
        }
    }

    pub fn db(&self) -> Connection {
        create_collection_db(&self.db_path)
    }

    /// Write the staging sheet: header plus `rows`
    pub fn write_staging(&self, rows: &[Vec<String>]) {
        let mut all = vec![header()];
        all.extend(rows.iter().cloned());
        write_sheet(&self.staging_workbook, STAGING_SHEET, &all).unwrap();
    }

    /// Staged folder holding `files` (name, bytes)
    pub fn stage_folder(&self, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let folder = self.staging.join(name);
        fs::create_dir_all(&folder).unwrap();
        for (file, bytes) in files {
            let path = folder.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, bytes).unwrap();
        }
        folder
    }
}
