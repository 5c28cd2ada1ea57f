//! SQLite collection database
//!
//! Read-only `CollectionStore` over the specimen, occurrence and taxonomy
//! tables. One connection is opened per run and reused for every lookup.

use crate::error::Result;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use specimen_intake_common::{
    AncestorRank, CollectionStore, Error as CoreError, FieldLocation, Result as CoreResult,
    SpecimenHandle, SpecimenRecord,
};
use std::path::Path;
use tracing::info;

const OCCURRENCE_COLUMNS: &str = "occid, family, sciname, identificationQualifier, catalognumber, \
     fieldnumber, country, stateProvince, island, locality, typestatus";

pub struct CollectionDb {
    conn: Connection,
    collection_id: i64,
}

impl CollectionDb {
    /// Open an existing database file read-only
    pub fn open(path: &Path, collection_id: i64) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        info!("Collection database connection successful: {}", path.display());
        Ok(Self::from_connection(conn, collection_id))
    }

    pub fn from_connection(conn: Connection, collection_id: i64) -> Self {
        Self { conn, collection_id }
    }

    fn occurrences_where(
        &self,
        clause: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> CoreResult<Vec<SpecimenRecord>> {
        let sql = format!("SELECT {} FROM omoccurrences WHERE {}", OCCURRENCE_COLUMNS, clause);
        let mut stmt = self.conn.prepare(&sql).map_err(store_error)?;
        let rows = stmt
            .query_map(params, occurrence_from_row)
            .map_err(store_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_error)
    }
}

fn store_error(e: rusqlite::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

fn occurrence_from_row(row: &Row<'_>) -> rusqlite::Result<SpecimenRecord> {
    Ok(SpecimenRecord {
        occid: row.get(0)?,
        specimen_id: None,
        family: row.get(1)?,
        sciname: row.get(2)?,
        identification_qualifier: row.get(3)?,
        catalog_number: text_or_number(row, 4)?,
        field_number: text_or_number(row, 5)?,
        country: row.get(6)?,
        state_province: row.get(7)?,
        island: row.get(8)?,
        locality: row.get(9)?,
        type_status: row.get(10)?,
    })
}

/// Catalog and field numbers are loaded as text or integers depending on the
/// import that created the row.
fn text_or_number(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<String>> {
    use rusqlite::types::ValueRef;
    Ok(match row.get_ref(index)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

impl CollectionStore for CollectionDb {
    fn specimens_by_number(&self, specimen_number: &str) -> CoreResult<Vec<SpecimenHandle>> {
        let mut stmt = self
            .conn
            .prepare("SELECT occid, specimenid FROM spcollectionspecimen WHERE specimennumber = ?1")
            .map_err(store_error)?;
        let rows = stmt
            .query_map(params![specimen_number], |row| {
                Ok(SpecimenHandle {
                    occid: row.get(0)?,
                    specimen_id: row.get(1)?,
                })
            })
            .map_err(store_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_error)
    }

    fn occurrence(&self, occid: i64) -> CoreResult<Option<SpecimenRecord>> {
        Ok(self.occurrences_where("occid = ?1", params![occid])?.into_iter().next())
    }

    fn occurrences_by_catalog_number(&self, catalog_number: &str) -> CoreResult<Vec<SpecimenRecord>> {
        self.occurrences_where(
            "collid = ?1 AND CAST(catalognumber AS TEXT) = ?2",
            params![self.collection_id, catalog_number],
        )
    }

    fn occurrences_by_box_number(&self, box_number: &str) -> CoreResult<Vec<SpecimenRecord>> {
        self.occurrences_where("CAST(boxnumber AS TEXT) = ?1", params![box_number])
    }

    fn field_location(&self, field_number: &str) -> CoreResult<Option<FieldLocation>> {
        self.conn
            .query_row(
                "SELECT country, stateProvince, island, municipality, locality
                 FROM omoccurrences WHERE CAST(fieldnumber AS TEXT) = ?1 LIMIT 1",
                params![field_number],
                |row| {
                    Ok(FieldLocation {
                        country: row.get(0)?,
                        state_province: row.get(1)?,
                        island: row.get(2)?,
                        municipality: row.get(3)?,
                        locality: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(store_error)
    }

    fn taxon_id(&self, sciname: &str) -> CoreResult<Option<i64>> {
        self.conn
            .query_row(
                "SELECT tid FROM taxa WHERE sciname = ?1 LIMIT 1",
                params![sciname],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_error)
    }

    fn occurrence_family(&self, sciname: &str) -> CoreResult<Option<String>> {
        let family: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT family FROM omoccurrences WHERE sciname = ?1 LIMIT 1",
                params![sciname],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_error)?;
        Ok(family.flatten())
    }

    fn ancestors(&self, tid: i64) -> CoreResult<Vec<AncestorRank>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT tu.rankname, t.sciname
                 FROM taxaenumtree te
                 JOIN taxa t ON te.parenttid = t.tid
                 JOIN taxonunits tu ON t.rankid = tu.rankid
                 WHERE te.tid = ?1
                 ORDER BY te.parenttid DESC",
            )
            .map_err(store_error)?;
        let rows = stmt
            .query_map(params![tid], |row| {
                Ok(AncestorRank {
                    rank_name: row.get(0)?,
                    sciname: row.get(1)?,
                })
            })
            .map_err(store_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_error)
    }
}
