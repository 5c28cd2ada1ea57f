//! Query surface of the collection database
//!
//! The classifier never sees SQL; it asks a `CollectionStore` for rows and
//! applies the match-exactly-one policy itself.

use crate::error::Result;
use crate::types::{AncestorRank, FieldLocation, SpecimenRecord};

/// Identifiers resolved from the specimen-number table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecimenHandle {
    pub occid: i64,
    pub specimen_id: i64,
}

/// Read-only access to specimen, occurrence and taxonomy tables
pub trait CollectionStore {
    /// All specimen-table rows carrying this specimen number
    fn specimens_by_number(&self, specimen_number: &str) -> Result<Vec<SpecimenHandle>>;

    /// Occurrence by primary key
    fn occurrence(&self, occid: i64) -> Result<Option<SpecimenRecord>>;

    /// Occurrences in the institutional collection with this bare catalog number
    fn occurrences_by_catalog_number(&self, catalog_number: &str) -> Result<Vec<SpecimenRecord>>;

    /// Occurrences reared in this captive box
    fn occurrences_by_box_number(&self, box_number: &str) -> Result<Vec<SpecimenRecord>>;

    /// Geography of the first occurrence carrying this field number
    fn field_location(&self, field_number: &str) -> Result<Option<FieldLocation>>;

    /// Taxonomic unit id for an exact scientific name
    fn taxon_id(&self, sciname: &str) -> Result<Option<i64>>;

    /// Family recorded on an occurrence with this scientific name
    fn occurrence_family(&self, sciname: &str) -> Result<Option<String>>;

    /// Ancestors of a unit, ordered by descending ancestor id
    fn ancestors(&self, tid: i64) -> Result<Vec<AncestorRank>>;
}
