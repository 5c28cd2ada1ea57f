//! Specimen lookup strategies
//!
//! Each strategy takes one key and must land on exactly one occurrence:
//! zero rows is `NotFound`, two or more is `AmbiguousMatch`. Strategies are
//! tried in order; a strategy whose key is absent from the row is a miss and
//! the next one is tried. The first strategy with a key decides the outcome.

use crate::error::{Error, Result};
use crate::store::CollectionStore;
use crate::types::SpecimenRecord;

/// Institutional prefix carried by catalog numbers on the intake form
pub const CATALOG_PREFIX: &str = "BPBM";

/// Catalog number as stored in the database (prefix and whitespace removed)
pub fn strip_catalog_prefix(catalog_number: &str) -> &str {
    let trimmed = catalog_number.trim();
    trimmed.strip_prefix(CATALOG_PREFIX).unwrap_or(trimmed).trim()
}

fn exactly_one<T>(rows: Vec<T>, key: impl Fn() -> String) -> Result<T> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        (None, _) => Err(Error::NotFound(key())),
        (Some(_), count) => Err(Error::AmbiguousMatch { key: key(), count }),
    }
}

/// Resolve through the specimen table, then fetch the occurrence
pub fn by_specimen_number<S: CollectionStore + ?Sized>(
    store: &S,
    specimen_number: &str,
) -> Result<SpecimenRecord> {
    let key = || format!("specimen number {}", specimen_number);
    let handle = exactly_one(store.specimens_by_number(specimen_number.trim())?, key)?;

    let mut record = store
        .occurrence(handle.occid)?
        .ok_or_else(|| Error::NotFound(format!("occurrence {} for {}", handle.occid, key())))?;
    record.specimen_id = Some(handle.specimen_id);
    Ok(record)
}

/// Match on the bare catalog number inside the institutional collection
pub fn by_catalog_number<S: CollectionStore + ?Sized>(
    store: &S,
    catalog_number: &str,
) -> Result<SpecimenRecord> {
    let bare = strip_catalog_prefix(catalog_number);
    let key = || format!("catalog number {}", catalog_number);
    if bare.is_empty() {
        return Err(Error::NotFound(key()));
    }
    exactly_one(store.occurrences_by_catalog_number(bare)?, key)
}

/// Match on the captive rearing box
pub fn by_box_number<S: CollectionStore + ?Sized>(
    store: &S,
    box_number: &str,
) -> Result<SpecimenRecord> {
    let key = || format!("box number {}", box_number);
    exactly_one(store.occurrences_by_box_number(box_number.trim())?, key)
}

/// Keys a row can offer to the lookup chain
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupKeys<'a> {
    pub specimen_number: Option<&'a str>,
    pub catalog_number: Option<&'a str>,
    pub box_number: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    SpecimenNumber,
    CatalogNumber,
    BoxNumber,
}

impl LookupStrategy {
    /// Order used for Type and Specimen rows
    pub const CATALOGED: &'static [LookupStrategy] =
        &[LookupStrategy::SpecimenNumber, LookupStrategy::CatalogNumber];

    /// Order used for Captive rows
    pub const CAPTIVE: &'static [LookupStrategy] = &[LookupStrategy::BoxNumber];

    pub fn key<'a>(&self, keys: &LookupKeys<'a>) -> Option<&'a str> {
        let key = match self {
            LookupStrategy::SpecimenNumber => keys.specimen_number,
            LookupStrategy::CatalogNumber => keys.catalog_number,
            LookupStrategy::BoxNumber => keys.box_number,
        };
        key.filter(|k| !k.trim().is_empty())
    }

    pub fn run<S: CollectionStore + ?Sized>(&self, store: &S, key: &str) -> Result<SpecimenRecord> {
        match self {
            LookupStrategy::SpecimenNumber => by_specimen_number(store, key),
            LookupStrategy::CatalogNumber => by_catalog_number(store, key),
            LookupStrategy::BoxNumber => by_box_number(store, key),
        }
    }
}

/// Run the first strategy whose key the row supplies
pub fn lookup_specimen<S: CollectionStore + ?Sized>(
    store: &S,
    keys: &LookupKeys<'_>,
    strategies: &[LookupStrategy],
) -> Result<SpecimenRecord> {
    for strategy in strategies {
        if let Some(key) = strategy.key(keys) {
            return strategy.run(store, key);
        }
    }
    Err(Error::Validation(format!(
        "no lookup key supplied (tried {:?})",
        strategies
    )))
}

/// Cross-check a supplied catalog number against the resolved record.
///
/// Records without a stored catalog number pass.
pub fn verify_catalog_number(record: &SpecimenRecord, supplied: &str) -> Result<()> {
    let stored = match record.catalog_number.as_deref().map(str::trim) {
        Some(stored) if !stored.is_empty() => stored,
        _ => return Ok(()),
    };

    if stored != strip_catalog_prefix(supplied) {
        return Err(Error::Validation(format!(
            "catalog number mismatch (expected {}{}, given {})",
            CATALOG_PREFIX,
            stored,
            supplied.trim()
        )));
    }
    Ok(())
}
