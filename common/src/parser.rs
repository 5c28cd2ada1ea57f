//! Staging row parser
//!
//! Turns one padded queue line into a `StagingRow`. Only the columns that
//! belong to the row's category are read; the rest are ignored. Required
//! raw fields are checked here so a malformed row fails before any lookup.

use crate::error::{Error, Result};
use crate::types::{CatalogKeys, ImageCategory, ImageEntry, StagingRow};

/// Fixed width of a staging row
pub const STAGING_COLUMNS: usize = 21;

/// Column positions in the form-response sheet
pub mod col {
    pub const TIMESTAMP: usize = 0;
    pub const IMAGE_TYPE: usize = 1;
    pub const TYPE_SPECIMEN_NUMBER: usize = 2;
    pub const TYPE_CATALOG_NUMBER: usize = 3;
    pub const TYPE_PLATED: usize = 4;
    pub const BOX_NUMBER: usize = 5;
    pub const SPECIMEN_SPECIMEN_NUMBER: usize = 6;
    pub const SPECIMEN_CATALOG_NUMBER: usize = 7;
    pub const SPECIMEN_PLATED: usize = 8;
    pub const SPECIMEN_TYPE: usize = 9;
    pub const FIELD_NUMBER: usize = 10;
    pub const FOLDER_NAME: usize = 11;
    pub const OUTREACH_DUPLICATE: usize = 12;
    pub const OUTREACH_TAXON: usize = 13;
    pub const OUTREACH_RANK: usize = 14;
    pub const NON_MOLLUSK_TAXON: usize = 15;
    pub const PHYLUM: usize = 16;
    pub const IDENTIFICATION_NUMBER: usize = 17;
    pub const GROUPING: usize = 18;
    pub const GROUPING_FAMILY: usize = 19;
    pub const GROUPING_GEO: usize = 20;
}

/// Right-pad a raw sheet row with empty cells to the fixed width
pub fn pad_row(mut row: Vec<String>) -> Vec<String> {
    if row.len() < STAGING_COLUMNS {
        row.resize(STAGING_COLUMNS, String::new());
    }
    row
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(row: &[String], index: usize, what: &str, category: ImageCategory) -> Result<String> {
    cell(row, index).ok_or_else(|| {
        Error::Validation(format!("{} required for {} images", what, category))
    })
}

fn catalog_keys(row: &[String], specimen: usize, catalog: usize, plated: usize) -> CatalogKeys {
    CatalogKeys {
        specimen_number: cell(row, specimen),
        catalog_number: cell(row, catalog),
        plated: cell(row, plated),
    }
}

/// Parse one staging row (already padded or not)
///
/// # Returns
/// * `Ok(StagingRow)` - category payload populated
/// * `Err(UnknownCategory)` - category column holds an unknown label
/// * `Err(Validation)` - folder name or a category's required field missing
pub fn parse_staging_row(row: &[String]) -> Result<StagingRow> {
    let category: ImageCategory = cell(row, col::IMAGE_TYPE)
        .unwrap_or_default()
        .parse()?;

    let folder_name = cell(row, col::FOLDER_NAME)
        .ok_or_else(|| Error::Validation("folder name missing".to_string()))?;

    let entry = match category {
        ImageCategory::Type => {
            let keys = catalog_keys(
                row,
                col::TYPE_SPECIMEN_NUMBER,
                col::TYPE_CATALOG_NUMBER,
                col::TYPE_PLATED,
            );
            require_catalog_key(&keys, category)?;
            ImageEntry::Type(keys)
        }
        ImageCategory::Specimen => {
            let keys = catalog_keys(
                row,
                col::SPECIMEN_SPECIMEN_NUMBER,
                col::SPECIMEN_CATALOG_NUMBER,
                col::SPECIMEN_PLATED,
            );
            require_catalog_key(&keys, category)?;
            ImageEntry::Specimen {
                keys,
                subtype: cell(row, col::SPECIMEN_TYPE),
                outreach_duplicate: cell(row, col::OUTREACH_DUPLICATE).as_deref() == Some("Yes"),
            }
        }
        ImageCategory::Captive => ImageEntry::Captive {
            box_number: required(row, col::BOX_NUMBER, "box number", category)?,
        },
        ImageCategory::Field => ImageEntry::Field {
            field_number: required(row, col::FIELD_NUMBER, "field number", category)?,
        },
        ImageCategory::NonMollusk => ImageEntry::NonMollusk {
            phylum: required(row, col::PHYLUM, "phylum", category)?,
            taxon: required(row, col::NON_MOLLUSK_TAXON, "taxon", category)?,
            identification_number: cell(row, col::IDENTIFICATION_NUMBER),
        },
        ImageCategory::Outreach => ImageEntry::Outreach {
            taxon: required(row, col::OUTREACH_TAXON, "taxon", category)?,
            rank: required(row, col::OUTREACH_RANK, "taxon rank", category)?,
        },
        ImageCategory::RepresentativePlate => {
            let grouping_family = cell(row, col::GROUPING_FAMILY);
            let grouping_geo = cell(row, col::GROUPING_GEO);
            if grouping_family.is_none() && grouping_geo.is_none() {
                return Err(Error::Validation(
                    "grouping family or grouping geography required for Representative Plate images"
                        .to_string(),
                ));
            }
            ImageEntry::RepresentativePlate {
                grouping: cell(row, col::GROUPING),
                grouping_family,
                grouping_geo,
            }
        }
    };

    Ok(StagingRow {
        submitted_at: cell(row, col::TIMESTAMP).unwrap_or_default(),
        folder_name,
        entry,
    })
}

fn require_catalog_key(keys: &CatalogKeys, category: ImageCategory) -> Result<()> {
    if keys.specimen_number.is_none() && keys.catalog_number.is_none() {
        return Err(Error::Validation(format!(
            "specimen number or catalog number required for {} images",
            category
        )));
    }
    Ok(())
}
