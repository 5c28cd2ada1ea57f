//! Specimen Intake Common Library
//!
//! Classification and path-derivation core of the specimen image intake
//! pipeline. Pure logic: the collection database is reached only through
//! `CollectionStore`, and nothing here touches the filesystem.

pub mod types;
pub mod error;
pub mod sanitize;
pub mod subfamily;
pub mod store;
pub mod lookup;
pub mod taxonomy;
pub mod parser;
pub mod classifier;

pub use types::{
    AncestorRank, CatalogKeys, DestinationPath, FieldLocation, ImageCategory, ImageEntry,
    Placement, SpecimenRecord, StagingRow, TaxonomyChain, TrackingRecord, TRACKING_HEADER,
};
pub use error::{Error, Result};
pub use sanitize::clean_folder_name;
pub use subfamily::achatinellid_subfamily;
pub use store::{CollectionStore, SpecimenHandle};
pub use lookup::{lookup_specimen, strip_catalog_prefix, LookupKeys, LookupStrategy};
pub use taxonomy::resolve_taxonomy;
pub use parser::{pad_row, parse_staging_row, STAGING_COLUMNS};
pub use classifier::RowClassifier;
