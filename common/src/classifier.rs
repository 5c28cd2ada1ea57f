//! Row classifier & path builder
//!
//! Dispatches a parsed staging row on its image category, runs the lookup
//! that category needs, checks the category's gates and derives the
//! destination folder plus the tracking record. Nothing here touches the
//! filesystem; a returned `Placement` is a plan, not an action.
//!
//! | Category | Lookup | Path |
//! |---|---|---|
//! | Type / Specimen | specimen no., else catalog no. | `{cat}/Gastropoda/{family}[/{subfamily}]/{name}` |
//! | Captive | box no. | `Captive/{family}[/{subfamily}]/{sciname}/Box_{box}` |
//! | Field | field no. geography | `Field/{country}/{state}[/{island}]/{place}/{fieldno}` |
//! | Non-Mollusk | none | `Non-Mollusk/{phylum}/{taxon}[_{id}]` |
//! | Outreach | taxonomy | `Outreach/{class}[/{family}[/{subfamily}]]/{taxon}` |
//! | Representative Plate | none | `Representatives/{family}[_{geo}]/{folder}` |

use crate::error::{Error, Result};
use crate::lookup::{
    lookup_specimen, strip_catalog_prefix, verify_catalog_number, LookupKeys, LookupStrategy,
    CATALOG_PREFIX,
};
use crate::sanitize::{clean_folder_name, clean_opt};
use crate::store::CollectionStore;
use crate::subfamily::achatinellid_subfamily;
use crate::taxonomy::resolve_taxonomy;
use crate::types::{
    CatalogKeys, DestinationPath, ImageCategory, ImageEntry, Placement, SpecimenRecord,
    StagingRow, TrackingRecord,
};
use std::path::Path;

const MOLLUSCA: &str = "Mollusca";
const GASTROPODA: &str = "Gastropoda";
const BIVALVIA: &str = "Bivalvia";
const ACHATINELLIDAE: &str = "Achatinellidae";

/// Taxonomy taken from an occurrence record
#[derive(Debug, Clone)]
struct RecordTaxon {
    /// Scientific name with spaces as underscores
    sciname: String,
    family: Option<String>,
    subfamily: Option<&'static str>,
}

impl RecordTaxon {
    fn from_record(record: &SpecimenRecord) -> Result<Self> {
        let sciname = non_empty(record.sciname.as_deref())
            .ok_or_else(|| {
                Error::Validation(format!("occurrence {} has no scientific name", record.occid))
            })?
            .replace(' ', "_");
        let family = non_empty(record.family.as_deref()).map(str::to_string);
        let subfamily = match family.as_deref() {
            Some(ACHATINELLIDAE) => achatinellid_subfamily(&sciname),
            _ => None,
        };
        Ok(Self { sciname, family, subfamily })
    }

    /// Bare class names are filed directly under the class folder
    fn bare_class(&self) -> Option<&'static str> {
        match self.sciname.as_str() {
            GASTROPODA => Some(GASTROPODA),
            BIVALVIA => Some(BIVALVIA),
            _ => None,
        }
    }

    fn require_family(&self, context: &str) -> Result<&str> {
        self.family.as_deref().ok_or_else(|| {
            Error::Validation(format!("{}: no family in database record", context))
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `{sciname}[_{qualifier}]_BPBM{catalog}[_{specimen number}]`
fn specimen_folder_name(
    taxon: &RecordTaxon,
    record: &SpecimenRecord,
    keys: &CatalogKeys,
) -> Result<String> {
    let catalog = non_empty(record.catalog_number.as_deref())
        .or_else(|| keys.catalog_number.as_deref().map(strip_catalog_prefix))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            Error::Validation(format!("occurrence {} has no catalog number", record.occid))
        })?;
    if !catalog.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Validation(format!(
            "occurrence {} catalog number {:?} is not usable as a folder",
            record.occid, catalog
        )));
    }

    let mut name = taxon.sciname.clone();
    if let Some(qualifier) = clean_opt(record.identification_qualifier.as_deref()) {
        name.push('_');
        name.push_str(&qualifier);
    }
    name.push('_');
    name.push_str(CATALOG_PREFIX);
    name.push_str(catalog);
    if let Some(number) = clean_opt(keys.specimen_number.as_deref()) {
        name.push('_');
        name.push_str(&number);
    }
    Ok(name)
}

/// Derives destinations for staging rows against one collection store
pub struct RowClassifier<'a, S: CollectionStore + ?Sized> {
    store: &'a S,
    base: &'a Path,
}

impl<'a, S: CollectionStore + ?Sized> RowClassifier<'a, S> {
    pub fn new(store: &'a S, base: &'a Path) -> Self {
        Self { store, base }
    }

    fn root(&self, category: ImageCategory) -> DestinationPath {
        DestinationPath::new(self.base).push(category.folder())
    }

    /// Classify one row into a placement, or the reason it cannot be placed
    pub fn classify(&self, row: &StagingRow) -> Result<Placement> {
        match &row.entry {
            ImageEntry::Type(keys) => self.cataloged(row, ImageCategory::Type, keys, None, false),
            ImageEntry::Specimen {
                keys,
                subtype,
                outreach_duplicate,
            } => self.cataloged(
                row,
                ImageCategory::Specimen,
                keys,
                subtype.as_deref(),
                *outreach_duplicate,
            ),
            ImageEntry::Captive { box_number } => self.captive(row, box_number),
            ImageEntry::Field { field_number } => self.field(row, field_number),
            ImageEntry::NonMollusk {
                phylum,
                taxon,
                identification_number,
            } => self.non_mollusk(row, phylum, taxon, identification_number.as_deref()),
            ImageEntry::Outreach { taxon, rank } => self.outreach(row, taxon, rank),
            ImageEntry::RepresentativePlate {
                grouping_family,
                grouping_geo,
                ..
            } => self.representative_plate(row, grouping_family.as_deref(), grouping_geo.as_deref()),
        }
    }

    fn cataloged(
        &self,
        row: &StagingRow,
        category: ImageCategory,
        keys: &CatalogKeys,
        subtype: Option<&str>,
        outreach_duplicate: bool,
    ) -> Result<Placement> {
        let lookup_keys = LookupKeys {
            specimen_number: keys.specimen_number.as_deref(),
            catalog_number: keys.catalog_number.as_deref(),
            box_number: None,
        };
        let record = lookup_specimen(self.store, &lookup_keys, LookupStrategy::CATALOGED)?;

        if let (Some(_), Some(catalog)) = (&keys.specimen_number, &keys.catalog_number) {
            verify_catalog_number(&record, catalog)?;
        }

        let taxon = RecordTaxon::from_record(&record)?;
        let name = specimen_folder_name(&taxon, &record, keys)?;

        let (taxa_class, mut destination) = match taxon.bare_class() {
            Some(class) => (class, self.root(category).push(class).push(name.clone())),
            None => {
                let family = taxon.require_family(&name)?;
                (
                    GASTROPODA,
                    self.root(category)
                        .push(GASTROPODA)
                        .push(family)
                        .push_opt(taxon.subfamily)
                        .push(name.clone()),
                )
            }
        };

        if category == ImageCategory::Specimen {
            destination = destination.push_opt(clean_opt(subtype));
        }

        let outreach_copy = outreach_duplicate.then(|| {
            let outreach = self.root(ImageCategory::Outreach);
            match (&taxon.family, taxon.bare_class()) {
                (Some(family), _) => outreach
                    .push(GASTROPODA)
                    .push(family.as_str())
                    .push_opt(taxon.subfamily)
                    .push(name.clone()),
                (None, class) => outreach.push(class.unwrap_or(GASTROPODA)).push(name.clone()),
            }
        });

        let tracking = TrackingRecord {
            taxa_class: Some(taxa_class.to_string()),
            catalog_number: keys.catalog_number.clone(),
            specimen_number: keys.specimen_number.clone(),
            specimen_type: subtype.map(str::to_string),
            plated: keys.plated.clone(),
            ..record_tracking(&record, &taxon, category, &destination)
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category,
            destination,
            outreach_copy,
            tracking,
        })
    }

    fn captive(&self, row: &StagingRow, box_number: &str) -> Result<Placement> {
        let keys = LookupKeys {
            box_number: Some(box_number),
            ..Default::default()
        };
        let record = lookup_specimen(self.store, &keys, LookupStrategy::CAPTIVE)?;
        let taxon = RecordTaxon::from_record(&record)?;
        let family = taxon.require_family(&row.folder_name)?;
        let box_segment = clean_folder_name(box_number).ok_or_else(|| {
            Error::Validation(format!("box number {:?} is not usable as a folder", box_number))
        })?;

        let destination = self
            .root(ImageCategory::Captive)
            .push(family)
            .push_opt(taxon.subfamily)
            .push(taxon.sciname.clone())
            .push(format!("Box_{}", box_segment));

        let tracking = TrackingRecord {
            taxa_class: Some(GASTROPODA.to_string()),
            captive_rearing_box: Some(box_number.to_string()),
            ..record_tracking(&record, &taxon, ImageCategory::Captive, &destination)
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category: ImageCategory::Captive,
            destination,
            outreach_copy: None,
            tracking,
        })
    }

    fn field(&self, row: &StagingRow, field_number: &str) -> Result<Placement> {
        let location = self.store.field_location(field_number)?.ok_or_else(|| {
            Error::NotFound(format!("location data for field number {}", field_number))
        })?;

        let country = clean_opt(location.country.as_deref());
        let state = clean_opt(location.state_province.as_deref());
        let island = clean_opt(location.island.as_deref());
        let municipality = clean_opt(location.municipality.as_deref());
        let locality = clean_opt(location.locality.as_deref());

        let (Some(country), Some(state)) = (country, state) else {
            return Err(Error::Validation(format!(
                "missing country or state for field number {}",
                field_number
            )));
        };
        let Some(place) = municipality.or(locality) else {
            return Err(Error::Validation(format!(
                "missing both locality and municipality for field number {}",
                field_number
            )));
        };
        let field_segment = clean_folder_name(field_number).ok_or_else(|| {
            Error::Validation(format!("field number {:?} is not usable as a folder", field_number))
        })?;

        let destination = self
            .root(ImageCategory::Field)
            .push(country)
            .push(state)
            .push_opt(island)
            .push(place)
            .push(field_segment);

        let tracking = TrackingRecord {
            image_type: ImageCategory::Field.label().to_string(),
            field_number: Some(field_number.to_string()),
            country: location.country.clone(),
            state: location.state_province.clone(),
            island: location.island.clone(),
            locality: location.locality.clone(),
            folder_pathway: destination.to_string(),
            ..Default::default()
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category: ImageCategory::Field,
            destination,
            outreach_copy: None,
            tracking,
        })
    }

    fn non_mollusk(
        &self,
        row: &StagingRow,
        phylum: &str,
        taxon: &str,
        identification_number: Option<&str>,
    ) -> Result<Placement> {
        let (Some(phylum), Some(taxon)) = (clean_folder_name(phylum), clean_folder_name(taxon))
        else {
            return Err(Error::Validation(
                "missing required taxon or phylum for Non-Mollusk".to_string(),
            ));
        };

        let leaf = match clean_opt(identification_number) {
            Some(id) => format!("{}_{}", taxon, id),
            None => taxon.clone(),
        };
        let destination = self
            .root(ImageCategory::NonMollusk)
            .push(phylum.clone())
            .push(leaf);

        let tracking = TrackingRecord {
            phylum: Some(phylum),
            sciname: Some(taxon),
            image_type: ImageCategory::NonMollusk.label().to_string(),
            folder_pathway: destination.to_string(),
            ..Default::default()
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category: ImageCategory::NonMollusk,
            destination,
            outreach_copy: None,
            tracking,
        })
    }

    fn outreach(&self, row: &StagingRow, taxon: &str, rank: &str) -> Result<Placement> {
        let chain = resolve_taxonomy(self.store, taxon, rank)?;

        let class = non_empty(chain.get("Class"))
            .ok_or_else(|| Error::Resolution(format!("{} ({}): no class in hierarchy", taxon, rank)))?;
        let family = non_empty(chain.get("Family"));
        let subfamily = match family {
            Some(ACHATINELLIDAE) => achatinellid_subfamily(chain.get("Genus").unwrap_or("")),
            _ => None,
        };
        let leaf = clean_folder_name(taxon).ok_or_else(|| {
            Error::Validation(format!("taxon {:?} is not usable as a folder", taxon))
        })?;

        let destination = self
            .root(ImageCategory::Outreach)
            .push(class)
            .push_opt(family)
            .push_opt(subfamily)
            .push(leaf.clone());

        let tracking = TrackingRecord {
            phylum: Some(non_empty(chain.get("Phylum")).unwrap_or(MOLLUSCA).to_string()),
            taxa_class: Some(class.to_string()),
            family: family.map(str::to_string),
            subfamily: subfamily.map(str::to_string),
            sciname: Some(taxon.to_string()),
            image_type: ImageCategory::Outreach.label().to_string(),
            folder_pathway: destination.to_string(),
            ..Default::default()
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category: ImageCategory::Outreach,
            destination,
            outreach_copy: None,
            tracking,
        })
    }

    fn representative_plate(
        &self,
        row: &StagingRow,
        grouping_family: Option<&str>,
        grouping_geo: Option<&str>,
    ) -> Result<Placement> {
        let group = match (clean_opt(grouping_family), clean_opt(grouping_geo)) {
            (Some(family), Some(geo)) => format!("{}_{}", family, geo),
            (Some(single), None) | (None, Some(single)) => single,
            (None, None) => {
                return Err(Error::Validation(
                    "missing required grouping for Representative Plate".to_string(),
                ))
            }
        };
        let folder = clean_folder_name(&row.folder_name).ok_or_else(|| {
            Error::Validation(format!("folder name {:?} is not usable", row.folder_name))
        })?;

        let destination = self
            .root(ImageCategory::RepresentativePlate)
            .push(group)
            .push(folder);

        let tracking = TrackingRecord {
            image_type: ImageCategory::RepresentativePlate.label().to_string(),
            folder_pathway: destination.to_string(),
            ..Default::default()
        };

        Ok(Placement {
            folder_name: row.folder_name.clone(),
            category: ImageCategory::RepresentativePlate,
            destination,
            outreach_copy: None,
            tracking,
        })
    }
}

/// Tracking fields shared by every record-backed category
fn record_tracking(
    record: &SpecimenRecord,
    taxon: &RecordTaxon,
    category: ImageCategory,
    destination: &DestinationPath,
) -> TrackingRecord {
    TrackingRecord {
        occid: Some(record.occid),
        specimen_id: record.specimen_id,
        phylum: Some(MOLLUSCA.to_string()),
        family: taxon.family.clone(),
        subfamily: taxon.subfamily.map(str::to_string),
        sciname: Some(taxon.sciname.clone()),
        identification_qualifier: record.identification_qualifier.clone(),
        image_type: category.label().to_string(),
        type_status: record.type_status.clone(),
        field_number: record.field_number.clone(),
        country: record.country.clone(),
        state: record.state_province.clone(),
        island: record.island.clone(),
        locality: record.locality.clone(),
        folder_pathway: destination.to_string(),
        ..Default::default()
    }
}
