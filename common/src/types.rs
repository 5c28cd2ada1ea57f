//! Value types for one staging row's trip through the classifier
//!
//! - StagingRow: one parsed queue line, category-specific payload
//! - SpecimenRecord / FieldLocation: read-only snapshots from the collection database
//! - TaxonomyChain: rank -> scientific name, built by the taxonomy resolver
//! - DestinationPath / TrackingRecord / Placement: classifier output

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image categories offered by the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageCategory {
    Type,
    Specimen,
    Captive,
    Field,
    NonMollusk,
    Outreach,
    RepresentativePlate,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 7] = [
        ImageCategory::Type,
        ImageCategory::Specimen,
        ImageCategory::Captive,
        ImageCategory::Field,
        ImageCategory::NonMollusk,
        ImageCategory::Outreach,
        ImageCategory::RepresentativePlate,
    ];

    /// Label as it appears in the form and in the tracking sheet
    pub fn label(&self) -> &'static str {
        match self {
            ImageCategory::Type => "Type",
            ImageCategory::Specimen => "Specimen",
            ImageCategory::Captive => "Captive",
            ImageCategory::Field => "Field",
            ImageCategory::NonMollusk => "Non-Mollusk",
            ImageCategory::Outreach => "Outreach",
            ImageCategory::RepresentativePlate => "Representative Plate",
        }
    }

    /// Top-level folder under the destination root
    pub fn folder(&self) -> &'static str {
        match self {
            ImageCategory::RepresentativePlate => "Representatives",
            other => other.label(),
        }
    }

    /// Categories backed by a cataloged occurrence record
    pub fn has_specimen_record(&self) -> bool {
        matches!(
            self,
            ImageCategory::Type | ImageCategory::Specimen | ImageCategory::Captive
        )
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ImageCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ImageCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label() == s)
            .ok_or_else(|| crate::Error::UnknownCategory(s.to_string()))
    }
}

/// Keys shared by Type and Specimen rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogKeys {
    pub specimen_number: Option<String>,
    pub catalog_number: Option<String>,
    pub plated: Option<String>,
}

/// Category-specific payload of a staging row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEntry {
    Type(CatalogKeys),
    Specimen {
        keys: CatalogKeys,
        subtype: Option<String>,
        outreach_duplicate: bool,
    },
    Captive {
        box_number: String,
    },
    Field {
        field_number: String,
    },
    NonMollusk {
        phylum: String,
        taxon: String,
        identification_number: Option<String>,
    },
    Outreach {
        taxon: String,
        rank: String,
    },
    RepresentativePlate {
        grouping: Option<String>,
        grouping_family: Option<String>,
        grouping_geo: Option<String>,
    },
}

impl ImageEntry {
    pub fn category(&self) -> ImageCategory {
        match self {
            ImageEntry::Type(_) => ImageCategory::Type,
            ImageEntry::Specimen { .. } => ImageCategory::Specimen,
            ImageEntry::Captive { .. } => ImageCategory::Captive,
            ImageEntry::Field { .. } => ImageCategory::Field,
            ImageEntry::NonMollusk { .. } => ImageCategory::NonMollusk,
            ImageEntry::Outreach { .. } => ImageCategory::Outreach,
            ImageEntry::RepresentativePlate { .. } => ImageCategory::RepresentativePlate,
        }
    }
}

/// One intake record from the staging queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRow {
    /// Form submission timestamp, kept verbatim
    pub submitted_at: String,
    /// Name of the staging subfolder holding this row's images
    pub folder_name: String,
    pub entry: ImageEntry,
}

impl StagingRow {
    pub fn category(&self) -> ImageCategory {
        self.entry.category()
    }
}

/// Occurrence snapshot from the collection database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    pub occid: i64,
    /// Present only when resolved through the specimen-number table
    pub specimen_id: Option<i64>,
    pub family: Option<String>,
    pub sciname: Option<String>,
    pub identification_qualifier: Option<String>,
    pub catalog_number: Option<String>,
    pub field_number: Option<String>,
    pub country: Option<String>,
    pub state_province: Option<String>,
    pub island: Option<String>,
    pub locality: Option<String>,
    pub type_status: Option<String>,
}

/// Geography recorded against a field number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocation {
    pub country: Option<String>,
    pub state_province: Option<String>,
    pub island: Option<String>,
    pub municipality: Option<String>,
    pub locality: Option<String>,
}

/// One ancestor row from the enumeration tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorRank {
    pub rank_name: String,
    pub sciname: String,
}

/// Rank name -> scientific name, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyChain {
    entries: Vec<(String, String)>,
}

impl TaxonomyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rank unconditionally (seed entries)
    pub fn set(&mut self, rank: &str, sciname: &str) {
        match self.entries.iter_mut().find(|(r, _)| r == rank) {
            Some(entry) => entry.1 = sciname.to_string(),
            None => self.entries.push((rank.to_string(), sciname.to_string())),
        }
    }

    /// Keeps the first value seen for a rank
    pub fn insert_if_absent(&mut self, rank: &str, sciname: &str) -> bool {
        if self.get(rank).is_some() {
            return false;
        }
        self.entries.push((rank.to_string(), sciname.to_string()));
        true
    }

    pub fn get(&self, rank: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(r, _)| r == rank)
            .map(|(_, name)| name.as_str())
    }

    /// Number of ranks with a name
    pub fn rank_count(&self) -> usize {
        self.entries.len()
    }
}

/// Destination folder: root plus ordered segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPath {
    root: PathBuf,
    segments: Vec<String>,
}

impl DestinationPath {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            segments: Vec::new(),
        }
    }

    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn push_opt(self, segment: Option<impl Into<String>>) -> Self {
        match segment {
            Some(s) => self.push(s),
            None => self,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn to_path_buf(&self) -> PathBuf {
        let mut path = self.root.clone();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_buf().display())
    }
}

/// Header of the tracking sheet, one entry per TrackingRecord column
pub const TRACKING_HEADER: [&str; 21] = [
    "occid",
    "specimenid",
    "phylum",
    "class",
    "family",
    "subfamily",
    "sciname",
    "identificationQualifier",
    "catalognumber",
    "specimennumber",
    "imagetype",
    "specimentype",
    "typestatus",
    "fieldnumber",
    "captiverearingbox",
    "country",
    "stateProvince",
    "island",
    "locality",
    "plated",
    "folderpathway",
];

/// Flattened audit row appended once per moved staging folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub occid: Option<i64>,
    pub specimen_id: Option<i64>,
    pub phylum: Option<String>,
    pub taxa_class: Option<String>,
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub sciname: Option<String>,
    pub identification_qualifier: Option<String>,
    pub catalog_number: Option<String>,
    pub specimen_number: Option<String>,
    pub image_type: String,
    pub specimen_type: Option<String>,
    pub type_status: Option<String>,
    pub field_number: Option<String>,
    pub captive_rearing_box: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub island: Option<String>,
    pub locality: Option<String>,
    pub plated: Option<String>,
    pub folder_pathway: String,
}

impl TrackingRecord {
    /// Sheet cells in column order; absent values become empty strings
    pub fn to_row(&self) -> [String; 21] {
        fn s(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        fn n(v: &Option<i64>) -> String {
            v.map(|x| x.to_string()).unwrap_or_default()
        }

        [
            n(&self.occid),
            n(&self.specimen_id),
            s(&self.phylum),
            s(&self.taxa_class),
            s(&self.family),
            s(&self.subfamily),
            self.sciname
                .as_deref()
                .map(|x| x.replace('_', " "))
                .unwrap_or_default(),
            self.identification_qualifier
                .as_deref()
                .map(|x| x.replace('_', " "))
                .unwrap_or_default(),
            s(&self.catalog_number),
            s(&self.specimen_number),
            self.image_type.clone(),
            s(&self.specimen_type),
            s(&self.type_status),
            s(&self.field_number),
            s(&self.captive_rearing_box),
            s(&self.country),
            s(&self.state),
            s(&self.island),
            s(&self.locality),
            s(&self.plated),
            self.folder_pathway.clone(),
        ]
    }
}

/// Everything the side-effect pipeline needs for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub folder_name: String,
    pub category: ImageCategory,
    pub destination: DestinationPath,
    /// Parallel Outreach folder for Specimen rows flagged for duplication
    pub outreach_copy: Option<DestinationPath>,
    pub tracking: TrackingRecord,
}
