use crate::error::{IntakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub folders: FolderConfig,
    pub database: DatabaseConfig,
    pub staging_sheet: SheetConfig,
    pub tracking_sheet: SheetConfig,

    /// Rewrite of the folder pathway column (e.g. WSL mount to drive letter)
    #[serde(default)]
    pub tracking_paths: Option<PathRewrite>,

    /// Width of thumbnails generated for catalog-system images
    #[serde(default)]
    pub thumbnail_width: Option<u32>,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    pub staging_folder: PathBuf,
    pub base_folder: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Collection searched by catalog number
    #[serde(default = "default_collection_id")]
    pub collection_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    pub workbook: PathBuf,
    /// Empty means the default sheet name for that workbook
    #[serde(default)]
    pub sheet: String,
}

impl SheetConfig {
    pub fn sheet_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.sheet.trim().is_empty() {
            default
        } else {
            &self.sheet
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathRewrite {
    pub strip_prefix: String,
    pub replace_with: String,
    #[serde(default)]
    pub windows_separators: bool,
}

impl PathRewrite {
    pub fn apply(&self, path: &str) -> String {
        let rewritten = match path.strip_prefix(&self.strip_prefix) {
            Some(rest) if !self.strip_prefix.is_empty() => format!("{}{}", self.replace_with, rest),
            _ => path.to_string(),
        };
        if self.windows_separators {
            rewritten.replace('/', "\\")
        } else {
            rewritten
        }
    }
}

fn default_collection_id() -> i64 {
    1
}

pub const STAGING_SHEET_NAME: &str = "Form Responses 1";
pub const TRACKING_SHEET_NAME: &str = "BPBM_Images_Database";

impl Config {
    pub fn staging_sheet_name(&self) -> &str {
        self.staging_sheet.sheet_or(STAGING_SHEET_NAME)
    }

    pub fn tracking_sheet_name(&self) -> &str {
        self.tracking_sheet.sheet_or(TRACKING_SHEET_NAME)
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            return Err(IntakeError::MissingConfig(config_path.display().to_string()));
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| IntakeError::Config(format!("{}: {}", config_path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| IntakeError::Config("no config directory for this user".into()))?;
        Ok(dir.join("specimen-intake").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.folders.staging_folder == self.folders.base_folder {
            return Err(IntakeError::Config(
                "staging_folder and base_folder must differ".into(),
            ));
        }
        if self.thumbnail_width == Some(0) {
            return Err(IntakeError::Config("thumbnail_width must be positive".into()));
        }
        Ok(())
    }

    /// Starting point written by `config --init`
    pub fn template() -> Self {
        Self {
            folders: FolderConfig {
                staging_folder: PathBuf::from("/mnt/d/Images/Staging"),
                base_folder: PathBuf::from("/mnt/d/Images/Collection"),
            },
            database: DatabaseConfig {
                path: PathBuf::from("collection.sqlite3"),
                collection_id: default_collection_id(),
            },
            staging_sheet: SheetConfig {
                workbook: PathBuf::from("staging.xlsx"),
                sheet: STAGING_SHEET_NAME.into(),
            },
            tracking_sheet: SheetConfig {
                workbook: PathBuf::from("images_database.xlsx"),
                sheet: TRACKING_SHEET_NAME.into(),
            },
            tracking_paths: Some(PathRewrite {
                strip_prefix: "/mnt/d".into(),
                replace_with: "D:".into(),
                windows_separators: true,
            }),
            thumbnail_width: None,
            log_file: Some(PathBuf::from("intake.log")),
        }
    }
}
