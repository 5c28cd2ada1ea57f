use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no config file at {0}; run `specimen-intake config --init` to create one")]
    MissingConfig(String),

    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("spreadsheet error: {0}")]
    Sheet(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("step {step} failed: {reason}")]
    Transfer { step: String, reason: String },

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] specimen_intake_common::Error),
}

impl From<calamine::Error> for IntakeError {
    fn from(e: calamine::Error) -> Self {
        IntakeError::Sheet(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IntakeError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        IntakeError::Sheet(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
