//! Error types for the classification core

use thiserror::Error;

/// Errors raised while classifying a single staging row
#[derive(Error, Debug)]
pub enum Error {
    #[error("no matching record: {0}")]
    NotFound(String),

    #[error("multiple records match {key}: {count} found")]
    AmbiguousMatch { key: String, count: usize },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("taxonomy could not be resolved: {0}")]
    Resolution(String),

    #[error("unknown image category: {0}")]
    UnknownCategory(String),

    #[error("collection store error: {0}")]
    Store(String),
}

impl Error {
    /// True for errors that come from the row's own data rather than from
    /// the backing store.
    pub fn is_row_local(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}

/// Result alias for the core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_ambiguous() {
        let error = Error::AmbiguousMatch {
            key: "specimen number 77".to_string(),
            count: 2,
        };
        let display = format!("{}", error);
        assert_eq!(display, "multiple records match specimen number 77: 2 found");
    }

    #[test]
    fn test_error_display_validation() {
        let error = Error::Validation("box number required".to_string());
        assert_eq!(format!("{}", error), "validation failed: box number required");
    }

    #[test]
    fn test_row_local() {
        assert!(Error::NotFound("x".into()).is_row_local());
        assert!(Error::Resolution("x".into()).is_row_local());
        assert!(!Error::Store("connection reset".into()).is_row_local());
    }
}
