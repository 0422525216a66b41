//! Error handling for the briefing pipeline
//!
//! Defines the typed failures the analytics raise and establishes a unified
//! Result type using anyhow for context chaining. Every error is fatal to the
//! run: there is no partial report.

use thiserror::Error;

/// Core error types for briefing operations
#[derive(Error, Debug)]
pub enum BriefingError {
    /// Reference data absent from a joined table
    #[error("{kind} '{key}' not found")]
    MissingLookup { kind: &'static str, key: String },

    /// Unrecognised categorical value
    #[error("unsupported {field}: {value}")]
    UnsupportedValue { field: &'static str, value: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("sheet error: {0}")]
    Sheet(String),

    #[error("database error: {0}")]
    Db(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl BriefingError {
    pub fn missing(kind: &'static str, key: impl Into<String>) -> Self {
        BriefingError::MissingLookup {
            kind,
            key: key.into(),
        }
    }

    pub fn unsupported(field: &'static str, value: impl Into<String>) -> Self {
        BriefingError::UnsupportedValue {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias for briefing operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = BriefingError::missing("underlying price series", "DAX Index");
        assert_eq!(err.to_string(), "underlying price series 'DAX Index' not found");

        let err = BriefingError::unsupported("position type", "FLAT");
        assert_eq!(err.to_string(), "unsupported position type: FLAT");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(anyhow::Error::new(BriefingError::Sheet(
            "column 'GICS' missing".to_string(),
        )))
        .context("failed to load EU sectors");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to load EU sectors"));
        assert!(format!("{:?}", err).contains("column 'GICS' missing"));
    }

    #[test]
    fn test_downcast_keeps_variant() {
        let err: anyhow::Error = BriefingError::missing("sector", "99 Unknown").into();
        match err.downcast_ref::<BriefingError>() {
            Some(BriefingError::MissingLookup { kind, key }) => {
                assert_eq!(*kind, "sector");
                assert_eq!(key, "99 Unknown");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
