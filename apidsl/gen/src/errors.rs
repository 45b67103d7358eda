//! Error types for the design exporter.

use std::path::PathBuf;

use apidsl_define::MultiError;
use thiserror::Error;

/// Errors that can occur while running and exporting a design.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No bundled design has the requested name
    #[error("Unknown design: '{name}'. Available designs: {available}")]
    UnknownDesign { name: String, available: String },

    /// The design run collected errors
    #[error("Design has {count} error(s):\n{0}", count = .0.len())]
    DesignFailed(#[from] MultiError),

    /// Failed to serialize the resolved design
    #[error("Failed to serialize design: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to write output file
    #[error("Failed to write output file '{}': {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidsl_define::{DslError, ErrorCollector};

    #[test]
    fn design_failed_lists_errors() {
        let mut errors = ErrorCollector::default();
        errors.push(DslError::structural("media type \"a\"", "identifier cannot be empty"));
        let err = GeneratorError::from(errors.into_result().unwrap_err());
        let message = err.to_string();
        assert!(message.starts_with("Design has 1 error(s):"));
        assert!(message.contains("[structural] media type \"a\": identifier cannot be empty"));
    }

    #[test]
    fn unknown_design_names_alternatives() {
        let err = GeneratorError::UnknownDesign {
            name: "x".to_string(),
            available: "cellar, org-chart".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown design: 'x'. Available designs: cellar, org-chart"
        );
    }
}
