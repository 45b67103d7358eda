//! Error collection for design runs.
//!
//! Declarations never abort a run. Every structural, resolution and duplicate
//! problem is appended to an [`ErrorCollector`] so a single run reports the
//! whole design at once.

use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter};
use thiserror::Error;

/// Classification of a collected design error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Missing default view, empty identifier, malformed validations.
    Structural,
    /// Unknown identifiers, links to non media types, unknown attributes.
    Resolution,
    /// Identifier or name collision between two declarations.
    Duplicate,
}

/// A single failure attached to the definition that caused it.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{DslError, ErrorKind};
///
/// let err = DslError::structural(r#"media type "application/foo""#, "identifier cannot be empty");
/// assert_eq!(err.kind, ErrorKind::Structural);
/// assert_eq!(
///     err.to_string(),
///     r#"media type "application/foo": identifier cannot be empty"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{context}: {message}")]
pub struct DslError {
    /// What kind of failure this is.
    pub kind: ErrorKind,
    /// Human readable name of the offending definition.
    pub context: String,
    /// What went wrong.
    pub message: String,
}

impl DslError {
    pub fn new(kind: ErrorKind, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn structural(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, context, message)
    }

    pub fn resolution(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resolution, context, message)
    }

    pub fn duplicate(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate, context, message)
    }
}

/// A non-empty list of design errors.
///
/// Returned by `validate()` methods and by [`Design::run`](crate::Design::run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub struct MultiError {
    errors: Vec<DslError>,
}

impl MultiError {
    /// The individual failures, in the order they were found.
    pub fn errors(&self) -> &[DslError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when any failure has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}] {}", err.kind, err)?;
        }
        Ok(())
    }
}

impl IntoIterator for MultiError {
    type Item = DslError;
    type IntoIter = std::vec::IntoIter<DslError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Ordered, append-only collection of errors for one design run.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{DslError, ErrorCollector};
///
/// let mut errors = ErrorCollector::default();
/// assert!(errors.clone().into_result().is_ok());
///
/// errors.push(DslError::resolution("link \"owner\"", "unknown attribute"));
/// let err = errors.into_result().unwrap_err();
/// assert_eq!(err.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorCollector {
    errors: Vec<DslError>,
}

impl ErrorCollector {
    pub fn push(&mut self, error: DslError) {
        tracing::warn!(kind = %error.kind, context = %error.context, "{}", error.message);
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DslError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was collected, the collected errors otherwise.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(MultiError {
                errors: self.errors,
            })
        }
    }

    /// Same as [`ErrorCollector::into_result`] without consuming the collector.
    pub fn to_result(&self) -> Result<(), MultiError> {
        self.clone().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn error_kind_display_lowercase() {
        let names: Vec<String> = ErrorKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["structural", "resolution", "duplicate"]);
    }

    #[test]
    fn collector_preserves_order() {
        let mut errors = ErrorCollector::default();
        errors.push(DslError::structural("a", "first"));
        errors.push(DslError::duplicate("b", "second"));

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn multi_error_display_lists_one_error_per_line() {
        let mut errors = ErrorCollector::default();
        errors.push(DslError::structural("media type \"a\"", "no default view"));
        errors.push(DslError::resolution("link \"b\"", "unknown attribute"));

        let err = errors.into_result().unwrap_err();
        let display = err.to_string();
        let lines: Vec<&str> = display.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[structural] media type \"a\": no default view");
        assert!(err.has_kind(ErrorKind::Resolution));
        assert!(!err.has_kind(ErrorKind::Duplicate));
    }
}
