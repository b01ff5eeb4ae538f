//! Error types for the schema catalog and the validator.

use rm_types::WirePath;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A catalog that cannot be loaded. The whole catalog is rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read schema catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema '{0}' is defined more than once")]
    DuplicateSchema(String),

    #[error("schema '{schema}' declares attribute '{attribute}' more than once")]
    DuplicateAttribute { schema: String, attribute: String },

    #[error("schema '{schema}' inherits unknown schema '{parent}'")]
    UnknownParent { schema: String, parent: String },

    #[error("inheritance cycle: {}", .cycle.join(" -> "))]
    InheritanceCycle { cycle: Vec<String> },

    #[error("attribute '{schema}.{attribute}' has invalid type: {reason}")]
    InvalidType {
        schema: String,
        attribute: String,
        reason: String,
    },

    #[error("attribute '{schema}.{attribute}' refers to unknown schema '{target}'")]
    UnknownType {
        schema: String,
        attribute: String,
        target: String,
    },

    #[error("attribute '{schema}.{attribute}' has an invalid regexp: {source}")]
    InvalidRegex {
        schema: String,
        attribute: String,
        #[source]
        source: regex::Error,
    },

    #[error("attribute '{schema}.{attribute}' has string constraints but type {type_}")]
    ConstraintOnNonString {
        schema: String,
        attribute: String,
        type_: String,
    },
}

/// One structural problem found in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Schema being validated when the problem was found.
    pub model: String,
    pub path: WirePath,
    pub message: String,
    /// What the producer should change.
    pub recommendation: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.model, self.path, self.message)
    }
}

/// Every problem found in one validation call, in discovery order. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidateError {
    errors: Vec<ValidationError>,
}

impl ValidateError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Converts an empty aggregate into `Ok(())`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => return f.write_str("no validation errors"),
            1 => f.write_str("1 validation error")?,
            n => write!(f, "{n} validation errors")?,
        }
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidateError {}

impl From<Vec<ValidationError>> for ValidateError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidateError {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidateError {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(message: &str) -> ValidationError {
        ValidationError {
            model: "HIER_OBJECT_ID".into(),
            path: WirePath::root().key("subject").key("id"),
            message: message.into(),
            recommendation: "fix it".into(),
        }
    }

    #[test]
    fn display_lists_every_error() {
        let errors = ValidateError::from(vec![sample("first"), sample("second")]);
        let text = errors.to_string();
        assert!(text.starts_with("2 validation errors"));
        assert!(text.contains("HIER_OBJECT_ID at subject.id: first"));
        assert!(text.contains("HIER_OBJECT_ID at subject.id: second"));
    }

    #[test]
    fn serialises_as_array_with_rendered_paths() {
        let errors = ValidateError::from(vec![sample("bad")]);
        let json = serde_json::to_value(&errors).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!([{
                "model": "HIER_OBJECT_ID",
                "path": "subject.id",
                "message": "bad",
                "recommendation": "fix it"
            }])
        );
    }

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(ValidateError::new().into_result().is_ok());
        let err = ValidateError::from(vec![sample("x")])
            .into_result()
            .expect_err("not empty");
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn cycle_error_renders_the_loop() {
        let err = CatalogError::InheritanceCycle {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "inheritance cycle: A -> B -> A");
    }
}
