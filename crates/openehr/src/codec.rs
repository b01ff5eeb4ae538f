//! Wire codec for RM record trees.
//!
//! Record types are plain serde types: the field-to-wire-name mapping is declared with serde
//! attributes, fields are written in declaration order, absent [`rm_types::Optional`] fields are
//! skipped, and union-typed fields defer to [`crate::dispatch`]. This module adds the entry
//! points and the error model on top:
//!
//! - decoding fails fast with a single, path-qualified [`DecodeError`];
//! - encoding never writes `null` for absent optionals and uses serde_json's shortest
//!   round-trip float formatting.
//!
//! JSON is the canonical wire format. YAML (the on-disk format for VPR components) is supported
//! with the same semantics.
//!
//! A `_type` tag is checked wherever it appears. At a union position it selects the variant; at
//! a concrete position it must name that record, so a document is never relabelled as another
//! model on the way through. Other keys that a record type does not model are ignored on
//! decode; the closed-world field policy is enforced by the structural validator, not here.

use crate::dispatch::{self, DispatchFailure, FailureKind};
use rm_types::WirePath;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;
use std::fmt;
use std::str::FromStr;

/// Terminal decode failure. Decoding stops at the first structural problem.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not well-formed JSON/YAML.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A value is present but of the wrong kind, a required field is missing, or a record's
    /// `_type` names another model.
    #[error("type mismatch at {path}: {message}")]
    TypeMismatch { path: WirePath, message: String },

    /// A union discriminator names a model outside that union.
    #[error("unknown {union} variant `{tag}` at {path}")]
    UnknownVariant {
        path: WirePath,
        union: &'static str,
        tag: String,
    },

    /// A union-typed value carries no (or an empty) discriminator.
    #[error("empty `_type` field for {union} at {path}")]
    MissingDiscriminator { path: WirePath, union: &'static str },
}

impl DecodeError {
    /// Path of the offending value. Syntax errors have no path.
    pub fn path(&self) -> Option<&WirePath> {
        match self {
            Self::Syntax { .. } => None,
            Self::TypeMismatch { path, .. }
            | Self::UnknownVariant { path, .. }
            | Self::MissingDiscriminator { path, .. } => Some(path),
        }
    }

    fn from_failure(outer: WirePath, failure: DispatchFailure) -> Self {
        let path = outer.join(&failure.path);
        match failure.kind {
            FailureKind::MissingDiscriminator { union } => Self::MissingDiscriminator { path, union },
            FailureKind::UnknownVariant { union, tag } => Self::UnknownVariant { path, union, tag },
            FailureKind::Mismatch { message } => Self::TypeMismatch { path, message },
        }
    }

    fn from_json(
        err: serde_path_to_error::Error<serde_json::Error>,
        failure: Option<DispatchFailure>,
    ) -> Self {
        let path = dispatch::wire_path(err.path());
        if let Some(failure) = failure {
            return Self::from_failure(path, failure);
        }
        let inner = err.into_inner();
        match inner.classify() {
            Category::Syntax | Category::Eof | Category::Io => Self::syntax(inner),
            Category::Data => Self::TypeMismatch {
                path,
                message: inner.to_string(),
            },
        }
    }

    fn from_yaml(
        err: serde_path_to_error::Error<serde_yaml::Error>,
        failure: Option<DispatchFailure>,
    ) -> Self {
        let path = dispatch::wire_path(err.path());
        match failure {
            Some(failure) => Self::from_failure(path, failure),
            None => Self::TypeMismatch {
                path,
                message: err.into_inner().to_string(),
            },
        }
    }

    fn syntax(err: serde_json::Error) -> Self {
        Self::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }

    fn yaml_syntax(err: serde_yaml::Error) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((0, 0));
        Self::Syntax {
            line,
            column,
            message: err.to_string(),
        }
    }
}

/// Encode failure. Only reachable for values serde cannot represent in the target format.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Supported wire formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unsupported wire format '{other}' (expected json or yaml)")),
        }
    }
}

/// Encodes `value` as compact JSON.
///
/// # Errors
///
/// Returns [`EncodeError::Json`] if serde_json rejects the value.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(value)?)
}

/// Encodes `value` as indented JSON.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Encodes `value` into a JSON document tree, keeping declaration order.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, EncodeError> {
    Ok(serde_json::to_value(value)?)
}

pub fn encode_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Encodes `value` in `format`.
pub fn encode_as<T: Serialize + ?Sized>(
    format: WireFormat,
    value: &T,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        WireFormat::Json => encode(value),
        WireFormat::Yaml => encode_yaml(value).map(String::into_bytes),
    }
}

/// Decodes a JSON document into `T`.
///
/// # Errors
///
/// Returns the first [`DecodeError`] encountered: malformed JSON, a value of the wrong kind
/// (including a record whose `_type` names another model), or a union with a missing or
/// unknown discriminator.
pub fn decode<T: DeserializeOwned>(input: &[u8]) -> Result<T, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_slice(input);
    let (result, failure) =
        dispatch::traced(|| serde_path_to_error::deserialize(&mut deserializer));
    let value = result.map_err(|err| DecodeError::from_json(err, failure))?;
    deserializer.end().map_err(DecodeError::syntax)?;
    Ok(value)
}

pub fn decode_str<T: DeserializeOwned>(input: &str) -> Result<T, DecodeError> {
    decode(input.as_bytes())
}

/// Decodes an already-parsed JSON document tree into `T`.
pub fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DecodeError> {
    let (result, failure) = dispatch::traced(|| serde_path_to_error::deserialize(value));
    result.map_err(|err| DecodeError::from_json(err, failure))
}

/// Decodes a YAML document into `T`.
pub fn decode_yaml<T: DeserializeOwned>(input: &str) -> Result<T, DecodeError> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(DecodeError::yaml_syntax)?;
    let (result, failure) = dispatch::traced(|| serde_path_to_error::deserialize(document));
    result.map_err(|err| DecodeError::from_yaml(err, failure))
}

/// Decodes `input` in `format` into `T`.
pub fn decode_as<T: DeserializeOwned>(format: WireFormat, input: &[u8]) -> Result<T, DecodeError> {
    match format {
        WireFormat::Json => decode(input),
        WireFormat::Yaml => decode_yaml(utf8(input)?),
    }
}

/// Parses `input` into a raw JSON document tree without decoding it into a record type.
///
/// This is the form the structural validator consumes.
pub fn parse_value(format: WireFormat, input: &[u8]) -> Result<serde_json::Value, DecodeError> {
    match format {
        WireFormat::Json => serde_json::from_slice(input).map_err(DecodeError::syntax),
        WireFormat::Yaml => {
            let document: serde_yaml::Value =
                serde_yaml::from_str(utf8(input)?).map_err(DecodeError::yaml_syntax)?;
            serde_json::to_value(document).map_err(|err| DecodeError::TypeMismatch {
                path: WirePath::root(),
                message: err.to_string(),
            })
        }
    }
}

fn utf8(input: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(input).map_err(|err| DecodeError::Syntax {
        line: 0,
        column: err.valid_up_to(),
        message: "input is not valid UTF-8".to_string(),
    })
}
