//! Union dispatcher.
//!
//! Decoding a field typed as an abstract RM type goes through [`deserialize_union`]:
//!
//! 1. the raw value is buffered; it must be an object;
//! 2. the discriminator is read from `_type` (or the union's legacy key);
//! 3. the union's registry maps the tag to a concrete decoder, or the decode fails with an
//!    unknown-variant error;
//! 4. the whole buffered object is decoded as the concrete type and wrapped in the enum.
//!
//! Nothing partially decoded escapes a failed dispatch.
//!
//! Concrete records go through [`deserialize_record`], which buffers the object the same way
//! and checks that a `_type` tag, when present, names the record itself. A record in a concrete
//! position is never decoded under another model's tag.
//!
//! Serde only carries error messages across `Deserialize` boundaries, so the dispatcher also
//! records *what* failed and *where* (relative to the outermost union) in a thread-local trace.
//! [`crate::codec`] opens a trace around each decode call and turns the recorded failure into a
//! typed [`crate::DecodeError`]. Outside a traced decode the recording is skipped and callers
//! see a plain serde error.

use crate::model::{RmModel, RmUnion};
use rm_types::{PathSegment, WirePath};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cell::RefCell;

/// Canonical discriminator key written by every concrete record.
pub const DISCRIMINATOR: &str = "_type";

/// Failure while decoding the body of a union member.
#[derive(Debug)]
pub struct VariantError {
    path: WirePath,
    message: String,
}

impl VariantError {
    /// Path of the failure, relative to the union's object.
    pub fn path(&self) -> &WirePath {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn describe(&self) -> String {
        if self.path.is_root() {
            self.message.clone()
        } else {
            format!("{}: {}", self.path, self.message)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FailureKind {
    MissingDiscriminator { union: &'static str },
    UnknownVariant { union: &'static str, tag: String },
    Mismatch { message: String },
}

/// A recorded dispatch failure. `path` is relative to the outermost union being decoded.
#[derive(Clone, Debug)]
pub(crate) struct DispatchFailure {
    pub(crate) kind: FailureKind,
    pub(crate) path: WirePath,
}

#[derive(Default)]
struct Trace {
    active: bool,
    failure: Option<DispatchFailure>,
}

thread_local! {
    static TRACE: RefCell<Trace> = RefCell::new(Trace::default());
}

/// Restores the previous trace when a traced decode ends, including by unwinding.
struct TraceGuard {
    previous: Option<Trace>,
}

impl TraceGuard {
    fn open() -> Self {
        let previous = TRACE.with(|trace| {
            trace.replace(Trace {
                active: true,
                failure: None,
            })
        });
        Self {
            previous: Some(previous),
        }
    }

    fn close(mut self) -> Option<DispatchFailure> {
        let previous = self.previous.take().unwrap_or_default();
        TRACE.with(|trace| trace.replace(previous)).failure
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            TRACE.with(|trace| trace.replace(previous));
        }
    }
}

/// Runs `f` with dispatch tracing enabled and returns its result with the recorded failure.
pub(crate) fn traced<T>(f: impl FnOnce() -> T) -> (T, Option<DispatchFailure>) {
    let guard = TraceGuard::open();
    let out = f();
    (out, guard.close())
}

/// Records a failure raised by this dispatcher.
///
/// The first failure wins: an inner union fails before the outer one sees the error.
fn record(kind: FailureKind, path: WirePath) {
    TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();
        if trace.active && trace.failure.is_none() {
            trace.failure = Some(DispatchFailure { kind, path });
        }
    });
}

/// Moves an inner failure outwards by one union or record level, or records a body mismatch.
fn record_variant_error(err: &VariantError) {
    TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();
        if !trace.active {
            return;
        }
        match trace.failure.as_mut() {
            Some(inner) => inner.path = err.path.join(&inner.path),
            None => {
                trace.failure = Some(DispatchFailure {
                    kind: FailureKind::Mismatch {
                        message: err.message.clone(),
                    },
                    path: err.path.clone(),
                })
            }
        }
    });
}

/// Converts a `serde_path_to_error` path into a [`WirePath`].
pub(crate) fn wire_path(path: &serde_path_to_error::Path) -> WirePath {
    path.iter()
        .map(|segment| match segment {
            serde_path_to_error::Segment::Seq { index } => PathSegment::Index(*index),
            serde_path_to_error::Segment::Map { key } => PathSegment::Key(key.clone()),
            serde_path_to_error::Segment::Enum { variant } => PathSegment::Key(variant.clone()),
            serde_path_to_error::Segment::Unknown => PathSegment::Key("?".to_string()),
        })
        .collect()
}

/// Decodes a buffered union body as the concrete type `T`.
///
/// # Errors
///
/// Returns a [`VariantError`] carrying the path inside `raw` at which decoding failed.
pub fn decode_variant<T: DeserializeOwned>(raw: Value) -> Result<T, VariantError> {
    serde_path_to_error::deserialize(raw).map_err(|err| VariantError {
        path: wire_path(err.path()),
        message: err.into_inner().to_string(),
    })
}

fn tag_at<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|tag| !tag.is_empty())
}

/// Reads the discriminator of `U` from `map`. Empty and non-string tags count as missing.
fn discriminator<U: RmUnion>(map: &Map<String, Value>) -> Option<String> {
    tag_at(map, DISCRIMINATOR)
        .or_else(|| U::LEGACY_DISCRIMINATOR.and_then(|key| tag_at(map, key)))
        .map(str::to_owned)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes a union value of type `U` from any serde deserializer.
///
/// # Errors
///
/// Fails when the input is not an object, has no discriminator, names a model outside `U`,
/// or does not decode as the named model.
pub fn deserialize_union<'de, U, D>(deserializer: D) -> Result<U, D::Error>
where
    U: RmUnion,
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let map = match raw {
        Value::Object(map) => map,
        other => {
            let message = format!(
                "invalid type: {}, expected {} object",
                json_kind(&other),
                U::UNION_NAME
            );
            record(
                FailureKind::Mismatch {
                    message: message.clone(),
                },
                WirePath::root(),
            );
            return Err(de::Error::custom(message));
        }
    };

    let Some(tag) = discriminator::<U>(&map) else {
        tracing::debug!(union = U::UNION_NAME, "union value has no discriminator");
        record(
            FailureKind::MissingDiscriminator {
                union: U::UNION_NAME,
            },
            WirePath::root().key(DISCRIMINATOR),
        );
        return Err(de::Error::custom(format!(
            "empty `{DISCRIMINATOR}` field for {}",
            U::UNION_NAME
        )));
    };

    match U::decode_variant(&tag, Value::Object(map)) {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => {
            record_variant_error(&err);
            Err(de::Error::custom(format!(
                "{tag} at {}: {}",
                err.path(),
                err.message()
            )))
        }
        None => {
            tracing::debug!(union = U::UNION_NAME, %tag, "unknown union variant");
            record(
                FailureKind::UnknownVariant {
                    union: U::UNION_NAME,
                    tag: tag.clone(),
                },
                WirePath::root(),
            );
            Err(de::Error::custom(format!(
                "unknown {} variant `{tag}`, expected one of {}",
                U::UNION_NAME,
                U::VARIANTS.join(", ")
            )))
        }
    }
}

/// Decodes a concrete record of type `T` from any serde deserializer.
///
/// `body` is the field decoder derived for `T`. A missing `_type` is accepted; a present one
/// must be a non-empty string equal to [`RmModel::MODEL_NAME`].
///
/// # Errors
///
/// Fails when the tag names another model, or when the body does not decode as `T`.
pub fn deserialize_record<'de, T, D, F>(deserializer: D, body: F) -> Result<T, D::Error>
where
    T: RmModel,
    D: Deserializer<'de>,
    F: for<'a, 'b> FnOnce(
        serde_path_to_error::Deserializer<'a, 'b, Value>,
    ) -> Result<T, serde_json::Error>,
{
    let raw = Value::deserialize(deserializer)?;
    if let Some(tag) = raw.as_object().and_then(|map| map.get(DISCRIMINATOR)) {
        let message = match tag.as_str() {
            Some(name) if name == T::MODEL_NAME => None,
            Some(name) if !name.is_empty() => {
                tracing::debug!(
                    model = T::MODEL_NAME,
                    tag = name,
                    "record tag names another model"
                );
                Some(format!("`{DISCRIMINATOR}` is {name}, expected {}", T::MODEL_NAME))
            }
            _ => Some(format!("empty `{DISCRIMINATOR}` field for {}", T::MODEL_NAME)),
        };
        if let Some(message) = message {
            record(
                FailureKind::Mismatch {
                    message: message.clone(),
                },
                WirePath::root().key(DISCRIMINATOR),
            );
            return Err(de::Error::custom(message));
        }
    }

    let mut track = serde_path_to_error::Track::new();
    let result = body(serde_path_to_error::Deserializer::new(raw, &mut track));
    result.map_err(|err| {
        let err = VariantError {
            path: wire_path(&track.path()),
            message: err.to_string(),
        };
        record_variant_error(&err);
        de::Error::custom(err.describe())
    })
}
