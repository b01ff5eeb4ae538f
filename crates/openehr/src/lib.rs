//! openEHR Reference Model wire support.
//!
//! This crate models a subset of the openEHR RM 1.1.0 and translates it to and from its wire
//! forms (canonical JSON, and YAML for on-disk components).
//!
//! - [`rm_1_1_0`]: concrete record types and the unions over them.
//! - [`model`]: the [`RmModel`] / [`RmUnion`] traits tying Rust types to RM model names.
//! - [`dispatch`]: decoding of union-typed positions by `_type` discriminator.
//! - [`codec`]: encode/decode entry points and the decode error model.
//! - [`registry`]: tables of every registered model and union, and decode-by-name helpers.
//!
//! Structural validation against the RM schema catalog lives in `rm-schema`.

pub mod codec;
pub mod dispatch;
pub mod model;
pub mod registry;
pub mod rm_1_1_0;

pub use codec::{DecodeError, EncodeError, WireFormat};
pub use model::{RmModel, RmUnion};
pub use rm_types::{Optional, WirePath};

use thiserror::Error;

/// Errors returned by the `openehr` crate outside the plain codec entry points.
#[derive(Debug, Error)]
pub enum OpenEhrError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("unknown RM model '{0}'")]
    UnknownModel(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Read an RM 1.1.0 `EHR_STATUS` component from YAML.
pub fn read_ehr_status_yaml(yaml: &str) -> Result<rm_1_1_0::EhrStatus, OpenEhrError> {
    rm_1_1_0::ehr_status::read_yaml(yaml)
}

/// Write an RM 1.1.0 `EHR_STATUS` component to YAML.
pub fn write_ehr_status_yaml(component: &rm_1_1_0::EhrStatus) -> Result<String, OpenEhrError> {
    rm_1_1_0::ehr_status::write_yaml(component)
}
