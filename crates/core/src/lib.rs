//! # RM Core
//!
//! Service layer over the openEHR RM codec and the structural validator.
//!
//! This crate resolves startup configuration and exposes [`RecordService`], which validates raw
//! documents against the schema catalog and decodes them into typed RM records:
//! - [`config`]: catalog source and default wire format, resolved once at startup
//! - [`service`]: document validation and decode checks
//!
//! **No transport concerns**: the CLI (and any future server) reads the environment, builds a
//! [`CoreConfig`] and maps [`CoreError`] to its own error surface.

pub mod config;
pub mod constants;
pub mod error;
pub mod service;

pub use config::{CatalogSource, CoreConfig};
pub use error::{CoreError, CoreResult};
pub use service::{DocumentReport, RecordService};

pub use openehr::WireFormat;
pub use rm_schema::{ValidateError, ValidationError};
