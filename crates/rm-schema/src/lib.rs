//! Structural validation of openEHR RM documents.
//!
//! A [`SchemaCatalog`] is a set of named schemas describing the attributes each RM model may
//! carry, their types and constraints, and how models inherit from one another. The catalog for
//! RM 1.1.0 is embedded; others can be loaded from JSON files.
//!
//! [`SchemaCatalog::validate`] checks a raw JSON document against one schema and returns every
//! problem found as a [`ValidateError`]. It works on `serde_json::Value`, independently of the
//! typed records in the `openehr` crate.

pub mod catalog;
pub mod error;
pub mod schema;
mod validator;

pub use catalog::{ResolvedAttribute, ResolvedSchema, SchemaCatalog};
pub use error::{CatalogError, ValidateError, ValidationError};
pub use schema::{AttrType, AttributeDef, CatalogFile, SchemaDef};
