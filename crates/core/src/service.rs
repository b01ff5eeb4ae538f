//! Record service: the codec and the structural validator behind one facade.
//!
//! Transports hand raw documents to [`RecordService`] and get back either a
//! [`ValidateError`] aggregate or a [`DocumentReport`] carrying both the validation result and
//! the outcome of decoding the document into its typed record.

use crate::config::{CatalogSource, CoreConfig};
use crate::constants::MAX_DOCUMENT_BYTES;
use crate::{CoreError, CoreResult};
use openehr::registry;
use openehr::{codec, DecodeError, OpenEhrError, RmModel, WireFormat};
use rm_schema::{SchemaCatalog, ValidateError};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of [`RecordService::check_document`].
///
/// Validation and decoding are independent: a document may decode cleanly and still break a
/// catalog constraint (a regexp, say), or satisfy the catalog and fail to decode.
#[derive(Debug)]
pub struct DocumentReport {
    pub model: String,
    pub validation: ValidateError,
    /// Canonical encoding of the decoded record, or why it did not decode.
    pub decoded: Result<serde_json::Value, DecodeError>,
}

impl DocumentReport {
    /// `true` when the document both validated and decoded.
    pub fn is_clean(&self) -> bool {
        self.validation.is_empty() && self.decoded.is_ok()
    }
}

/// Validates and decodes RM documents against one schema catalog.
#[derive(Clone, Debug)]
pub struct RecordService {
    catalog: Arc<SchemaCatalog>,
    wire_format: WireFormat,
}

impl RecordService {
    /// Creates a service from resolved configuration, loading the schema catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Catalog`] if a catalog file is unreadable or rejected (unknown
    /// parents, inheritance cycles, bad regexps).
    pub fn new(cfg: &CoreConfig) -> CoreResult<Self> {
        let catalog = match cfg.schema_catalog() {
            CatalogSource::Embedded => SchemaCatalog::rm_1_1_0().clone(),
            CatalogSource::File(path) => SchemaCatalog::from_path(path)?,
        };
        tracing::info!(
            schemas = catalog.len(),
            rm_version = catalog.rm_version().unwrap_or("unknown"),
            "record service ready"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            wire_format: cfg.wire_format(),
        })
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Default wire format from configuration.
    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    /// Validates a raw document against the schema named `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if `input` is not well-formed in `format`, and
    /// [`CoreError::UnknownSchema`] if the catalog has no schema by that name. Structural
    /// problems are not errors: they are returned in the aggregate.
    pub fn validate_document(
        &self,
        input: &[u8],
        schema: &str,
        format: WireFormat,
    ) -> CoreResult<ValidateError> {
        self.require_schema(schema)?;
        let raw = parse(input, format)?;
        Ok(self.catalog.validate(&raw, schema))
    }

    /// Validates a document against the schema of `model` and decodes it as that model.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownModel`] if `model` is not a registered concrete model,
    /// [`CoreError::UnknownSchema`] if the catalog lacks its schema, and [`CoreError::Decode`]
    /// if `input` is not well-formed. Failing to decode a well-formed document is reported in
    /// [`DocumentReport::decoded`].
    pub fn check_document(
        &self,
        input: &[u8],
        model: &str,
        format: WireFormat,
    ) -> CoreResult<DocumentReport> {
        if !registry::is_concrete_model(model) {
            return Err(CoreError::UnknownModel(model.to_string()));
        }
        self.require_schema(model)?;

        let raw = parse(input, format)?;
        let validation = self.catalog.validate(&raw, model);
        let decoded = match registry::canonicalize(model, raw) {
            Ok(canonical) => Ok(canonical),
            Err(OpenEhrError::Decode(err)) => Err(err),
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = &decoded {
            tracing::debug!(model, error = %err, "document did not decode");
        }

        Ok(DocumentReport {
            model: model.to_string(),
            validation,
            decoded,
        })
    }

    /// Validates an in-memory record by encoding it and checking the result against its
    /// model's schema.
    pub fn validate_record<T: RmModel + Serialize>(&self, record: &T) -> CoreResult<ValidateError> {
        self.require_schema(T::MODEL_NAME)?;
        let raw = codec::encode_value(record)?;
        Ok(self.catalog.validate(&raw, T::MODEL_NAME))
    }

    fn require_schema(&self, schema: &str) -> CoreResult<()> {
        if self.catalog.contains(schema) {
            Ok(())
        } else {
            Err(CoreError::UnknownSchema(schema.to_string()))
        }
    }
}

fn parse(input: &[u8], format: WireFormat) -> CoreResult<serde_json::Value> {
    if input.len() > MAX_DOCUMENT_BYTES {
        return Err(CoreError::InvalidInput(format!(
            "document exceeds {MAX_DOCUMENT_BYTES} bytes"
        )));
    }
    Ok(codec::parse_value(format, input)?)
}
