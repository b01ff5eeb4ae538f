//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into [`RecordService`].
//! Nothing in this crate reads environment variables while handling a document; the helpers
//! below take the raw values so the binary decides where they come from.
//!
//! [`RecordService`]: crate::RecordService

use crate::constants::MAX_CATALOG_BYTES;
use crate::{CoreError, CoreResult};
use openehr::WireFormat;
use std::path::{Path, PathBuf};

/// Where the validation schema catalog comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogSource {
    /// The RM 1.1.0 catalog compiled into `rm-schema`.
    #[default]
    Embedded,
    /// A JSON catalog file on disk.
    File(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    schema_catalog: CatalogSource,
    wire_format: WireFormat,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// A file catalog source is checked here so that a bad path fails at startup rather than on
    /// first use.
    pub fn new(schema_catalog: CatalogSource, wire_format: WireFormat) -> CoreResult<Self> {
        if let CatalogSource::File(path) = &schema_catalog {
            validate_catalog_file(path)?;
        }

        Ok(Self {
            schema_catalog,
            wire_format,
        })
    }

    pub fn schema_catalog(&self) -> &CatalogSource {
        &self.schema_catalog
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }
}

/// Check that a catalog file is a readable regular file of a sensible size.
pub fn validate_catalog_file(path: &Path) -> CoreResult<()> {
    let metadata = std::fs::symlink_metadata(path).map_err(|err| {
        CoreError::InvalidConfig(format!(
            "schema catalog {} cannot be read: {err}",
            path.display()
        ))
    })?;

    if !metadata.file_type().is_file() {
        return Err(CoreError::InvalidConfig(format!(
            "schema catalog {} is not a regular file",
            path.display()
        )));
    }

    if metadata.len() > MAX_CATALOG_BYTES {
        return Err(CoreError::InvalidConfig(format!(
            "schema catalog {} exceeds {MAX_CATALOG_BYTES} bytes",
            path.display()
        )));
    }

    Ok(())
}

/// Parse the catalog source from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`CatalogSource::Embedded`].
pub fn catalog_source_from_env_value(value: Option<String>) -> CoreResult<CatalogSource> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(CatalogSource::Embedded),
        Some(path) => {
            let path = PathBuf::from(path);
            validate_catalog_file(&path)?;
            Ok(CatalogSource::File(path))
        }
    }
}

/// Parse the wire format from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns JSON.
pub fn wire_format_from_env_value(value: Option<String>) -> CoreResult<WireFormat> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| v.parse::<WireFormat>())
        .transpose()
        .map_err(CoreError::InvalidConfig)?;

    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_catalog_value_selects_embedded() {
        for value in [None, Some(String::new()), Some("   ".into())] {
            let source = catalog_source_from_env_value(value).expect("embedded");
            assert_eq!(source, CatalogSource::Embedded);
        }
    }

    #[test]
    fn catalog_value_must_name_a_regular_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = catalog_source_from_env_value(Some(dir.path().display().to_string()))
            .expect_err("directory is not a catalog");
        assert!(matches!(err, CoreError::InvalidConfig(msg) if msg.contains("not a regular file")));

        let missing = dir.path().join("missing.json");
        let err = catalog_source_from_env_value(Some(missing.display().to_string()))
            .expect_err("missing file");
        assert!(matches!(err, CoreError::InvalidConfig(_)));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"schemas": []}}"#).expect("write");
        let source =
            catalog_source_from_env_value(Some(format!(" {} ", file.path().display())))
                .expect("file source");
        assert_eq!(source, CatalogSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn oversized_catalog_is_rejected() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        file.as_file()
            .set_len(MAX_CATALOG_BYTES + 1)
            .expect("grow file");
        let err = validate_catalog_file(file.path()).expect_err("too large");
        assert!(matches!(err, CoreError::InvalidConfig(msg) if msg.contains("exceeds")));
    }

    #[test]
    fn wire_format_values() {
        assert_eq!(wire_format_from_env_value(None).expect("default"), WireFormat::Json);
        assert_eq!(
            wire_format_from_env_value(Some(" YAML ".into())).expect("yaml"),
            WireFormat::Yaml
        );
        let err = wire_format_from_env_value(Some("xml".into())).expect_err("unsupported");
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn config_checks_file_source_at_construction() {
        let err = CoreConfig::new(
            CatalogSource::File(PathBuf::from("/nonexistent/catalog.json")),
            WireFormat::Json,
        )
        .expect_err("missing catalog");
        assert!(matches!(err, CoreError::InvalidConfig(_)));

        let config = CoreConfig::new(CatalogSource::Embedded, WireFormat::Yaml).expect("config");
        assert_eq!(config.wire_format(), WireFormat::Yaml);
        assert_eq!(config.schema_catalog(), &CatalogSource::Embedded);
    }
}
