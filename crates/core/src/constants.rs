//! Constants used throughout the core crate.

/// Environment variable naming a schema catalog file. Empty or unset selects the embedded
/// RM 1.1.0 catalog.
pub const SCHEMA_CATALOG_ENV: &str = "RM_SCHEMA_CATALOG";

/// Environment variable selecting the default wire format (`json` or `yaml`).
pub const WIRE_FORMAT_ENV: &str = "RM_WIRE_FORMAT";

/// Largest schema catalog file accepted at startup.
pub const MAX_CATALOG_BYTES: u64 = 8 * 1024 * 1024; // 8 MiB

/// Largest document accepted by the service.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024; // 16 MiB
