//! Constants for RM 1.1.0 structures.

/// RM release these types model; written to `ARCHETYPED.rm_version`.
pub const RM_VERSION: &str = "1.1.0";

/// Default archetype node ID for EHR_STATUS.
pub const DEFAULT_ARCHETYPE_NODE_ID: &str = "openEHR-EHR-EHR_STATUS.generic.v1";

/// Default name for EHR_STATUS.
pub const DEFAULT_NAME: &str = "EHR Status";

/// Default external reference type.
pub const DEFAULT_EXTERNAL_REF_TYPE: &str = "PERSON";
