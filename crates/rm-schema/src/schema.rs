//! Validation schema definitions, as written in a catalog file.
//!
//! A catalog file is a JSON document:
//!
//! ```json
//! {
//!   "rm_version": "1.1.0",
//!   "schemas": [
//!     { "name": "OBJECT_ID", "abstract": true,
//!       "attributes": [ { "name": "value", "type": "string", "required": true } ] },
//!     { "name": "HIER_OBJECT_ID", "inherits": ["UID_BASED_ID"],
//!       "attributes": [ { "name": "value", "type": "string", "required": true,
//!                         "regexp": "..." } ] }
//!   ]
//! }
//! ```
//!
//! Attribute types are `string`, `boolean`, `integer`, `real`, the name of another schema, or
//! `LIST<T>` where `T` is any of those except another list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    /// RM release the catalog describes.
    #[serde(default)]
    pub rm_version: Option<String>,
    pub schemas: Vec<SchemaDef>,
}

/// One named schema. Concrete schemas correspond to concrete RM record types.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    pub name: String,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    /// Direct parents.
    #[serde(default)]
    pub inherits: Vec<String>,
    /// Attributes declared by this schema, in wire order.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub required: bool,
    /// Exact value a `string` attribute must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<String>,
    /// Pattern a `string` attribute must match in full.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
}

/// Parsed attribute type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrType {
    String,
    Boolean,
    Integer,
    Real,
    /// Another schema in the catalog, by name.
    Schema(String),
    List(Box<AttrType>),
}

impl AttrType {
    /// Parses an attribute type expression.
    ///
    /// Schema names are not checked here; the catalog does that once every schema is known.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Some(inner) = raw.strip_prefix("LIST<").and_then(|s| s.strip_suffix('>')) {
            return match Self::parse(inner)? {
                Self::List(_) => Err(format!("nested lists are not supported: '{raw}'")),
                inner => Ok(Self::List(Box::new(inner))),
            };
        }
        match raw {
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "real" => Ok(Self::Real),
            name if is_schema_name(name) => Ok(Self::Schema(name.to_string())),
            other => Err(format!("'{other}' is not a primitive, a schema name or LIST<..>")),
        }
    }

    /// Name of the schema this type refers to, directly or as a list element.
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Self::Schema(name) => Some(name),
            Self::List(inner) => inner.schema_name(),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        match self {
            Self::String => true,
            Self::List(inner) => inner.is_string(),
            _ => false,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Real => f.write_str("real"),
            Self::Schema(name) => f.write_str(name),
            Self::List(inner) => write!(f, "LIST<{inner}>"),
        }
    }
}

/// Schema names are upper-case RM class names such as `DV_CODED_TEXT`.
fn is_schema_name(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
