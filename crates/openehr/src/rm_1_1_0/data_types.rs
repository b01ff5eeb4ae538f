//! RM 1.1.0 data types (`DATA_VALUE` and its descendants).
//!
//! Only the members used by the modelled structures are included. `DV_TEXT` positions are
//! polymorphic in the RM (a `DV_CODED_TEXT` may stand in for a `DV_TEXT`), so those fields use
//! [`TextValue`] rather than [`DvText`]. Hyperlinks are [`UriValue`] for the same reason.

use super::identification::TerminologyId;
use crate::model::{rm_model, rm_union};
use crate::OpenEhrError;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `CODE_PHRASE`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "CODE_PHRASE")]
pub struct CodePhrase {
    pub terminology_id: TerminologyId,
    pub code_string: String,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub preferred_term: Optional<String>,
}

impl CodePhrase {
    pub fn new(terminology: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            terminology_id: TerminologyId::new(terminology),
            code_string: code.into(),
            preferred_term: Optional::absent(),
        }
    }
}

/// RM `DV_TEXT`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_TEXT")]
pub struct DvText {
    pub value: String,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub hyperlink: Optional<UriValue>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub formatting: Optional<String>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub language: Optional<CodePhrase>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub encoding: Optional<CodePhrase>,
}

impl DvText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            hyperlink: Optional::absent(),
            formatting: Optional::absent(),
            language: Optional::absent(),
            encoding: Optional::absent(),
        }
    }
}

/// RM `DV_CODED_TEXT`: a `DV_TEXT` whose value is the rubric of `defining_code`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_CODED_TEXT")]
pub struct DvCodedText {
    pub value: String,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub hyperlink: Optional<UriValue>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub formatting: Optional<String>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub language: Optional<CodePhrase>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub encoding: Optional<CodePhrase>,
    pub defining_code: CodePhrase,
}

impl DvCodedText {
    pub fn new(value: impl Into<String>, defining_code: CodePhrase) -> Self {
        Self {
            value: value.into(),
            hyperlink: Optional::absent(),
            formatting: Optional::absent(),
            language: Optional::absent(),
            encoding: Optional::absent(),
            defining_code,
        }
    }
}

/// RM `DV_BOOLEAN`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_BOOLEAN")]
pub struct DvBoolean {
    pub value: bool,
}

/// RM `DV_QUANTITY`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_QUANTITY")]
pub struct DvQuantity {
    pub magnitude: f64,
    pub units: String,
    /// Number of decimal places; `-1` means unspecified.
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub precision: Optional<i64>,
}

impl DvQuantity {
    pub fn new(magnitude: f64, units: impl Into<String>) -> Self {
        Self {
            magnitude,
            units: units.into(),
            precision: Optional::absent(),
        }
    }
}

/// RM `DV_COUNT`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_COUNT")]
pub struct DvCount {
    pub magnitude: i64,
}

/// RM `DV_DATE_TIME`, held in its ISO 8601 wire form.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_DATE_TIME")]
pub struct DvDateTime {
    pub value: String,
}

impl DvDateTime {
    /// Formats `at` as extended ISO 8601 with millisecond precision.
    pub fn from_datetime(at: DateTime<FixedOffset>) -> Self {
        Self {
            value: at.to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }

    /// Parses the value as a zoned date-time.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEhrError::InvalidIdentifier`] when the value is partial (date only, no
    /// zone) or otherwise not RFC 3339.
    pub fn to_datetime(&self) -> Result<DateTime<FixedOffset>, OpenEhrError> {
        DateTime::parse_from_rfc3339(&self.value).map_err(|err| {
            OpenEhrError::InvalidIdentifier(format!("DV_DATE_TIME '{}': {err}", self.value))
        })
    }
}

/// RM `DV_IDENTIFIER`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_IDENTIFIER")]
pub struct DvIdentifier {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub issuer: Optional<String>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub assigner: Optional<String>,
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Optional::is_absent")]
    pub type_: Optional<String>,
}

/// RM `DV_URI`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_URI")]
pub struct DvUri {
    pub value: String,
}

/// RM `DV_EHR_URI`: a `DV_URI` restricted to the `ehr:` scheme.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "DV_EHR_URI")]
pub struct DvEhrUri {
    pub value: String,
}

rm_model! {
    CodePhrase => "CODE_PHRASE",
    DvText => "DV_TEXT",
    DvCodedText => "DV_CODED_TEXT",
    DvBoolean => "DV_BOOLEAN",
    DvQuantity => "DV_QUANTITY",
    DvCount => "DV_COUNT",
    DvDateTime => "DV_DATE_TIME",
    DvIdentifier => "DV_IDENTIFIER",
    DvUri => "DV_URI",
    DvEhrUri => "DV_EHR_URI",
}

rm_union! {
    /// RM `DATA_VALUE`.
    pub enum DataValue = "DATA_VALUE" {
        DvText(DvText),
        DvCodedText(DvCodedText),
        DvBoolean(DvBoolean),
        DvQuantity(DvQuantity),
        DvCount(DvCount),
        DvDateTime(DvDateTime),
        DvIdentifier(DvIdentifier),
        DvUri(DvUri),
        DvEhrUri(DvEhrUri),
    }
}

rm_union! {
    /// A `DV_TEXT` position: plain or coded text.
    pub enum TextValue = "DV_TEXT", legacy = "MetaType" {
        DvText(DvText),
        DvCodedText(DvCodedText),
    }
}

impl TextValue {
    /// Plain `DV_TEXT` with only a value.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::DvText(DvText::new(value))
    }

    pub fn value(&self) -> &str {
        match self {
            Self::DvText(text) => &text.value,
            Self::DvCodedText(text) => &text.value,
        }
    }

    /// The defining code, when the text is coded.
    pub fn defining_code(&self) -> Option<&CodePhrase> {
        match self {
            Self::DvText(_) => None,
            Self::DvCodedText(text) => Some(&text.defining_code),
        }
    }
}

rm_union! {
    /// A `DV_URI` position: any URI, or one restricted to the `ehr:` scheme.
    pub enum UriValue = "DV_URI" {
        DvUri(DvUri),
        DvEhrUri(DvEhrUri),
    }
}

impl UriValue {
    pub fn value(&self) -> &str {
        match self {
            Self::DvUri(uri) => &uri.value,
            Self::DvEhrUri(uri) => &uri.value,
        }
    }
}
