//! RM 1.1.0 `EHR_STATUS` and its YAML file helpers.
//!
//! `EHR_STATUS` is the component most often stored on its own (as `ehr_status.yaml`), so this
//! module carries constructors that apply the RM-required defaults and read/write helpers for
//! the YAML form.

use super::common::{Archetyped, PartySelf};
use super::constants::{DEFAULT_ARCHETYPE_NODE_ID, DEFAULT_EXTERNAL_REF_TYPE, DEFAULT_NAME};
use super::data_structures::ItemStructure;
use super::data_types::TextValue;
use super::identification::{HierObjectId, ObjectId, PartyRef, UidBasedId};
use crate::codec;
use crate::model::rm_model;
use crate::OpenEhrError;
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `EHR_STATUS`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "EHR_STATUS")]
pub struct EhrStatus {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub uid: Optional<UidBasedId>,
    pub archetype_node_id: String,
    pub name: TextValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub archetype_details: Optional<Archetyped>,
    pub subject: PartySelf,
    pub is_queryable: bool,
    pub is_modifiable: bool,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub other_details: Optional<ItemStructure>,
}

rm_model! {
    EhrStatus => "EHR_STATUS",
}

impl EhrStatus {
    /// Creates a new `EHR_STATUS` with default values for every field except the subject.
    ///
    /// The status is queryable and modifiable, carries the default archetype node id and name,
    /// and has no `other_details`.
    pub fn new(subject_ref: Option<PartyRef>) -> Self {
        Self {
            uid: Optional::absent(),
            archetype_node_id: DEFAULT_ARCHETYPE_NODE_ID.to_string(),
            name: TextValue::plain(DEFAULT_NAME),
            archetype_details: Optional::absent(),
            subject: PartySelf {
                external_ref: subject_ref.into(),
            },
            is_queryable: true,
            is_modifiable: true,
            other_details: Optional::absent(),
        }
    }

    /// Points the subject at a demographic record identified by a `HIER_OBJECT_ID`.
    pub fn with_subject(mut self, namespace: impl Into<String>, id: impl Into<String>) -> Self {
        self.subject.external_ref = Optional::present(PartyRef {
            namespace: namespace.into(),
            type_: DEFAULT_EXTERNAL_REF_TYPE.to_string(),
            id: ObjectId::HierObjectId(HierObjectId::new(id)),
        });
        self
    }
}

/// Read an RM 1.1.0 `EHR_STATUS` component from YAML.
///
/// # Errors
///
/// Returns [`OpenEhrError::Decode`] if the YAML is malformed or does not match the
/// `EHR_STATUS` wire model. The error carries the path of the offending value.
pub fn read_yaml(yaml: &str) -> Result<EhrStatus, OpenEhrError> {
    Ok(codec::decode_yaml(yaml)?)
}

/// Write an RM 1.1.0 `EHR_STATUS` component to YAML.
///
/// # Errors
///
/// Returns [`OpenEhrError::Encode`] if serialisation fails.
pub fn write_yaml(component: &EhrStatus) -> Result<String, OpenEhrError> {
    Ok(codec::encode_yaml(component)?)
}
