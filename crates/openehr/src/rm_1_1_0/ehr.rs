//! RM 1.1.0 `EHR`: the root object of a patient record, referencing its top-level versioned
//! objects.

use super::data_types::DvDateTime;
use super::identification::{HierObjectId, ObjectRefValue};
use crate::model::rm_model;
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `EHR`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "EHR")]
pub struct Ehr {
    pub system_id: HierObjectId,
    pub ehr_id: HierObjectId,
    pub time_created: DvDateTime,
    pub ehr_status: ObjectRefValue,
    pub ehr_access: ObjectRefValue,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub contributions: Optional<Vec<ObjectRefValue>>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub compositions: Optional<Vec<ObjectRefValue>>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub directory: Optional<ObjectRefValue>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub folders: Optional<Vec<ObjectRefValue>>,
}

rm_model! {
    Ehr => "EHR",
}
