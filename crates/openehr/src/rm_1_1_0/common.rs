//! RM 1.1.0 common package: archetyping metadata and party proxies.

use super::constants::RM_VERSION;
use super::data_types::DvIdentifier;
use super::identification::{ArchetypeId, PartyRef, TemplateId};
use crate::model::{rm_model, rm_union};
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `ARCHETYPED`: archetype and template a `LOCATABLE` root was built from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ARCHETYPED")]
pub struct Archetyped {
    pub archetype_id: ArchetypeId,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub template_id: Optional<TemplateId>,
    pub rm_version: String,
}

impl Archetyped {
    /// Archetype details stamped with the RM version this crate models.
    pub fn new(archetype_id: ArchetypeId) -> Self {
        Self {
            archetype_id,
            template_id: Optional::absent(),
            rm_version: RM_VERSION.to_string(),
        }
    }
}

/// RM `PARTY_SELF`: the subject of the record, optionally pointing at a demographic entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "PARTY_SELF")]
pub struct PartySelf {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub external_ref: Optional<PartyRef>,
}

/// RM `PARTY_IDENTIFIED`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "PARTY_IDENTIFIED")]
pub struct PartyIdentified {
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub external_ref: Optional<PartyRef>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub name: Optional<String>,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub identifiers: Optional<Vec<DvIdentifier>>,
}

rm_model! {
    Archetyped => "ARCHETYPED",
    PartySelf => "PARTY_SELF",
    PartyIdentified => "PARTY_IDENTIFIED",
}

rm_union! {
    /// RM `PARTY_PROXY`.
    pub enum PartyProxy = "PARTY_PROXY" {
        PartySelf(PartySelf),
        PartyIdentified(PartyIdentified),
    }
}

impl PartyProxy {
    pub fn external_ref(&self) -> Option<&PartyRef> {
        match self {
            Self::PartySelf(party) => party.external_ref.get(),
            Self::PartyIdentified(party) => party.external_ref.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, DecodeError};
    use crate::rm_1_1_0::{HierObjectId, ObjectId};

    #[test]
    fn empty_party_self_encodes_only_its_type() {
        let json = String::from_utf8(codec::encode(&PartySelf::default()).expect("encode"))
            .expect("utf8");
        assert_eq!(json, r#"{"_type":"PARTY_SELF"}"#);
    }

    #[test]
    fn party_proxy_dispatches_identified() {
        let proxy: PartyProxy = codec::decode_str(
            r#"{
                "_type": "PARTY_IDENTIFIED",
                "name": "Dr Jane Smith",
                "identifiers": [
                    {"_type": "DV_IDENTIFIER", "issuer": "GMC", "id": "7654321"}
                ]
            }"#,
        )
        .expect("decode");

        match &proxy {
            PartyProxy::PartyIdentified(party) => {
                assert_eq!(party.name.as_ref().unwrap(), "Dr Jane Smith");
                assert_eq!(party.identifiers.as_ref().unwrap()[0].id, "7654321");
            }
            other => panic!("expected PARTY_IDENTIFIED, got {other:?}"),
        }
        assert!(proxy.external_ref().is_none());
    }

    #[test]
    fn party_proxy_has_no_legacy_discriminator() {
        let err = codec::decode_str::<PartyProxy>(r#"{"MetaType": "PARTY_SELF"}"#)
            .expect_err("MetaType is only an alias for OBJECT_ID and DV_TEXT");
        assert!(matches!(err, DecodeError::MissingDiscriminator { union: "PARTY_PROXY", .. }));
    }

    #[test]
    fn external_ref_is_reachable_through_the_union() {
        let party_ref = PartyRef {
            namespace: "demographic".into(),
            type_: "PERSON".into(),
            id: ObjectId::HierObjectId(HierObjectId::new("2db695ed-7cc0-4fc9-9b08-e0c738069b71")),
        };
        let proxy = PartyProxy::from(PartySelf {
            external_ref: Optional::present(party_ref.clone()),
        });
        assert_eq!(proxy.external_ref(), Some(&party_ref));
    }

    #[test]
    fn archetyped_defaults_rm_version() {
        let details = Archetyped::new(ArchetypeId::new("openEHR-EHR-EHR_STATUS.generic.v1"));
        assert_eq!(details.rm_version, "1.1.0");
        assert!(details.template_id.is_absent());
    }
}
