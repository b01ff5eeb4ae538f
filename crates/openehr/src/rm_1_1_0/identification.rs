//! RM 1.1.0 identification package (`BASE.base_types.identification`).
//!
//! Identifiers are string-valued records. Their lexical rules (UUID forms, `::` separated
//! version ids, archetype id syntax) are constraints of the validation catalog; the helpers
//! here only split an already well-formed value into its parts.

use crate::model::{rm_model, rm_union};
use crate::OpenEhrError;
use rm_types::Optional;
use serde::{Deserialize, Serialize};

/// RM `HIER_OBJECT_ID`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "HIER_OBJECT_ID")]
pub struct HierObjectId {
    pub value: String,
}

impl HierObjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// RM `OBJECT_VERSION_ID`: `object_id::creating_system_id::version_tree_id`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "OBJECT_VERSION_ID")]
pub struct ObjectVersionId {
    pub value: String,
}

/// The three `::` separated sections of an [`ObjectVersionId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionIdParts<'a> {
    pub object_id: &'a str,
    pub creating_system_id: &'a str,
    pub version_tree_id: &'a str,
}

impl ObjectVersionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Splits the identifier into its sections.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEhrError::InvalidIdentifier`] unless the value has exactly three
    /// non-empty `::` separated sections.
    pub fn parts(&self) -> Result<VersionIdParts<'_>, OpenEhrError> {
        let invalid =
            || OpenEhrError::InvalidIdentifier(format!("OBJECT_VERSION_ID '{}'", self.value));
        let mut sections = self.value.split("::");
        let (Some(object_id), Some(creating_system_id), Some(version_tree_id), None) = (
            sections.next(),
            sections.next(),
            sections.next(),
            sections.next(),
        ) else {
            return Err(invalid());
        };
        if [object_id, creating_system_id, version_tree_id]
            .iter()
            .any(|s| s.is_empty())
        {
            return Err(invalid());
        }
        Ok(VersionIdParts {
            object_id,
            creating_system_id,
            version_tree_id,
        })
    }
}

/// RM `ARCHETYPE_ID`, for example `openEHR-EHR-EHR_STATUS.generic.v1`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "ARCHETYPE_ID")]
pub struct ArchetypeId {
    pub value: String,
}

/// Sections of an [`ArchetypeId`]: `<originator>-<rm_name>-<rm_entity>.<concept>.v<version>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeIdParts<'a> {
    /// Publishing organisation, e.g. `openEHR`.
    pub rm_originator: &'a str,
    /// RM package, e.g. `EHR`.
    pub rm_name: &'a str,
    /// Constrained RM class, e.g. `OBSERVATION`.
    pub rm_entity: &'a str,
    /// Domain concept, including any `-specialisation` suffix.
    pub concept: &'a str,
    /// Version without the leading `v`, e.g. `1` or `1.0.2`.
    pub version: &'a str,
}

impl ArchetypeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Splits the identifier into its sections.
    ///
    /// # Errors
    ///
    /// Returns [`OpenEhrError::InvalidIdentifier`] if a delimiter is missing or a section is
    /// empty.
    pub fn parts(&self) -> Result<ArchetypeIdParts<'_>, OpenEhrError> {
        let raw = self.value.as_str();
        let invalid = || OpenEhrError::InvalidIdentifier(format!("ARCHETYPE_ID '{raw}'"));

        let (qualified, rest) = raw.split_once('.').ok_or_else(invalid)?;
        let (concept, version) = rest.rsplit_once(".v").ok_or_else(invalid)?;

        let mut qualified = qualified.splitn(3, '-');
        let (Some(rm_originator), Some(rm_name), Some(rm_entity)) =
            (qualified.next(), qualified.next(), qualified.next())
        else {
            return Err(invalid());
        };

        if [rm_originator, rm_name, rm_entity, concept, version]
            .iter()
            .any(|s| s.is_empty())
        {
            return Err(invalid());
        }
        Ok(ArchetypeIdParts {
            rm_originator,
            rm_name,
            rm_entity,
            concept,
            version,
        })
    }
}

/// RM `TEMPLATE_ID`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "TEMPLATE_ID")]
pub struct TemplateId {
    pub value: String,
}

/// RM `TERMINOLOGY_ID`: `name` or `name(version)`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "TERMINOLOGY_ID")]
pub struct TerminologyId {
    pub value: String,
}

impl TerminologyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self.value.split_once('(') {
            Some((name, _)) => name,
            None => &self.value,
        }
    }

    /// Version in parentheses, if any.
    pub fn version(&self) -> Option<&str> {
        let (_, rest) = self.value.split_once('(')?;
        rest.strip_suffix(')')
    }
}

/// RM `GENERIC_ID`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "GENERIC_ID")]
pub struct GenericId {
    pub value: String,
    pub scheme: String,
}

/// RM `OBJECT_REF`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "OBJECT_REF")]
pub struct ObjectRef {
    pub namespace: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub id: ObjectId,
}

/// RM `PARTY_REF`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "PARTY_REF")]
pub struct PartyRef {
    pub namespace: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub id: ObjectId,
}

/// RM `LOCATABLE_REF`. Narrows `OBJECT_REF.id` to a `UID_BASED_ID`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(remote = "Self", tag = "_type", rename = "LOCATABLE_REF")]
pub struct LocatableRef {
    pub namespace: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub id: UidBasedId,
    #[serde(default, skip_serializing_if = "Optional::is_absent")]
    pub path: Optional<String>,
}

rm_model! {
    HierObjectId => "HIER_OBJECT_ID",
    ObjectVersionId => "OBJECT_VERSION_ID",
    ArchetypeId => "ARCHETYPE_ID",
    TemplateId => "TEMPLATE_ID",
    TerminologyId => "TERMINOLOGY_ID",
    GenericId => "GENERIC_ID",
    ObjectRef => "OBJECT_REF",
    PartyRef => "PARTY_REF",
    LocatableRef => "LOCATABLE_REF",
}

rm_union! {
    /// RM `OBJECT_ID`.
    pub enum ObjectId = "OBJECT_ID", legacy = "MetaType" {
        HierObjectId(HierObjectId),
        ObjectVersionId(ObjectVersionId),
        ArchetypeId(ArchetypeId),
        TemplateId(TemplateId),
        TerminologyId(TerminologyId),
        GenericId(GenericId),
    }
}

impl ObjectId {
    /// The identifier string, whatever the concrete kind.
    pub fn value(&self) -> &str {
        match self {
            Self::HierObjectId(id) => &id.value,
            Self::ObjectVersionId(id) => &id.value,
            Self::ArchetypeId(id) => &id.value,
            Self::TemplateId(id) => &id.value,
            Self::TerminologyId(id) => &id.value,
            Self::GenericId(id) => &id.value,
        }
    }
}

rm_union! {
    /// RM `UID_BASED_ID`.
    pub enum UidBasedId = "UID_BASED_ID" {
        HierObjectId(HierObjectId),
        ObjectVersionId(ObjectVersionId),
    }
}

impl UidBasedId {
    pub fn value(&self) -> &str {
        match self {
            Self::HierObjectId(id) => &id.value,
            Self::ObjectVersionId(id) => &id.value,
        }
    }
}

rm_union! {
    /// An `OBJECT_REF` position: the plain reference or one of its specialisations.
    pub enum ObjectRefValue = "OBJECT_REF" {
        ObjectRef(ObjectRef),
        PartyRef(PartyRef),
        LocatableRef(LocatableRef),
    }
}

impl ObjectRefValue {
    pub fn namespace(&self) -> &str {
        match self {
            Self::ObjectRef(r) => &r.namespace,
            Self::PartyRef(r) => &r.namespace,
            Self::LocatableRef(r) => &r.namespace,
        }
    }

    /// Name of the referenced RM type, e.g. `EHR_STATUS` or `PERSON`.
    pub fn ref_type(&self) -> &str {
        match self {
            Self::ObjectRef(r) => &r.type_,
            Self::PartyRef(r) => &r.type_,
            Self::LocatableRef(r) => &r.type_,
        }
    }

    pub fn id_value(&self) -> &str {
        match self {
            Self::ObjectRef(r) => r.id.value(),
            Self::PartyRef(r) => r.id.value(),
            Self::LocatableRef(r) => r.id.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, DecodeError};
    use crate::model::RmUnion;

    #[test]
    fn splits_object_version_id() {
        let id = ObjectVersionId::new("8849182c-82ad-4088-a07f-48ead4180515::example.org::2");
        let parts = id.parts().expect("well formed");
        assert_eq!(parts.object_id, "8849182c-82ad-4088-a07f-48ead4180515");
        assert_eq!(parts.creating_system_id, "example.org");
        assert_eq!(parts.version_tree_id, "2");
    }

    #[test]
    fn rejects_malformed_object_version_id() {
        for raw in ["abc", "a::b", "a::b::c::d", "a::::1"] {
            let err = ObjectVersionId::new(raw).parts().expect_err(raw);
            assert!(matches!(err, OpenEhrError::InvalidIdentifier(_)), "{raw}");
        }
    }

    #[test]
    fn splits_archetype_id() {
        let id = ArchetypeId::new("openEHR-EHR-OBSERVATION.blood_pressure-home.v1.0.2");
        let parts = id.parts().expect("well formed");
        assert_eq!(parts.rm_originator, "openEHR");
        assert_eq!(parts.rm_name, "EHR");
        assert_eq!(parts.rm_entity, "OBSERVATION");
        assert_eq!(parts.concept, "blood_pressure-home");
        assert_eq!(parts.version, "1.0.2");
    }

    #[test]
    fn rm_entity_may_contain_underscores() {
        let id = ArchetypeId::new("openEHR-EHR-EHR_STATUS.generic.v1");
        assert_eq!(id.parts().expect("well formed").rm_entity, "EHR_STATUS");
    }

    #[test]
    fn rejects_malformed_archetype_id() {
        for raw in ["openEHR-EHR", "openEHR-EHR.concept.v1", "openEHR-EHR-ELEMENT.concept"] {
            let err = ArchetypeId::new(raw).parts().expect_err(raw);
            match err {
                OpenEhrError::InvalidIdentifier(msg) => assert!(msg.contains(raw)),
                other => panic!("expected InvalidIdentifier, got {other:?}"),
            }
        }
    }

    #[test]
    fn terminology_id_name_and_version() {
        let id = TerminologyId::new("SNOMED-CT(2003)");
        assert_eq!(id.name(), "SNOMED-CT");
        assert_eq!(id.version(), Some("2003"));

        let id = TerminologyId::new("openehr");
        assert_eq!(id.name(), "openehr");
        assert_eq!(id.version(), None);
    }

    #[test]
    fn object_id_variants_match_declaration_order() {
        assert_eq!(
            ObjectId::VARIANTS,
            &[
                "HIER_OBJECT_ID",
                "OBJECT_VERSION_ID",
                "ARCHETYPE_ID",
                "TEMPLATE_ID",
                "TERMINOLOGY_ID",
                "GENERIC_ID"
            ]
        );
        assert_eq!(ObjectId::LEGACY_DISCRIMINATOR, Some("MetaType"));
        assert_eq!(UidBasedId::LEGACY_DISCRIMINATOR, None);
    }

    #[test]
    fn legacy_meta_type_is_read_but_not_written() {
        let id: ObjectId =
            codec::decode_str(r#"{"MetaType": "GENERIC_ID", "value": "123", "scheme": "nhs"}"#)
                .expect("legacy key");
        assert_eq!(id.model_name(), "GENERIC_ID");

        let json = String::from_utf8(codec::encode(&id).expect("encode")).expect("utf8");
        assert_eq!(json, r#"{"_type":"GENERIC_ID","value":"123","scheme":"nhs"}"#);
    }

    #[test]
    fn locatable_ref_round_trips_with_and_without_path() {
        let with_path = LocatableRef {
            namespace: "local".into(),
            type_: "COMPOSITION".into(),
            id: UidBasedId::ObjectVersionId(ObjectVersionId::new(
                "8849182c-82ad-4088-a07f-48ead4180515::example.org::1",
            )),
            path: Optional::present("/content[1]".into()),
        };
        let bytes = codec::encode(&with_path).expect("encode");
        assert_eq!(codec::decode::<LocatableRef>(&bytes).expect("decode"), with_path);

        let without_path = LocatableRef {
            path: Optional::absent(),
            ..with_path
        };
        let json = String::from_utf8(codec::encode(&without_path).expect("encode")).expect("utf8");
        assert!(!json.contains("path"));
        assert_eq!(
            codec::decode_str::<LocatableRef>(&json).expect("decode"),
            without_path
        );
    }

    #[test]
    fn record_rejects_a_tag_naming_another_model() {
        let input = r#"{"_type": "OBJECT_VERSION_ID", "value": "8849182c-82ad-4088-a07f-48ead4180515::example.org::1"}"#;
        match codec::decode_str::<HierObjectId>(input).expect_err("not relabelled") {
            DecodeError::TypeMismatch { path, message } => {
                assert_eq!(path.to_string(), "_type");
                assert!(message.contains("OBJECT_VERSION_ID"), "{message}");
                assert!(message.contains("expected HIER_OBJECT_ID"), "{message}");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }

        let untagged: HierObjectId = codec::decode_str(r#"{"value": "abc"}"#).expect("no tag");
        assert_eq!(untagged, HierObjectId::new("abc"));

        let err = codec::decode_str::<HierObjectId>(r#"{"_type": "", "value": "abc"}"#)
            .expect_err("empty tag");
        match err {
            DecodeError::TypeMismatch { path, message } => {
                assert_eq!(path.to_string(), "_type");
                assert!(message.contains("empty `_type` field"), "{message}");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn tag_and_body_failures_carry_paths() {
        let input = r#"{
            "_type": "LOCATABLE_REF",
            "namespace": "local",
            "type": "ELEMENT",
            "id": {"_type": "HIER_OBJECT_ID", "value": "abc"},
            "path": "/items[at0004]"
        }"#;
        match codec::decode_str::<PartyRef>(input).expect_err("locatable ref is not a party ref") {
            DecodeError::TypeMismatch { path, .. } => assert_eq!(path.to_string(), "_type"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }

        let input = r#"{
            "namespace": "local",
            "type": "ELEMENT",
            "id": {"_type": "HIER_OBJECT_ID", "value": "abc"},
            "path": {"_type": "DV_TEXT", "value": "/items"}
        }"#;
        match codec::decode_str::<LocatableRef>(input).expect_err("path is a string") {
            DecodeError::TypeMismatch { path, .. } => assert_eq!(path.to_string(), "path"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn object_ref_position_keeps_specialised_references() {
        let refs = vec![
            ObjectRefValue::from(ObjectRef {
                namespace: "local".into(),
                type_: "EHR_STATUS".into(),
                id: HierObjectId::new("a").into(),
            }),
            ObjectRefValue::from(PartyRef {
                namespace: "demographic".into(),
                type_: "PERSON".into(),
                id: GenericId {
                    value: "9434765919".into(),
                    scheme: "NHS".into(),
                }
                .into(),
            }),
            ObjectRefValue::from(LocatableRef {
                namespace: "local".into(),
                type_: "ELEMENT".into(),
                id: UidBasedId::HierObjectId(HierObjectId::new("c")),
                path: Optional::present("/items[at0004]".into()),
            }),
        ];

        for original in &refs {
            let bytes = codec::encode(original).expect("encode");
            let back: ObjectRefValue = codec::decode(&bytes).expect("decode");
            assert_eq!(&back, original);
        }

        let types: Vec<&str> = refs.iter().map(ObjectRefValue::ref_type).collect();
        assert_eq!(types, ["EHR_STATUS", "PERSON", "ELEMENT"]);
        assert_eq!(refs[1].namespace(), "demographic");
        assert_eq!(refs[2].id_value(), "c");
        assert_eq!(
            ObjectRefValue::VARIANTS,
            &["OBJECT_REF", "PARTY_REF", "LOCATABLE_REF"]
        );
    }

    #[test]
    fn value_accessors_cover_every_variant() {
        let ids = [
            ObjectId::from(HierObjectId::new("a")),
            ObjectId::from(ObjectVersionId::new("b")),
            ObjectId::from(ArchetypeId::new("c")),
            ObjectId::from(TemplateId { value: "d".into() }),
            ObjectId::from(TerminologyId::new("e")),
            ObjectId::from(GenericId {
                value: "f".into(),
                scheme: "s".into(),
            }),
        ];
        let values: Vec<&str> = ids.iter().map(ObjectId::value).collect();
        assert_eq!(values, ["a", "b", "c", "d", "e", "f"]);
    }
}
