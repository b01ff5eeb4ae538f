//! Model registry.
//!
//! Static tables of every concrete model and every union this crate knows, plus dynamic entry
//! points that decode by model name. The tables are generated from the type list below, so a
//! type cannot be registered under a name other than its [`RmModel::MODEL_NAME`].

use crate::codec::{self, WireFormat};
use crate::model::{RmModel, RmUnion};
use crate::rm_1_1_0::*;
use crate::OpenEhrError;

macro_rules! registry {
    (
        models { $($model:ty),+ $(,)? }
        unions { $($union:ty),+ $(,)? }
    ) => {
        /// Canonical names of every concrete model, in registration order.
        pub const MODELS: &[&str] = &[$(<$model as RmModel>::MODEL_NAME),+];

        /// Every union as `(union name, member model names)`.
        pub const UNIONS: &[(&str, &[&str])] =
            &[$((<$union as RmUnion>::UNION_NAME, <$union as RmUnion>::VARIANTS)),+];

        /// Decodes `input` as the concrete model named `model` and re-encodes it in `to`.
        ///
        /// # Errors
        ///
        /// Returns [`OpenEhrError::UnknownModel`] if `model` is not registered, otherwise any
        /// decode or encode failure.
        pub fn transcode(
            model: &str,
            input: &[u8],
            from: WireFormat,
            to: WireFormat,
        ) -> Result<Vec<u8>, OpenEhrError> {
            $(
                if model == <$model as RmModel>::MODEL_NAME {
                    let value: $model = codec::decode_as(from, input)?;
                    return Ok(codec::encode_as(to, &value)?);
                }
            )+
            Err(OpenEhrError::UnknownModel(model.to_string()))
        }

        /// Decodes a document tree as `model` and returns its canonical encoding.
        ///
        /// The canonical tree has `_type` first, keys in declaration order, no nulls and no
        /// keys the model does not declare.
        pub fn canonicalize(
            model: &str,
            raw: serde_json::Value,
        ) -> Result<serde_json::Value, OpenEhrError> {
            $(
                if model == <$model as RmModel>::MODEL_NAME {
                    let value: $model = codec::decode_value(raw)?;
                    return Ok(codec::encode_value(&value)?);
                }
            )+
            Err(OpenEhrError::UnknownModel(model.to_string()))
        }
    };
}

registry! {
    models {
        HierObjectId,
        ObjectVersionId,
        ArchetypeId,
        TemplateId,
        TerminologyId,
        GenericId,
        ObjectRef,
        PartyRef,
        LocatableRef,
        Archetyped,
        PartySelf,
        PartyIdentified,
        CodePhrase,
        DvText,
        DvCodedText,
        DvBoolean,
        DvQuantity,
        DvCount,
        DvDateTime,
        DvIdentifier,
        DvUri,
        DvEhrUri,
        Element,
        Cluster,
        ItemTree,
        ItemList,
        ItemSingle,
        EhrStatus,
        Ehr,
    }
    unions {
        ObjectId,
        UidBasedId,
        PartyProxy,
        DataValue,
        TextValue,
        UriValue,
        ObjectRefValue,
        ItemStructure,
        Item,
    }
}

pub fn is_concrete_model(name: &str) -> bool {
    MODELS.contains(&name)
}

/// Member model names of the union called `name`.
pub fn union_variants(name: &str) -> Option<&'static [&'static str]> {
    UNIONS
        .iter()
        .find(|(union, _)| *union == name)
        .map(|(_, variants)| *variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DecodeError;
    use std::collections::HashSet;

    #[test]
    fn model_names_are_unique() {
        let unique: HashSet<&str> = MODELS.iter().copied().collect();
        assert_eq!(unique.len(), MODELS.len());
        assert!(is_concrete_model("EHR_STATUS"));
        assert!(!is_concrete_model("OBJECT_ID"));
    }

    #[test]
    fn union_members_are_registered_models() {
        for (union, variants) in UNIONS {
            assert!(!variants.is_empty(), "{union} has no members");
            for variant in *variants {
                assert!(is_concrete_model(variant), "{union} member {variant} not registered");
            }
        }
        assert_eq!(
            union_variants("UID_BASED_ID"),
            Some(&["HIER_OBJECT_ID", "OBJECT_VERSION_ID"][..])
        );
        assert_eq!(
            union_variants("DV_URI"),
            Some(&["DV_URI", "DV_EHR_URI"][..])
        );
        assert_eq!(union_variants("LOCATABLE"), None);
    }

    #[test]
    fn transcodes_json_to_yaml_and_back() {
        let json = br#"{"value":"abc","_type":"HIER_OBJECT_ID"}"#;
        let yaml = transcode("HIER_OBJECT_ID", json, WireFormat::Json, WireFormat::Yaml)
            .expect("json to yaml");
        assert_eq!(
            String::from_utf8(yaml.clone()).expect("utf8"),
            "_type: HIER_OBJECT_ID\nvalue: abc\n"
        );

        let back = transcode("HIER_OBJECT_ID", &yaml, WireFormat::Yaml, WireFormat::Json)
            .expect("yaml to json");
        assert_eq!(back, br#"{"_type":"HIER_OBJECT_ID","value":"abc"}"#);
    }

    #[test]
    fn transcode_does_not_relabel_another_model() {
        let json = br#"{"_type":"OBJECT_VERSION_ID","value":"8849182c-82ad-4088-a07f-48ead4180515::example.org::1"}"#;
        let err = transcode("HIER_OBJECT_ID", json, WireFormat::Json, WireFormat::Json)
            .expect_err("tag names another model");
        assert!(matches!(
            err,
            OpenEhrError::Decode(DecodeError::TypeMismatch { ref path, .. }) if path.to_string() == "_type"
        ));

        let back = transcode("OBJECT_VERSION_ID", json, WireFormat::Json, WireFormat::Json)
            .expect("own model");
        assert_eq!(back, json);
    }

    #[test]
    fn unknown_model_is_an_error() {
        let err = transcode("COMPOSITION", b"{}", WireFormat::Json, WireFormat::Json)
            .expect_err("not modelled");
        assert!(matches!(err, OpenEhrError::UnknownModel(name) if name == "COMPOSITION"));
    }

    #[test]
    fn canonicalize_drops_nulls_and_undeclared_keys() {
        let raw = serde_json::json!({
            "is_modifiable": true,
            "is_queryable": true,
            "subject": {"_type": "PARTY_SELF", "external_ref": null},
            "name": {"_type": "DV_TEXT", "value": "EHR Status"},
            "archetype_node_id": "openEHR-EHR-EHR_STATUS.generic.v1",
            "_type": "EHR_STATUS",
            "other_details": null,
            "vendor_extension": 1
        });
        let canonical = canonicalize("EHR_STATUS", raw).expect("canonicalize");
        let keys: Vec<&str> = canonical
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            [
                "_type",
                "archetype_node_id",
                "name",
                "subject",
                "is_queryable",
                "is_modifiable"
            ]
        );
    }

    #[test]
    fn canonicalize_reports_decode_errors() {
        let err = canonicalize("PARTY_REF", serde_json::json!({"_type": "PARTY_REF"}))
            .expect_err("missing fields");
        assert!(matches!(
            err,
            OpenEhrError::Decode(DecodeError::TypeMismatch { .. })
        ));
    }
}
