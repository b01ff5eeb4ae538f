//! Structural validator.
//!
//! Walks a raw JSON document against a schema from the catalog and collects every problem
//! found. Validation never stops early and never fails as a call: the result is a (possibly
//! empty) [`ValidateError`].

use crate::catalog::{ResolvedAttribute, ResolvedSchema, SchemaCatalog};
use crate::error::{ValidateError, ValidationError};
use crate::schema::AttrType;
use rm_types::WirePath;
use serde_json::{Map, Value};

const DISCRIMINATOR: &str = "_type";

impl SchemaCatalog {
    /// Validates `raw` against the schema named `expected`.
    pub fn validate(&self, raw: &Value, expected: &str) -> ValidateError {
        let mut walk = Walk {
            catalog: self,
            errors: ValidateError::new(),
        };
        walk.object(raw, expected, &WirePath::root());
        tracing::debug!(
            schema = expected,
            errors = walk.errors.len(),
            "validated document"
        );
        walk.errors
    }
}

struct Walk<'c> {
    catalog: &'c SchemaCatalog,
    errors: ValidateError,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "real",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'c> Walk<'c> {
    fn report(
        &mut self,
        model: &str,
        path: WirePath,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        self.errors.push(ValidationError {
            model: model.to_string(),
            path,
            message: message.into(),
            recommendation: recommendation.into(),
        });
    }

    /// Validates an object position whose declared type is the schema `expected`.
    fn object(&mut self, value: &Value, expected: &str, path: &WirePath) {
        let catalog = self.catalog;
        let Some(declared) = catalog.get(expected) else {
            self.report(
                expected,
                path.clone(),
                format!("unknown schema '{expected}'"),
                "use a schema name from the catalog",
            );
            return;
        };

        let Value::Object(map) = value else {
            self.report(
                expected,
                path.clone(),
                format!("expected {expected} object, got {}", kind(value)),
                format!("provide a {expected} object"),
            );
            return;
        };

        let Some(target) = self.target_schema(declared, map, path) else {
            return;
        };

        self.closed_world(target, map, path);
        for attr in &target.attributes {
            let attr_path = path.key(attr.name.as_str());
            match map.get(&attr.name) {
                None | Some(Value::Null) => {
                    if attr.required {
                        self.report(
                            &target.name,
                            attr_path,
                            "missing required field",
                            format!("add '{}' ({})", attr.name, attr.ty),
                        );
                    }
                }
                Some(value) => self.attribute(&target.name, attr, &attr.ty, value, &attr_path),
            }
        }
    }

    /// Picks the schema the object is validated against, from the declared schema and the
    /// object's `_type`. Returns `None` (after reporting) when the object cannot be validated.
    fn target_schema(
        &mut self,
        declared: &'c ResolvedSchema,
        map: &Map<String, Value>,
        path: &WirePath,
    ) -> Option<&'c ResolvedSchema> {
        let tag_path = path.key(DISCRIMINATOR);
        let tag = match map.get(DISCRIMINATOR) {
            None => None,
            Some(Value::String(tag)) if !tag.is_empty() => Some(tag.as_str()),
            Some(_) => {
                self.report(
                    &declared.name,
                    tag_path,
                    "empty _type field",
                    format!("set _type to a concrete model name conforming to {}", declared.name),
                );
                return None;
            }
        };

        let Some(tag) = tag else {
            if declared.is_abstract {
                self.report(
                    &declared.name,
                    tag_path,
                    "empty _type field",
                    self.one_of(&declared.name),
                );
                return None;
            }
            return Some(declared);
        };

        if tag == declared.name && !declared.is_abstract {
            return Some(declared);
        }

        let catalog = self.catalog;
        let Some(tagged) = catalog.get(tag) else {
            self.report(
                &declared.name,
                tag_path,
                format!("unknown model '{tag}' in _type"),
                self.one_of(&declared.name),
            );
            return None;
        };

        if tagged.is_abstract {
            self.report(
                &declared.name,
                tag_path,
                format!("{tag} is abstract"),
                self.one_of(&declared.name),
            );
            return None;
        }

        if !catalog.inherits(tag, &declared.name) {
            self.report(
                &declared.name,
                tag_path,
                format!("{tag} does not inherit {}", declared.name),
                self.one_of(&declared.name),
            );
            return None;
        }

        Some(tagged)
    }

    fn one_of(&self, name: &str) -> String {
        let candidates = self.catalog.concrete_descendants(name);
        if candidates.is_empty() {
            format!("{name} has no concrete subtypes in the catalog")
        } else {
            format!("set _type to one of: {}", candidates.join(", "))
        }
    }

    /// Every key other than `_type` must be declared by the schema.
    fn closed_world(&mut self, schema: &ResolvedSchema, map: &Map<String, Value>, path: &WirePath) {
        for key in map.keys() {
            if key == DISCRIMINATOR || schema.attribute(key).is_some() {
                continue;
            }
            self.report(
                &schema.name,
                path.key(key.as_str()),
                "key not included in expected attribute list",
                format!(
                    "remove '{key}'; {} declares: {}",
                    schema.name,
                    schema
                        .attributes
                        .iter()
                        .map(|attr| attr.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            );
        }
    }

    fn attribute(
        &mut self,
        model: &str,
        attr: &ResolvedAttribute,
        ty: &AttrType,
        value: &Value,
        path: &WirePath,
    ) {
        match ty {
            AttrType::String => self.string(model, attr, value, path),
            AttrType::Boolean => {
                if !value.is_boolean() {
                    self.mismatch(model, ty, value, path);
                }
            }
            AttrType::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    self.mismatch(model, ty, value, path);
                }
            }
            AttrType::Real => {
                if !value.is_number() {
                    self.mismatch(model, ty, value, path);
                }
            }
            AttrType::Schema(name) => self.object(value, name, path),
            AttrType::List(inner) => {
                let Some(items) = value.as_array() else {
                    self.mismatch(model, ty, value, path);
                    return;
                };
                for (i, item) in items.iter().enumerate() {
                    self.attribute(model, attr, inner, item, &path.index(i));
                }
            }
        }
    }

    fn string(&mut self, model: &str, attr: &ResolvedAttribute, value: &Value, path: &WirePath) {
        let Some(s) = value.as_str() else {
            self.mismatch(model, &AttrType::String, value, path);
            return;
        };

        if let Some(expected) = &attr.equal_to {
            if s != expected {
                self.report(
                    model,
                    path.clone(),
                    format!("value '{s}' must equal '{expected}'"),
                    format!("set '{}' to '{expected}'", attr.name),
                );
            }
        }

        if let (Some(re), Some(pattern)) = (&attr.regexp, &attr.pattern) {
            if !re.is_match(s) {
                self.report(
                    model,
                    path.clone(),
                    format!("value '{s}' does not match pattern '{pattern}'"),
                    format!("'{}' must fully match {pattern}", attr.name),
                );
            }
        }
    }

    fn mismatch(&mut self, model: &str, ty: &AttrType, value: &Value, path: &WirePath) {
        self.report(
            model,
            path.clone(),
            format!("expected {ty}, got {}", kind(value)),
            format!("provide a {ty} value"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rm() -> &'static SchemaCatalog {
        SchemaCatalog::rm_1_1_0()
    }

    fn messages(errors: &ValidateError) -> Vec<(String, String)> {
        errors
            .iter()
            .map(|e| (e.path.to_string(), e.message.clone()))
            .collect()
    }

    #[test]
    fn hier_object_id_is_a_valid_uid_based_id() {
        let raw = json!({"_type": "HIER_OBJECT_ID", "value": "8849182c-82ad-4088-a07f-48ead4180515"});
        let errors = rm().validate(&raw, "UID_BASED_ID");
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn uuid_alone_fails_the_object_version_id_pattern() {
        let raw = json!({"_type": "OBJECT_VERSION_ID", "value": "8849182c-82ad-4088-a07f-48ead4180515"});
        let errors = rm().validate(&raw, "UID_BASED_ID");
        assert_eq!(errors.len(), 1, "{errors}");
        let error = &errors.errors()[0];
        assert_eq!(error.model, "OBJECT_VERSION_ID");
        assert_eq!(error.path.to_string(), "value");
        assert!(error.message.contains("does not match pattern"), "{}", error.message);
    }

    #[test]
    fn abstract_position_requires_discriminator() {
        let raw = json!({"value": "8849182c-82ad-4088-a07f-48ead4180515"});
        let errors = rm().validate(&raw, "OBJECT_ID");
        assert_eq!(
            messages(&errors),
            [("_type".to_string(), "empty _type field".to_string())]
        );

        let raw = json!({"_type": "", "value": "x"});
        assert_eq!(rm().validate(&raw, "OBJECT_ID").len(), 1);
    }

    #[test]
    fn tagged_schema_must_inherit_the_expected_one() {
        let raw = json!({"_type": "TERMINOLOGY_ID", "value": "SNOMED-CT"});
        let errors = rm().validate(&raw, "UID_BASED_ID");
        assert_eq!(
            messages(&errors),
            [(
                "_type".to_string(),
                "TERMINOLOGY_ID does not inherit UID_BASED_ID".to_string()
            )]
        );
        assert!(errors.errors()[0]
            .recommendation
            .contains("HIER_OBJECT_ID, OBJECT_VERSION_ID"));
    }

    #[test]
    fn abstract_tag_and_unknown_tag_are_rejected() {
        let errors = rm().validate(&json!({"_type": "UID_BASED_ID", "value": "x"}), "OBJECT_ID");
        assert_eq!(errors.errors()[0].message, "UID_BASED_ID is abstract");

        let errors = rm().validate(&json!({"_type": "COMPOSITION"}), "OBJECT_ID");
        assert_eq!(errors.errors()[0].message, "unknown model 'COMPOSITION' in _type");
    }

    #[test]
    fn coded_text_may_fill_a_text_position() {
        let raw = json!({
            "_type": "DV_CODED_TEXT",
            "value": "Event",
            "defining_code": {
                "_type": "CODE_PHRASE",
                "terminology_id": {"_type": "TERMINOLOGY_ID", "value": "openehr"},
                "code_string": "433"
            }
        });
        assert!(rm().validate(&raw, "DV_TEXT").is_empty());

        let boolean = json!({"_type": "DV_BOOLEAN", "value": true});
        let errors = rm().validate(&boolean, "DV_TEXT");
        assert_eq!(errors.errors()[0].message, "DV_BOOLEAN does not inherit DV_TEXT");
    }

    #[test]
    fn concrete_position_without_tag_uses_declared_schema() {
        let raw = json!({"terminology_id": {"_type": "TERMINOLOGY_ID", "value": "local"},
                         "code_string": "at0001"});
        assert!(rm().validate(&raw, "CODE_PHRASE").is_empty());
    }

    #[test]
    fn unknown_keys_are_reported_and_validation_continues() {
        let raw = json!({
            "_type": "EHR_STATUS",
            "archetype_node_id": "openEHR-EHR-EHR_STATUS.generic.v1",
            "name": {"_type": "DV_TEXT", "value": "EHR Status"},
            "subject": {"_type": "PARTY_SELF"},
            "is_queryable": true,
            "is_modifiable": "no",
            "colour": "blue"
        });
        let errors = rm().validate(&raw, "EHR_STATUS");
        assert_eq!(
            messages(&errors),
            [
                (
                    "colour".to_string(),
                    "key not included in expected attribute list".to_string()
                ),
                (
                    "is_modifiable".to_string(),
                    "expected boolean, got string".to_string()
                ),
            ]
        );
    }

    #[test]
    fn missing_and_null_required_fields() {
        let raw = json!({
            "_type": "EHR_STATUS",
            "archetype_node_id": "openEHR-EHR-EHR_STATUS.generic.v1",
            "name": null,
            "subject": {"_type": "PARTY_SELF"},
            "is_queryable": true
        });
        let errors = rm().validate(&raw, "EHR_STATUS");
        let found = messages(&errors);
        assert!(found.contains(&("name".to_string(), "missing required field".to_string())));
        assert!(found.contains(&(
            "is_modifiable".to_string(),
            "missing required field".to_string()
        )));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn errors_inside_lists_carry_indices() {
        let raw = json!({
            "_type": "ITEM_TREE",
            "archetype_node_id": "at0000",
            "name": {"_type": "DV_TEXT", "value": "Tree"},
            "items": [
                {
                    "_type": "ELEMENT",
                    "archetype_node_id": "at0001",
                    "name": {"_type": "DV_TEXT", "value": "Count"},
                    "value": {"_type": "DV_COUNT", "magnitude": 1.5}
                },
                {
                    "_type": "CLUSTER",
                    "archetype_node_id": "at0002",
                    "name": {"_type": "DV_TEXT", "value": "Group"},
                    "items": [{"archetype_node_id": "at0003"}]
                }
            ]
        });
        let errors = rm().validate(&raw, "ITEM_STRUCTURE");
        assert_eq!(
            messages(&errors),
            [
                (
                    "items[0].value.magnitude".to_string(),
                    "expected integer, got real".to_string()
                ),
                (
                    "items[1].items[0]._type".to_string(),
                    "empty _type field".to_string()
                ),
            ]
        );
    }

    #[test]
    fn list_attribute_must_be_an_array() {
        let raw = json!({
            "_type": "CLUSTER",
            "archetype_node_id": "at0002",
            "name": {"_type": "DV_TEXT", "value": "Group"},
            "items": {}
        });
        let errors = rm().validate(&raw, "ITEM");
        assert_eq!(
            messages(&errors),
            [("items".to_string(), "expected LIST<ITEM>, got object".to_string())]
        );
    }

    #[test]
    fn equal_to_is_exact() {
        let raw = json!({
            "_type": "ARCHETYPED",
            "archetype_id": {"_type": "ARCHETYPE_ID", "value": "openEHR-EHR-EHR_STATUS.generic.v1"},
            "rm_version": "1.0.4"
        });
        let errors = rm().validate(&raw, "ARCHETYPED");
        assert_eq!(
            messages(&errors),
            [(
                "rm_version".to_string(),
                "value '1.0.4' must equal '1.1.0'".to_string()
            )]
        );
    }

    #[test]
    fn root_errors_render_root_path() {
        let errors = rm().validate(&json!([1, 2]), "EHR_STATUS");
        assert_eq!(
            messages(&errors),
            [(
                "<root>".to_string(),
                "expected EHR_STATUS object, got array".to_string()
            )]
        );

        let errors = rm().validate(&json!({}), "NOT_A_SCHEMA");
        assert_eq!(errors.errors()[0].message, "unknown schema 'NOT_A_SCHEMA'");
    }

    #[test]
    fn integer_accepts_any_json_integer_and_real_accepts_any_number() {
        let count = json!({"_type": "DV_COUNT", "magnitude": -9_007_199_254_740_993_i64});
        assert!(rm().validate(&count, "DATA_VALUE").is_empty());

        let quantity = json!({"_type": "DV_QUANTITY", "magnitude": 120, "units": "mm[Hg]"});
        assert!(rm().validate(&quantity, "DATA_VALUE").is_empty());
    }
}
