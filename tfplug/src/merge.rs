//! State reconciliation between prior state and a fresh server response
//!
//! After every Create, Update and Read the provider holds two objects of the
//! same shape: what Terraform already knows (`prior`, the plan or the stored
//! state) and what the API just returned (`fresh`, decoded with
//! [`crate::wire::decode`]). [`StateMerger`] decides per attribute which side
//! wins, using the [`FieldRole`] recorded in the schema:
//!
//! | role                  | write merge                          | read merge        |
//! |-----------------------|--------------------------------------|-------------------|
//! | `WriteOnly`           | prior                                | prior             |
//! | `Identity`            | prior, or fresh if prior is unset    | same as write     |
//! | `ServerAuthoritative` | fresh, or prior if fresh is null     | fresh             |
//!
//! In both modes a null or unknown prior identity is filled from the
//! response, which is how a state seeded by import gets the rest of its
//! identity on the first read.
//!
//! Single nested objects are merged leaf by leaf with the same table.
//! Lists, sets and maps are taken whole from whichever side wins; there is no
//! element-wise merge.
//!
//! The merged value never contains `Unknown`: anything still unresolved
//! becomes `Null`, so a stored state cannot produce a perpetual diff.

use crate::schema::{Attribute, FieldRole, ObjectNestingMode, Schema};
use crate::types::{Dynamic, DynamicValue};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    Write,
    Read,
}

/// Merges prior and fresh state for one resource schema
pub struct StateMerger<'a> {
    schema: &'a Schema,
}

impl<'a> StateMerger<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Used after Create/Update with the planned state as `prior`
    pub fn merge_for_write(&self, prior: &DynamicValue, fresh: &DynamicValue) -> DynamicValue {
        DynamicValue::new(merge_object(
            self.schema.attributes(),
            &prior.value,
            &fresh.value,
            MergeMode::Write,
        ))
    }

    /// Used after a refresh with the stored state as `prior`
    pub fn merge_for_read(&self, prior: &DynamicValue, fresh: &DynamicValue) -> DynamicValue {
        DynamicValue::new(merge_object(
            self.schema.attributes(),
            &prior.value,
            &fresh.value,
            MergeMode::Read,
        ))
    }
}

fn merge_object(
    attributes: &[Attribute],
    prior: &Dynamic,
    fresh: &Dynamic,
    mode: MergeMode,
) -> Dynamic {
    let prior_map = prior.as_map();
    let fresh_map = fresh.as_map();

    let merged: HashMap<String, Dynamic> = attributes
        .iter()
        .map(|attr| {
            let p = prior_map
                .and_then(|m| m.get(&attr.name))
                .unwrap_or(&Dynamic::Null);
            let f = fresh_map
                .and_then(|m| m.get(&attr.name))
                .unwrap_or(&Dynamic::Null);
            (attr.name.clone(), merge_attribute(attr, p, f, mode))
        })
        .collect();

    // An object the server did not return only survives if something from
    // prior was kept inside it.
    if fresh_map.is_none() && merged.values().all(Dynamic::is_null) {
        Dynamic::Null
    } else {
        Dynamic::Map(merged)
    }
}

fn merge_attribute(
    attr: &Attribute,
    prior: &Dynamic,
    fresh: &Dynamic,
    mode: MergeMode,
) -> Dynamic {
    match attr.role {
        FieldRole::WriteOnly => prior.clone().resolve_unknowns(),
        FieldRole::Identity => {
            if prior.is_known() {
                prior.clone()
            } else {
                fresh.clone().resolve_unknowns()
            }
        }
        FieldRole::ServerAuthoritative => {
            if let Some(nested) = &attr.nested_type {
                if nested.nesting == ObjectNestingMode::Single {
                    return merge_object(&nested.attributes, prior, fresh, mode);
                }
            }
            match mode {
                MergeMode::Write if fresh.is_null() && prior.is_known() => {
                    prior.clone().resolve_unknowns()
                }
                _ => fresh.clone().resolve_unknowns(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeBuilder, AttributeType, NestedType, SchemaBuilder};
    use crate::wire;
    use serde_json::json;

    fn network_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("organization_id", AttributeType::String)
                    .required()
                    .identity()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("network_id", AttributeType::String)
                    .computed()
                    .identity()
                    .wire_name("id")
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("notes", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tags", AttributeType::Set(Box::new(AttributeType::String)))
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("copy_from_network_id", AttributeType::String)
                    .optional()
                    .write_only()
                    .build(),
            )
            .build()
    }

    fn radio_schema() -> Schema {
        let band = |name: &str| {
            AttributeBuilder::nested(
                name,
                NestedType::single(vec![
                    AttributeBuilder::new("channel", AttributeType::Number)
                        .optional()
                        .computed()
                        .build(),
                    AttributeBuilder::new("channel_width", AttributeType::Number)
                        .optional()
                        .computed()
                        .build(),
                    AttributeBuilder::new("target_power", AttributeType::Number)
                        .optional()
                        .computed()
                        .build(),
                ]),
            )
            .optional()
            .computed()
            .build()
        };

        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("serial", AttributeType::String)
                    .required()
                    .identity()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("rf_profile_id", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(band("five_ghz_settings"))
            .attribute(band("two_four_ghz_settings"))
            .build()
    }

    fn state(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        ))
    }

    fn s(v: &str) -> Dynamic {
        Dynamic::String(v.to_string())
    }

    #[test]
    fn write_merge_keeps_write_only_fields() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("name", s("office")),
            ("copy_from_network_id", s("N_1")),
        ]);
        let fresh = wire::decode(
            &schema,
            &json!({"id": "N_2", "organizationId": "123", "name": "office"}),
        );

        let merged = StateMerger::new(&schema).merge_for_write(&prior, &fresh);
        assert_eq!(merged.value.get("copy_from_network_id"), Some(&s("N_1")));
    }

    #[test]
    fn write_merge_fills_computed_identity_from_response() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("network_id", Dynamic::Unknown),
            ("name", s("office")),
        ]);
        let fresh = wire::decode(&schema, &json!({"id": "N_2", "name": "office"}));

        let merged = StateMerger::new(&schema).merge_for_write(&prior, &fresh);
        assert_eq!(merged.value.get("network_id"), Some(&s("N_2")));
        assert_eq!(merged.value.get("organization_id"), Some(&s("123")));
    }

    #[test]
    fn write_merge_prefers_server_values_including_empty_ones() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("name", s("office")),
            ("notes", s("planned")),
            ("tags", Dynamic::List(vec![s("a"), s("b")])),
        ]);
        let fresh = wire::decode(
            &schema,
            &json!({"id": "N_2", "name": "office-renamed", "notes": "", "tags": ["c"]}),
        );

        let merged = StateMerger::new(&schema).merge_for_write(&prior, &fresh);
        assert_eq!(merged.value.get("name"), Some(&s("office-renamed")));
        assert_eq!(merged.value.get("notes"), Some(&s("")));
        assert_eq!(merged.value.get("tags"), Some(&Dynamic::List(vec![s("c")])));
    }

    #[test]
    fn write_merge_keeps_prior_when_field_not_returned() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("name", s("office")),
            ("notes", s("planned")),
        ]);
        let fresh = wire::decode(&schema, &json!({"id": "N_2", "name": "office"}));

        let merged = StateMerger::new(&schema).merge_for_write(&prior, &fresh);
        assert_eq!(merged.value.get("notes"), Some(&s("planned")));
    }

    #[test]
    fn read_merge_preserves_identity_fields() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("network_id", s("N_2")),
            ("name", s("office")),
        ]);
        let fresh = wire::decode(
            &schema,
            &json!({"id": "", "organizationId": "999", "name": "office"}),
        );

        let merged = StateMerger::new(&schema).merge_for_read(&prior, &fresh);
        assert_eq!(merged.value.get("organization_id"), Some(&s("123")));
        assert_eq!(merged.value.get("network_id"), Some(&s("N_2")));
    }

    #[test]
    fn read_merge_fills_identity_missing_after_import() {
        let schema = network_schema();
        let imported = state(vec![("network_id", s("N_2"))]);
        let fresh = wire::decode(
            &schema,
            &json!({"id": "N_2", "organizationId": "123", "name": "office"}),
        );

        let merged = StateMerger::new(&schema).merge_for_read(&imported, &fresh);
        assert_eq!(merged.value.get("organization_id"), Some(&s("123")));
        assert_eq!(merged.value.get("network_id"), Some(&s("N_2")));
    }

    #[test]
    fn read_merge_trusts_server_for_everything_else() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("network_id", s("N_2")),
            ("name", s("office")),
            ("notes", s("old notes")),
            ("tags", Dynamic::List(vec![s("a")])),
        ]);
        let fresh = wire::decode(&schema, &json!({"name": "renamed", "tags": []}));

        let merged = StateMerger::new(&schema).merge_for_read(&prior, &fresh);
        assert_eq!(merged.value.get("name"), Some(&s("renamed")));
        assert_eq!(merged.value.get("notes"), Some(&Dynamic::Null));
        assert_eq!(merged.value.get("tags"), Some(&Dynamic::List(vec![])));
    }

    #[test]
    fn read_merge_keeps_write_only_fields() {
        let schema = network_schema();
        let prior = state(vec![
            ("organization_id", s("123")),
            ("network_id", s("N_2")),
            ("copy_from_network_id", s("N_1")),
        ]);
        let fresh = wire::decode(&schema, &json!({"name": "office"}));

        let merged = StateMerger::new(&schema).merge_for_read(&prior, &fresh);
        assert_eq!(merged.value.get("copy_from_network_id"), Some(&s("N_1")));
    }

    #[test]
    fn radio_settings_round_trip_leaves_no_unknowns() {
        let schema = radio_schema();
        let plan = state(vec![
            ("serial", s("Q234-ABCD-5678")),
            ("rf_profile_id", Dynamic::Unknown),
            (
                "five_ghz_settings",
                Dynamic::Map(HashMap::from([
                    ("channel".to_string(), Dynamic::Number(36.0)),
                    ("channel_width".to_string(), Dynamic::Unknown),
                    ("target_power".to_string(), Dynamic::Unknown),
                ])),
            ),
            ("two_four_ghz_settings", Dynamic::Unknown),
        ]);
        let fresh = wire::decode(
            &schema,
            &json!({
                "serial": "Q234-ABCD-5678",
                "fiveGhzSettings": {"channel": 36, "channelWidth": 20, "targetPower": 17},
                "rfProfileId": ""
            }),
        );

        let merged = StateMerger::new(&schema).merge_for_write(&plan, &fresh);
        let five = merged.value.get("five_ghz_settings").unwrap();
        assert_eq!(five.get("channel"), Some(&Dynamic::Number(36.0)));
        assert_eq!(five.get("channel_width"), Some(&Dynamic::Number(20.0)));
        assert_eq!(five.get("target_power"), Some(&Dynamic::Number(17.0)));
        assert_eq!(merged.value.get("rf_profile_id"), Some(&s("")));
        assert_eq!(merged.value.get("two_four_ghz_settings"), Some(&Dynamic::Null));
        assert_eq!(merged.value.clone().resolve_unknowns(), merged.value);
    }

    #[test]
    fn nested_leaves_not_returned_keep_planned_values_on_write() {
        let schema = radio_schema();
        let plan = state(vec![
            ("serial", s("Q234-ABCD-5678")),
            (
                "five_ghz_settings",
                Dynamic::Map(HashMap::from([
                    ("channel".to_string(), Dynamic::Number(36.0)),
                    ("target_power".to_string(), Dynamic::Number(15.0)),
                ])),
            ),
        ]);
        let fresh = wire::decode(&schema, &json!({"fiveGhzSettings": {"channel": 40}}));

        let merged = StateMerger::new(&schema).merge_for_write(&plan, &fresh);
        let five = merged.value.get("five_ghz_settings").unwrap();
        assert_eq!(five.get("channel"), Some(&Dynamic::Number(40.0)));
        assert_eq!(five.get("target_power"), Some(&Dynamic::Number(15.0)));
        assert_eq!(five.get("channel_width"), Some(&Dynamic::Null));
    }

    #[test]
    fn merged_state_contains_only_schema_attributes() {
        let schema = network_schema();
        let prior = state(vec![("organization_id", s("123")), ("stray", s("x"))]);
        let fresh = wire::decode(&schema, &json!({"name": "office", "extra": 1}));

        let merged = StateMerger::new(&schema).merge_for_read(&prior, &fresh);
        let map = merged.value.as_map().unwrap();
        assert_eq!(map.len(), schema.attributes().len());
        assert!(!map.contains_key("stray"));
    }
}
