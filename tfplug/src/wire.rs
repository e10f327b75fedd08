//! Schema-driven conversion between API JSON bodies and Terraform values
//!
//! Decoding always yields a complete object: every attribute of the schema is
//! present, with `Null` standing for a field the response did not carry (or
//! carried as JSON `null`). Explicit empty strings, zeros and `false` stay
//! concrete values.

use crate::schema::{Attribute, AttributeType, ObjectNestingMode, Schema};
use crate::types::{Dynamic, DynamicValue};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Decode an API response object into state shaped by `schema`
pub fn decode(schema: &Schema, body: &Value) -> DynamicValue {
    DynamicValue::new(decode_object(schema.attributes(), body))
}

/// Build a request body from a planned state
///
/// Skips null and unknown values, identity attributes (they travel in the
/// URL) and read-only attributes.
pub fn encode(schema: &Schema, state: &DynamicValue) -> Value {
    Value::Object(encode_object(schema.attributes(), &state.value))
}

pub fn decode_object(attributes: &[Attribute], body: &Value) -> Dynamic {
    let Some(fields) = body.as_object() else {
        return Dynamic::Null;
    };

    let values = attributes
        .iter()
        .map(|attr| {
            let raw = fields.get(attr.wire_name().as_ref()).unwrap_or(&Value::Null);
            (attr.name.clone(), decode_attribute(attr, raw))
        })
        .collect();
    Dynamic::Map(values)
}

fn decode_attribute(attr: &Attribute, raw: &Value) -> Dynamic {
    let Some(nested) = &attr.nested_type else {
        return decode_type(&attr.r#type, raw);
    };

    match nested.nesting {
        ObjectNestingMode::Single => decode_object(&nested.attributes, raw),
        ObjectNestingMode::List | ObjectNestingMode::Set => match raw.as_array() {
            Some(items) => Dynamic::List(
                items
                    .iter()
                    .map(|item| decode_object(&nested.attributes, item))
                    .collect(),
            ),
            None => Dynamic::Null,
        },
    }
}

fn decode_type(ty: &AttributeType, raw: &Value) -> Dynamic {
    match (ty, raw) {
        (_, Value::Null) => Dynamic::Null,
        (AttributeType::String, Value::String(s)) => Dynamic::String(s.clone()),
        // Some endpoints return numeric ids where the schema declares strings
        (AttributeType::String, Value::Number(n)) => Dynamic::String(n.to_string()),
        (AttributeType::String, Value::Bool(b)) => Dynamic::String(b.to_string()),
        (AttributeType::Number, Value::Number(n)) => {
            n.as_f64().map(Dynamic::Number).unwrap_or(Dynamic::Null)
        }
        (AttributeType::Number, Value::String(s)) => {
            s.parse().map(Dynamic::Number).unwrap_or(Dynamic::Null)
        }
        (AttributeType::Bool, Value::Bool(b)) => Dynamic::Bool(*b),
        (AttributeType::List(elem) | AttributeType::Set(elem), Value::Array(items)) => {
            Dynamic::List(items.iter().map(|item| decode_type(elem, item)).collect())
        }
        (AttributeType::Map(elem), Value::Object(entries)) => Dynamic::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), decode_type(elem, v)))
                .collect(),
        ),
        (AttributeType::Object(fields), Value::Object(entries)) => {
            let values: HashMap<String, Dynamic> = fields
                .iter()
                .map(|(name, field_ty)| {
                    let raw = entries
                        .get(&crate::schema::camel_case(name))
                        .unwrap_or(&Value::Null);
                    (name.clone(), decode_type(field_ty, raw))
                })
                .collect();
            Dynamic::Map(values)
        }
        _ => {
            tracing::debug!("Dropping value of unexpected shape for {:?}: {}", ty, raw);
            Dynamic::Null
        }
    }
}

pub fn encode_object(attributes: &[Attribute], value: &Dynamic) -> Map<String, Value> {
    let mut body = Map::new();
    let Some(values) = value.as_map() else {
        return body;
    };

    for attr in attributes {
        if attr.role == crate::schema::FieldRole::Identity || attr.is_read_only() {
            continue;
        }
        let Some(v) = values.get(&attr.name).filter(|v| v.is_known()) else {
            continue;
        };
        if let Some(encoded) = encode_attribute(attr, v) {
            body.insert(attr.wire_name().into_owned(), encoded);
        }
    }
    body
}

fn encode_attribute(attr: &Attribute, value: &Dynamic) -> Option<Value> {
    let Some(nested) = &attr.nested_type else {
        return Some(encode_value(value));
    };

    match (nested.nesting, value) {
        (ObjectNestingMode::Single, _) => {
            let object = encode_object(&nested.attributes, value);
            (!object.is_empty()).then_some(Value::Object(object))
        }
        (ObjectNestingMode::List | ObjectNestingMode::Set, Dynamic::List(items)) => Some(
            Value::Array(
                items
                    .iter()
                    .map(|item| Value::Object(encode_object(&nested.attributes, item)))
                    .collect(),
            ),
        ),
        _ => None,
    }
}

// Unknowns nested inside plain collections are dropped rather than sent as null
fn encode_value(value: &Dynamic) -> Value {
    match value {
        Dynamic::List(items) => Value::Array(
            items
                .iter()
                .filter(|item| item.is_known())
                .map(encode_value)
                .collect(),
        ),
        Dynamic::Map(entries) => Value::Object(
            entries
                .iter()
                .filter(|(_, v)| v.is_known())
                .map(|(k, v)| (crate::schema::camel_case(k), encode_value(v)))
                .collect(),
        ),
        other => other.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeBuilder, NestedType, SchemaBuilder};
    use serde_json::json;

    fn radio_schema() -> Schema {
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
            .attribute(
                AttributeBuilder::nested(
                    "five_ghz_settings",
                    NestedType::single(vec![
                        AttributeBuilder::new("channel", AttributeType::Number)
                            .optional()
                            .computed()
                            .build(),
                        AttributeBuilder::new("channel_width", AttributeType::Number)
                            .optional()
                            .computed()
                            .build(),
                    ]),
                )
                .optional()
                .computed()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("url", AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    #[test]
    fn decode_fills_every_attribute() {
        let state = decode(&radio_schema(), &json!({"serial": "Q234-ABCD-5678"}));

        let map = state.value.as_map().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map["serial"], Dynamic::String("Q234-ABCD-5678".to_string()));
        assert_eq!(map["rf_profile_id"], Dynamic::Null);
        assert_eq!(map["five_ghz_settings"], Dynamic::Null);
    }

    #[test]
    fn decode_keeps_explicit_empty_values() {
        let state = decode(
            &radio_schema(),
            &json!({"rfProfileId": "", "fiveGhzSettings": {"channel": 0}}),
        );

        assert_eq!(state.value.get("rf_profile_id"), Some(&Dynamic::String(String::new())));
        let five = state.value.get("five_ghz_settings").unwrap();
        assert_eq!(five.get("channel"), Some(&Dynamic::Number(0.0)));
        assert_eq!(five.get("channel_width"), Some(&Dynamic::Null));
    }

    #[test]
    fn decode_coerces_numeric_ids_to_strings() {
        let state = decode(&radio_schema(), &json!({"rfProfileId": 1234}));
        assert_eq!(
            state.value.get("rf_profile_id"),
            Some(&Dynamic::String("1234".to_string()))
        );
    }

    #[test]
    fn encode_skips_identity_read_only_and_unset() {
        let plan = DynamicValue::new(Dynamic::Map(HashMap::from([
            ("serial".to_string(), Dynamic::String("Q234-ABCD-5678".to_string())),
            ("rf_profile_id".to_string(), Dynamic::Unknown),
            ("url".to_string(), Dynamic::String("https://n1.meraki.com".to_string())),
            (
                "five_ghz_settings".to_string(),
                Dynamic::Map(HashMap::from([
                    ("channel".to_string(), Dynamic::Number(36.0)),
                    ("channel_width".to_string(), Dynamic::Unknown),
                ])),
            ),
        ])));

        let body = encode(&radio_schema(), &plan);
        assert_eq!(body, json!({"fiveGhzSettings": {"channel": 36}}));
    }

    #[test]
    fn encode_drops_empty_nested_objects() {
        let plan = DynamicValue::new(Dynamic::Map(HashMap::from([(
            "five_ghz_settings".to_string(),
            Dynamic::Map(HashMap::from([("channel".to_string(), Dynamic::Null)])),
        )])));

        assert_eq!(encode(&radio_schema(), &plan), json!({}));
    }
}
