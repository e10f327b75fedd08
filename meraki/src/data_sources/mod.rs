//! Data source implementations
//!
//! Each data source maps one or more Dashboard GET endpoints. The attributes
//! present in the configuration pick the endpoint through
//! [`tfplug::pick_method`]: list endpoints fill `items`, single-object
//! endpoints fill `item`.

pub mod networks;
pub mod organizations;
pub mod switch_ports;

pub use networks::NetworksDataSource;
pub use organizations::OrganizationsDataSource;
pub use switch_ports::SwitchPortsDataSource;

use serde_json::Value;
use tfplug::schema::{Attribute, AttributeBuilder, NestedType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::wire;

/// What a selected endpoint returned
pub(crate) enum Lookup {
    Many(Vec<Value>),
    One(Value),
}

/// Adds the computed `items` and `item` result attributes
pub(crate) fn with_results(builder: SchemaBuilder, item_attributes: Vec<Attribute>) -> SchemaBuilder {
    builder
        .attribute(
            AttributeBuilder::nested("items", NestedType::list(item_attributes.clone()))
                .description("Results of the list endpoint")
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::nested("item", NestedType::single(item_attributes))
                .description("Result of the single object endpoint")
                .computed()
                .build(),
        )
}

pub(crate) fn is_set(config: &DynamicValue, name: &str) -> bool {
    config.is_set(&AttributePath::new(name))
}

/// Copies the configuration and fills the result attributes
pub(crate) fn result_state(
    config: &DynamicValue,
    item_attributes: &[Attribute],
    lookup: Lookup,
) -> Result<DynamicValue, Diagnostic> {
    let (items, item) = match lookup {
        Lookup::Many(values) => (
            Dynamic::List(
                values
                    .iter()
                    .map(|v| wire::decode_object(item_attributes, v))
                    .collect(),
            ),
            Dynamic::Null,
        ),
        Lookup::One(value) => (Dynamic::Null, wire::decode_object(item_attributes, &value)),
    };

    let failed = |e: tfplug::TfplugError| {
        Diagnostic::error("Failed to build data source state", e.to_string())
    };
    let mut state = DynamicValue::new(config.value.clone().resolve_unknowns());
    state.set(&AttributePath::new("items"), items).map_err(failed)?;
    state.set(&AttributePath::new("item"), item).map_err(failed)?;
    Ok(state)
}

/// Reported when no method group is satisfied by the configuration
pub(crate) fn no_method(type_name: &str, groups: &[&[&str]]) -> Diagnostic {
    let options: Vec<String> = groups
        .iter()
        .map(|group| {
            if group.is_empty() {
                "no attributes".to_string()
            } else {
                group.join(" + ")
            }
        })
        .collect();

    Diagnostic::error(
        "Missing required attributes",
        format!(
            "{} cannot select an API method; set one of: {}",
            type_name,
            options.join(" | ")
        ),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use tfplug::context::Context;
    use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};

    pub async fn configure<D: DataSourceWithConfigure>(data_source: &mut D, url: &str) {
        let response = data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(crate::resources::test_support::provider_data(url)),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tfplug::schema::AttributeType;

    fn item_attributes() -> Vec<Attribute> {
        vec![
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
            AttributeBuilder::new("product_types", AttributeType::List(Box::new(AttributeType::String)))
                .computed()
                .build(),
        ]
    }

    #[test]
    fn many_fills_items_and_nulls_item() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("organization_id"), "123")
            .unwrap();
        config.set(&AttributePath::new("items"), Dynamic::Unknown).unwrap();

        let state = result_state(
            &config,
            &item_attributes(),
            Lookup::Many(vec![json!({"id": "N_1", "productTypes": ["switch"]}), json!({"id": "N_2"})]),
        )
        .unwrap();

        let items = state.get_list(&AttributePath::new("items")).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id").and_then(Dynamic::as_str), Some("N_1"));
        assert!(items[1].get("product_types").unwrap().is_null());
        assert!(state.get(&AttributePath::new("item")).unwrap().is_null());
        assert_eq!(
            state.get_string(&AttributePath::new("organization_id")).unwrap(),
            "123"
        );
    }

    #[test]
    fn one_fills_item() {
        let state = result_state(
            &DynamicValue::object(),
            &item_attributes(),
            Lookup::One(json!({"id": "N_1"})),
        )
        .unwrap();

        assert_eq!(
            state.get_string(&AttributePath::new("item").attribute("id")).unwrap(),
            "N_1"
        );
        assert!(state.get(&AttributePath::new("items")).unwrap().is_null());
    }

    #[test]
    fn no_method_lists_the_options() {
        let diag = no_method("meraki_devices_switch_ports", &[&["serial"], &["serial", "port_id"]]);
        assert!(diag.is_error());
        assert!(diag.detail.contains("serial | serial + port_id"));
    }
}
