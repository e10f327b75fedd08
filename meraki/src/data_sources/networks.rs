//! `meraki_networks` data source

use std::sync::OnceLock;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::{pick_method, NO_METHOD};

use super::{is_set, no_method, result_state, with_results, Lookup};
use crate::provider_data::{api_failure, not_configured, within};
use crate::MerakiProviderData;

const TYPE_NAME: &str = "meraki_networks";

const METHOD_GROUPS: [&[&str]; 2] = [&["organization_id"], &["network_id"]];

#[derive(Default)]
pub struct NetworksDataSource {
    provider_data: Option<MerakiProviderData>,
}

impl NetworksDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let builder = SchemaBuilder::new()
                .version(0)
                .description("Lists the networks of an organization, or fetches one network")
                .attribute(
                    AttributeBuilder::new("organization_id", AttributeType::String)
                        .description("Organization ID")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("network_id", AttributeType::String)
                        .description("Network ID")
                        .optional()
                        .build(),
                );
            with_results(builder, item_attributes()).build()
        })
    }

    async fn lookup(&self, config: &DynamicValue) -> Result<Lookup, Diagnostic> {
        let provider_data = self.provider_data.as_ref().ok_or_else(not_configured)?;
        let client = &provider_data.client;

        let has_organization = is_set(config, "organization_id");
        let has_network = is_set(config, "network_id");

        // Both set: the later group, a single network, wins
        match pick_method(&[&[has_organization], &[has_network]]) {
            NO_METHOD => Err(no_method(TYPE_NAME, &METHOD_GROUPS)),
            1 => {
                let organization_id = string_attr(config, "organization_id");
                client
                    .organizations()
                    .list_networks(&organization_id)
                    .await
                    .map(Lookup::Many)
                    .map_err(|e| api_failure("getOrganizationNetworks", &e))
            }
            _ => {
                let network_id = string_attr(config, "network_id");
                client
                    .networks()
                    .get(&network_id)
                    .await
                    .map(Lookup::One)
                    .map_err(|e| api_failure("getNetwork", &e))
            }
        }
    }
}

fn string_attr(config: &DynamicValue, name: &str) -> String {
    config
        .get_optional_string(&AttributePath::new(name))
        .unwrap_or_default()
}

fn item_attributes() -> Vec<Attribute> {
    let string_list = || AttributeType::List(Box::new(AttributeType::String));
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("Network ID")
            .computed()
            .build(),
        AttributeBuilder::new("organization_id", AttributeType::String)
            .description("Organization ID")
            .computed()
            .build(),
        AttributeBuilder::new("name", AttributeType::String)
            .description("Network name")
            .computed()
            .build(),
        AttributeBuilder::new("product_types", string_list())
            .description("List of the product types that the network supports")
            .computed()
            .build(),
        AttributeBuilder::new("time_zone", AttributeType::String)
            .description("Timezone of the network")
            .computed()
            .build(),
        AttributeBuilder::new("tags", string_list())
            .description("Network tags")
            .computed()
            .build(),
        AttributeBuilder::new("enrollment_string", AttributeType::String)
            .description("Enrollment string for the network")
            .computed()
            .build(),
        AttributeBuilder::new("url", AttributeType::String)
            .description("URL to the network Dashboard UI")
            .computed()
            .build(),
        AttributeBuilder::new("notes", AttributeType::String)
            .description("Notes for the network")
            .computed()
            .build(),
        AttributeBuilder::new("is_bound_to_config_template", AttributeType::Bool)
            .description("If the network is bound to a config template")
            .computed()
            .build(),
    ]
}

#[async_trait]
impl DataSource for NetworksDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static().clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        tracing::debug!("Reading {} data source", TYPE_NAME);

        match within(&ctx, self.lookup(&request.config))
            .await
            .and_then(|lookup| result_state(&request.config, &item_attributes(), lookup))
        {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(diag) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for NetworksDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        match MerakiProviderData::from_any(request.provider_data) {
            Ok(data) => {
                self.provider_data = Some(data);
                ConfigureDataSourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureDataSourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::test_support::configure;
    use mockito::Server;

    fn config(values: &[(&str, &str)]) -> DynamicValue {
        let mut config = DynamicValue::object();
        for (name, value) in values {
            config.set_string(&AttributePath::new(name), *value).unwrap();
        }
        config
    }

    async fn read(data_source: &NetworksDataSource, config: DynamicValue) -> ReadDataSourceResponse {
        data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    config,
                },
            )
            .await
    }

    #[tokio::test]
    async fn organization_id_lists_networks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/organizations/123/networks")
            .with_body(r#"[{"id":"N_1","name":"HQ","productTypes":["appliance","switch"]}]"#)
            .create_async()
            .await;

        let mut data_source = NetworksDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let response = read(&data_source, config(&[("organization_id", "123")])).await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let product_types = response
            .state
            .get_list(&AttributePath::new("items").index(0).attribute("product_types"))
            .unwrap();
        assert_eq!(product_types.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn network_id_wins_when_both_are_set() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/v1/organizations/123/networks")
            .expect(0)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/api/v1/networks/N_1")
            .with_body(r#"{"id":"N_1","organizationId":"123","name":"HQ"}"#)
            .create_async()
            .await;

        let mut data_source = NetworksDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let response = read(
            &data_source,
            config(&[("organization_id", "123"), ("network_id", "N_1")]),
        )
        .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new("item").attribute("organization_id"))
                .unwrap(),
            "123"
        );
        list.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn cancelled_context_skips_the_request() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/v1/organizations/123/networks")
            .expect(0)
            .create_async()
            .await;

        let mut data_source = NetworksDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let ctx = Context::new().with_operation("ReadDataSource");
        ctx.cancel();
        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    config: config(&[("organization_id", "123")]),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Operation cancelled");
        assert!(response.state.is_null());
        list.assert_async().await;
    }

    #[tokio::test]
    async fn empty_config_selects_no_method() {
        let mut server = Server::new_async().await;
        let mut data_source = NetworksDataSource::new();
        configure(&mut data_source, &server.url()).await;
        let any_request = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let response = read(&data_source, DynamicValue::object()).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Missing required attributes");
        assert!(response.diagnostics[0]
            .detail
            .contains("organization_id | network_id"));
        any_request.assert_async().await;
    }
}
