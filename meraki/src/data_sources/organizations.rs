//! `meraki_organizations` data source

use std::sync::OnceLock;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::{pick_method, NO_METHOD};

use super::{is_set, no_method, result_state, with_results, Lookup};
use crate::provider_data::{api_failure, not_configured, within};
use crate::MerakiProviderData;

const TYPE_NAME: &str = "meraki_organizations";

const METHOD_GROUPS: [&[&str]; 2] = [&[], &["organization_id"]];

#[derive(Default)]
pub struct OrganizationsDataSource {
    provider_data: Option<MerakiProviderData>,
}

impl OrganizationsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let builder = SchemaBuilder::new()
                .version(0)
                .description("Lists the organizations the API key can access, or fetches one")
                .attribute(
                    AttributeBuilder::new("organization_id", AttributeType::String)
                        .description("Organization ID")
                        .optional()
                        .build(),
                );
            with_results(builder, item_attributes()).build()
        })
    }

    async fn lookup(&self, config: &DynamicValue) -> Result<Lookup, Diagnostic> {
        let provider_data = self.provider_data.as_ref().ok_or_else(not_configured)?;
        let organizations = provider_data.client.organizations();

        let has_id = is_set(config, "organization_id");

        match pick_method(&[&[], &[has_id]]) {
            NO_METHOD => Err(no_method(TYPE_NAME, &METHOD_GROUPS)),
            1 => organizations
                .list()
                .await
                .map(Lookup::Many)
                .map_err(|e| api_failure("getOrganizations", &e)),
            _ => {
                let organization_id = config
                    .get_optional_string(&AttributePath::new("organization_id"))
                    .unwrap_or_default();
                organizations
                    .get(&organization_id)
                    .await
                    .map(Lookup::One)
                    .map_err(|e| api_failure("getOrganization", &e))
            }
        }
    }
}

fn item_attributes() -> Vec<Attribute> {
    vec![
        AttributeBuilder::new("id", AttributeType::String)
            .description("Organization ID")
            .computed()
            .build(),
        AttributeBuilder::new("name", AttributeType::String)
            .description("Organization name")
            .computed()
            .build(),
        AttributeBuilder::new("url", AttributeType::String)
            .description("Organization URL")
            .computed()
            .build(),
        AttributeBuilder::nested(
            "api",
            NestedType::single(vec![AttributeBuilder::new("enabled", AttributeType::Bool)
                .description("Enable API access")
                .computed()
                .build()]),
        )
        .description("API related settings")
        .computed()
        .build(),
        AttributeBuilder::nested(
            "licensing",
            NestedType::single(vec![AttributeBuilder::new("model", AttributeType::String)
                .description("Organization licensing model")
                .computed()
                .build()]),
        )
        .description("Licensing related settings")
        .computed()
        .build(),
        AttributeBuilder::nested(
            "cloud",
            NestedType::single(vec![AttributeBuilder::nested(
                "region",
                NestedType::single(vec![AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of region")
                    .computed()
                    .build()]),
            )
            .description("Region info")
            .computed()
            .build()]),
        )
        .description("Data for this organization")
        .computed()
        .build(),
        AttributeBuilder::nested(
            "management",
            NestedType::single(vec![AttributeBuilder::nested(
                "details",
                NestedType::list(vec![
                    AttributeBuilder::new("name", AttributeType::String)
                        .description("Name of management data")
                        .computed()
                        .build(),
                    AttributeBuilder::new("value", AttributeType::String)
                        .description("Value of management data")
                        .computed()
                        .build(),
                ]),
            )
            .description("Details related to organization management")
            .computed()
            .build()]),
        )
        .description("Information about the organization's management system")
        .computed()
        .build(),
    ]
}

#[async_trait]
impl DataSource for OrganizationsDataSource {
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
impl DataSourceWithConfigure for OrganizationsDataSource {
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

    fn read_request(config: DynamicValue) -> ReadDataSourceRequest {
        ReadDataSourceRequest {
            type_name: TYPE_NAME.to_string(),
            config,
        }
    }

    #[tokio::test]
    async fn empty_config_lists_organizations() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/organizations")
            .with_body(
                r#"[{"id":"1","name":"Acme","cloud":{"region":{"name":"North America"}}},
                    {"id":"2","name":"Globex"}]"#,
            )
            .create_async()
            .await;

        let mut data_source = OrganizationsDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let response = data_source
            .read(Context::new(), read_request(DynamicValue::object()))
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let items = response
            .state
            .get_list(&AttributePath::new("items"))
            .unwrap();
        assert_eq!(items.len(), 2);
        let region = response
            .state
            .get_string(
                &AttributePath::new("items")
                    .index(0)
                    .attribute("cloud")
                    .attribute("region")
                    .attribute("name"),
            )
            .unwrap();
        assert_eq!(region, "North America");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn organization_id_selects_single_get() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/organizations/2")
            .with_body(r#"{"id":"2","name":"Globex","api":{"enabled":false}}"#)
            .create_async()
            .await;

        let mut data_source = OrganizationsDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("organization_id"), "2")
            .unwrap();
        let response = data_source.read(Context::new(), read_request(config)).await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new("item").attribute("name"))
                .unwrap(),
            "Globex"
        );
        assert!(response
            .state
            .get(&AttributePath::new("items"))
            .unwrap()
            .is_null());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_failure_becomes_diagnostic() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/organizations")
            .with_status(500)
            .create_async()
            .await;

        let mut data_source = OrganizationsDataSource::new();
        configure(&mut data_source, &server.url()).await;

        let response = data_source
            .read(Context::new(), read_request(DynamicValue::object()))
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "Failure when executing getOrganizations"
        );
    }
}
