//! `meraki_networks` resource

use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::Value;
use tfplug::context::Context;
use tfplug::import::import_state_composite_id;
use tfplug::plan_modifier::ensure_identity_unchanged;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::{wire, StateMerger};

use super::{find_by_name, removed_outside_terraform, required_id, wire_id};
use crate::api::Client;
use crate::provider_data::{api_failure, cancelled, not_configured, within};
use crate::MerakiProviderData;

const TYPE_NAME: &str = "meraki_networks";

/// Only meaningful when the network is first created
const CREATE_ONLY_FIELDS: [&str; 1] = ["copyFromNetworkId"];

#[derive(Default)]
pub struct NetworkResource {
    provider_data: Option<MerakiProviderData>,
}

impl NetworkResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SchemaBuilder::new()
                .version(0)
                .description("Manages a network in a Meraki Dashboard organization")
                .attribute(
                    AttributeBuilder::new("organization_id", AttributeType::String)
                        .description("Organization ID")
                        .required()
                        .identity()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("network_id", AttributeType::String)
                        .description("Network ID")
                        .computed()
                        .identity()
                        .wire_name("id")
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .description("Name of the new network")
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(
                        "product_types",
                        AttributeType::Set(Box::new(AttributeType::String)),
                    )
                    .description("The product type(s) of the new network")
                    .required()
                    .build(),
                )
                .attribute(
                    AttributeBuilder::new("time_zone", AttributeType::String)
                        .description("The timezone of the network")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(
                        "tags",
                        AttributeType::Set(Box::new(AttributeType::String)),
                    )
                    .description("A list of tags to be applied to the network")
                    .optional()
                    .computed()
                    .build(),
                )
                .attribute(
                    AttributeBuilder::new("notes", AttributeType::String)
                        .description("Add any notes or additional information about this network here")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("enrollment_string", AttributeType::String)
                        .description("Enrollment string for the network")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("url", AttributeType::String)
                        .description("URL to the network Dashboard UI")
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("is_bound_to_config_template", AttributeType::Bool)
                        .description("If the network is bound to a config template")
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("copy_from_network_id", AttributeType::String)
                        .description("The ID of the network to copy configuration from")
                        .optional()
                        .write_only()
                        .build(),
                )
                .build()
        })
    }

    async fn create_network(
        &self,
        client: &Client,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let schema = Self::schema_static();
        let organization_id = required_id(plan, "organization_id")?;
        let name = plan
            .get_string(&AttributePath::new("name"))
            .map_err(|_| Diagnostic::error("Missing name", "The 'name' attribute is required"))?;

        let existing = client
            .organizations()
            .list_networks(&organization_id)
            .await
            .map_err(|e| api_failure("getOrganizationNetworks", &e))?;

        let network_id = match find_by_name(&existing, &name).and_then(wire_id) {
            Some(id) => {
                tracing::debug!("Network {} already exists as {}, updating", name, id);
                client
                    .networks()
                    .update(&id, &update_body(schema, plan))
                    .await
                    .map_err(|e| api_failure("updateNetwork", &e))?;
                id
            }
            None => {
                tracing::debug!("Creating network {} in organization {}", name, organization_id);
                let created = client
                    .organizations()
                    .create_network(&organization_id, &wire::encode(schema, plan))
                    .await
                    .map_err(|e| api_failure("createOrganizationNetwork", &e))?;
                wire_id(&created).ok_or_else(|| {
                    Diagnostic::error(
                        "Failure when executing createOrganizationNetwork",
                        "The response did not include the new network id",
                    )
                })?
            }
        };

        self.refresh_after_write(client, &network_id, plan).await
    }

    async fn update_network(
        &self,
        client: &Client,
        prior: &DynamicValue,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        ensure_identity_unchanged(Self::schema_static(), prior, plan)?;
        let network_id = required_id(prior, "network_id")?;
        client
            .networks()
            .update(&network_id, &update_body(Self::schema_static(), plan))
            .await
            .map_err(|e| api_failure("updateNetwork", &e))?;

        self.refresh_after_write(client, &network_id, plan).await
    }

    async fn refresh_after_write(
        &self,
        client: &Client,
        network_id: &str,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let schema = Self::schema_static();
        let fresh = client
            .networks()
            .get(network_id)
            .await
            .map_err(|e| api_failure("getNetwork", &e))?;

        Ok(StateMerger::new(schema).merge_for_write(plan, &wire::decode(schema, &fresh)))
    }
}

/// updateNetwork rejects create-only fields
fn update_body(schema: &Schema, plan: &DynamicValue) -> Value {
    let mut body = wire::encode(schema, plan);
    if let Some(fields) = body.as_object_mut() {
        for field in CREATE_ONLY_FIELDS {
            fields.remove(field);
        }
    }
    body
}

#[async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static().clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // Unknown during plan is fine; only a known empty set is wrong
        if let Ok(Dynamic::List(product_types)) =
            request.config.get(&AttributePath::new("product_types"))
        {
            if product_types.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid product types",
                        "product_types must contain at least one of appliance, switch, wireless, camera, cellularGateway, sensor, systemsManager",
                    )
                    .with_attribute(AttributePath::new("product_types")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![not_configured()],
            };
        };

        match within(
            &ctx,
            self.create_network(&provider_data.client, &request.planned_state),
        )
        .await
        {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![not_configured()],
            };
        };

        let network_id = match required_id(&request.current_state, "network_id") {
            Ok(id) => id,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        let networks = provider_data.client.networks();
        let Some(result) = ctx.run(networks.get(&network_id)).await else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![cancelled(&ctx)],
            };
        };

        match result {
            Ok(fresh) => {
                let schema = Self::schema_static();
                let new_state = StateMerger::new(schema)
                    .merge_for_read(&request.current_state, &wire::decode(schema, &fresh));
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Network {} not found, removing from state", network_id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![removed_outside_terraform(TYPE_NAME, &network_id)],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![api_failure("getNetwork", &e)],
            },
        }
    }

    async fn update(
        &self,
        ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![not_configured()],
            };
        };

        match within(
            &ctx,
            self.update_network(&provider_data.client, &request.prior_state, &request.planned_state),
        )
        .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(
        &self,
        ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return DeleteResourceResponse::failed(not_configured());
        };

        let network_id = match required_id(&request.prior_state, "network_id") {
            Ok(id) => id,
            Err(diag) => return DeleteResourceResponse::failed(diag),
        };

        let networks = provider_data.client.networks();
        let Some(result) = ctx.run(networks.delete(&network_id)).await else {
            return DeleteResourceResponse::failed(cancelled(&ctx));
        };

        match result {
            Ok(()) => DeleteResourceResponse::removed(),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Network {} already deleted", network_id);
                DeleteResourceResponse::removed()
            }
            Err(e) => DeleteResourceResponse::failed(api_failure("deleteNetwork", &e)),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for NetworkResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        match MerakiProviderData::from_any(request.provider_data) {
            Ok(data) => {
                self.provider_data = Some(data);
                ConfigureResourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureResourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl ResourceWithImportState for NetworkResource {
    /// Accepts `<network_id>` or `<organization_id>,<network_id>`; the
    /// organization is filled in by the follow-up read when omitted
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        if request.id.contains(',') {
            import_state_composite_id(&["organization_id", "network_id"], &request, &mut response);
        } else {
            import_state_composite_id(&["network_id"], &request, &mut response);
        }
        response
    }
}
