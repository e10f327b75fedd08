//! `meraki_organizations` resource

use std::sync::OnceLock;

use async_trait::async_trait;
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
use tfplug::schema::{AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::{wire, StateMerger};

use super::{find_by_name, removed_outside_terraform, required_id, wire_id};
use crate::api::Client;
use crate::provider_data::{api_failure, cancelled, not_configured, within};
use crate::MerakiProviderData;

const TYPE_NAME: &str = "meraki_organizations";

#[derive(Default)]
pub struct OrganizationResource {
    provider_data: Option<MerakiProviderData>,
}

impl OrganizationResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SchemaBuilder::new()
                .version(0)
                .description("Manages a Meraki Dashboard organization")
                .attribute(
                    AttributeBuilder::new("organization_id", AttributeType::String)
                        .description("Organization ID")
                        .computed()
                        .identity()
                        .wire_name("id")
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .description("Organization name")
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("url", AttributeType::String)
                        .description("Organization Dashboard URL")
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::nested(
                        "api",
                        NestedType::single(vec![AttributeBuilder::new(
                            "enabled",
                            AttributeType::Bool,
                        )
                        .description("Enable API access")
                        .computed()
                        .build()]),
                    )
                    .description("API related settings")
                    .computed()
                    .build(),
                )
                .attribute(
                    AttributeBuilder::nested(
                        "licensing",
                        NestedType::single(vec![AttributeBuilder::new(
                            "model",
                            AttributeType::String,
                        )
                        .description("Organization licensing model: co-term, per-device or subscription")
                        .computed()
                        .build()]),
                    )
                    .description("Licensing related settings")
                    .computed()
                    .build(),
                )
                .attribute(
                    AttributeBuilder::nested(
                        "management",
                        NestedType::single(vec![AttributeBuilder::nested(
                            "details",
                            NestedType::list(vec![
                                AttributeBuilder::new("name", AttributeType::String)
                                    .description("Name of management data")
                                    .optional()
                                    .computed()
                                    .build(),
                                AttributeBuilder::new("value", AttributeType::String)
                                    .description("Value of management data")
                                    .optional()
                                    .computed()
                                    .build(),
                            ]),
                        )
                        .description("Details related to organization management")
                        .optional()
                        .computed()
                        .build()]),
                    )
                    .description("Information about the organization's management system")
                    .optional()
                    .computed()
                    .build(),
                )
                .build()
        })
    }

    async fn create_organization(
        &self,
        client: &Client,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let schema = Self::schema_static();
        let name = plan
            .get_string(&AttributePath::new("name"))
            .map_err(|_| Diagnostic::error("Missing name", "The 'name' attribute is required"))?;
        let body = wire::encode(schema, plan);

        let existing = client
            .organizations()
            .list()
            .await
            .map_err(|e| api_failure("getOrganizations", &e))?;

        let organization_id = match find_by_name(&existing, &name).and_then(wire_id) {
            Some(id) => {
                tracing::debug!("Organization {} already exists as {}, updating", name, id);
                client
                    .organizations()
                    .update(&id, &body)
                    .await
                    .map_err(|e| api_failure("updateOrganization", &e))?;
                id
            }
            None => {
                tracing::debug!("Creating organization {}", name);
                let created = client
                    .organizations()
                    .create(&body)
                    .await
                    .map_err(|e| api_failure("createOrganization", &e))?;
                wire_id(&created).ok_or_else(|| {
                    Diagnostic::error(
                        "Failure when executing createOrganization",
                        "The response did not include the new organization id",
                    )
                })?
            }
        };

        self.refresh_after_write(client, &organization_id, plan).await
    }

    async fn update_organization(
        &self,
        client: &Client,
        prior: &DynamicValue,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        ensure_identity_unchanged(Self::schema_static(), prior, plan)?;
        let organization_id = required_id(prior, "organization_id")?;
        let body = wire::encode(Self::schema_static(), plan);
        client
            .organizations()
            .update(&organization_id, &body)
            .await
            .map_err(|e| api_failure("updateOrganization", &e))?;

        self.refresh_after_write(client, &organization_id, plan).await
    }

    async fn refresh_after_write(
        &self,
        client: &Client,
        organization_id: &str,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let schema = Self::schema_static();
        let fresh = client
            .organizations()
            .get(organization_id)
            .await
            .map_err(|e| api_failure("getOrganization", &e))?;

        Ok(StateMerger::new(schema).merge_for_write(plan, &wire::decode(schema, &fresh)))
    }
}

#[async_trait]
impl Resource for OrganizationResource {
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

        if let Ok(name) = request.config.get_string(&AttributePath::new("name")) {
            if name.trim().is_empty() {
                diagnostics.push(
                    Diagnostic::error("Invalid name", "Organization name cannot be empty")
                        .with_attribute(AttributePath::new("name")),
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
            self.create_organization(&provider_data.client, &request.planned_state),
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

        let organization_id = match required_id(&request.current_state, "organization_id") {
            Ok(id) => id,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        let organizations = provider_data.client.organizations();
        let Some(result) = ctx.run(organizations.get(&organization_id)).await else {
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
                tracing::warn!("Organization {} not found, removing from state", organization_id);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![removed_outside_terraform(TYPE_NAME, &organization_id)],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![api_failure("getOrganization", &e)],
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
            self.update_organization(
                &provider_data.client,
                &request.prior_state,
                &request.planned_state,
            ),
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

        let organization_id = match required_id(&request.prior_state, "organization_id") {
            Ok(id) => id,
            Err(diag) => return DeleteResourceResponse::failed(diag),
        };

        let organizations = provider_data.client.organizations();
        let Some(result) = ctx.run(organizations.delete(&organization_id)).await else {
            return DeleteResourceResponse::failed(cancelled(&ctx));
        };

        match result {
            Ok(()) => DeleteResourceResponse::removed(),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Organization {} already deleted", organization_id);
                DeleteResourceResponse::removed()
            }
            Err(e) => DeleteResourceResponse::failed(api_failure("deleteOrganization", &e)),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for OrganizationResource {
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
impl ResourceWithImportState for OrganizationResource {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_composite_id(&["organization_id"], &request, &mut response);
        response
    }
}
