//! `meraki_devices_wireless_radio_settings` resource
//!
//! Radio settings always exist on a wireless device, so "create" adopts them
//! and "delete" only forgets them.

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

use super::{removed_outside_terraform, required_id, unsupported};
use crate::api::Client;
use crate::provider_data::{api_failure, cancelled, not_configured, within};
use crate::MerakiProviderData;

const TYPE_NAME: &str = "meraki_devices_wireless_radio_settings";

const FIVE_GHZ_CHANNEL_WIDTHS: [f64; 5] = [0.0, 20.0, 40.0, 80.0, 160.0];

#[derive(Default)]
pub struct WirelessRadioSettingsResource {
    provider_data: Option<MerakiProviderData>,
}

impl WirelessRadioSettingsResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SchemaBuilder::new()
                .version(0)
                .description("Manages the radio settings of a Meraki wireless device")
                .attribute(
                    AttributeBuilder::new("serial", AttributeType::String)
                        .description("Device serial")
                        .required()
                        .identity()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("rf_profile_id", AttributeType::String)
                        .description("The ID of an RF profile to assign to the device")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::nested(
                        "two_four_ghz_settings",
                        NestedType::single(vec![
                            AttributeBuilder::new("channel", AttributeType::Number)
                                .description("Manual channel for 2.4 GHz")
                                .optional()
                                .computed()
                                .build(),
                            AttributeBuilder::new("target_power", AttributeType::Number)
                                .description("Manual target power for 2.4 GHz (dBm)")
                                .optional()
                                .computed()
                                .build(),
                        ]),
                    )
                    .description("Manual radio settings for 2.4 GHz")
                    .optional()
                    .computed()
                    .build(),
                )
                .attribute(
                    AttributeBuilder::nested(
                        "five_ghz_settings",
                        NestedType::single(vec![
                            AttributeBuilder::new("channel", AttributeType::Number)
                                .description("Manual channel for 5 GHz")
                                .optional()
                                .computed()
                                .build(),
                            AttributeBuilder::new("channel_width", AttributeType::Number)
                                .description("Manual channel width for 5 GHz: 0 (auto), 20, 40, 80 or 160")
                                .optional()
                                .computed()
                                .build(),
                            AttributeBuilder::new("target_power", AttributeType::Number)
                                .description("Manual target power for 5 GHz (dBm)")
                                .optional()
                                .computed()
                                .build(),
                        ]),
                    )
                    .description("Manual radio settings for 5 GHz")
                    .optional()
                    .computed()
                    .build(),
                )
                .build()
        })
    }

    async fn write_settings(
        &self,
        client: &Client,
        serial: &str,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let schema = Self::schema_static();
        client
            .devices()
            .update_wireless_radio_settings(serial, &wire::encode(schema, plan))
            .await
            .map_err(|e| api_failure("updateDeviceWirelessRadioSettings", &e))?;

        let fresh = client
            .devices()
            .get_wireless_radio_settings(serial)
            .await
            .map_err(|e| api_failure("getDeviceWirelessRadioSettings", &e))?;

        Ok(StateMerger::new(schema).merge_for_write(plan, &wire::decode(schema, &fresh)))
    }

    async fn adopt_settings(
        &self,
        client: &Client,
        plan: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let serial = required_id(plan, "serial")?;

        // There is nothing to create; the device has to exist already
        client
            .devices()
            .get_wireless_radio_settings(&serial)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Diagnostic::error(
                        "Device not found",
                        format!("No wireless device with serial {} exists: {}", serial, e),
                    )
                    .with_attribute(AttributePath::new("serial"))
                } else {
                    api_failure("getDeviceWirelessRadioSettings", &e)
                }
            })?;

        tracing::debug!("Adopting radio settings of device {}", serial);
        self.write_settings(client, &serial, plan).await
    }
}

#[async_trait]
impl Resource for WirelessRadioSettingsResource {
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

        let path = AttributePath::new("five_ghz_settings").attribute("channel_width");
        if let Ok(width) = request.config.get_number(&path) {
            if !FIVE_GHZ_CHANNEL_WIDTHS.contains(&width) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid channel width",
                        format!(
                            "5 GHz channel width must be one of 0, 20, 40, 80, 160; got {}",
                            width
                        ),
                    )
                    .with_attribute(path),
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
            self.adopt_settings(&provider_data.client, &request.planned_state),
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

        let serial = match required_id(&request.current_state, "serial") {
            Ok(serial) => serial,
            Err(diag) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![diag],
                }
            }
        };

        let devices = provider_data.client.devices();
        let Some(result) = ctx.run(devices.get_wireless_radio_settings(&serial)).await else {
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
                tracing::warn!("Device {} not found, removing radio settings from state", serial);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![removed_outside_terraform(TYPE_NAME, &serial)],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![api_failure("getDeviceWirelessRadioSettings", &e)],
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

        let serial = match required_id(&request.prior_state, "serial") {
            Ok(serial) => serial,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: vec![diag],
                }
            }
        };

        if let Err(diag) = ensure_identity_unchanged(
            Self::schema_static(),
            &request.prior_state,
            &request.planned_state,
        ) {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            };
        }

        match within(
            &ctx,
            self.write_settings(&provider_data.client, &serial, &request.planned_state),
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
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let serial = request
            .prior_state
            .get_optional_string(&AttributePath::new("serial"))
            .unwrap_or_default();
        tracing::warn!(
            "{} has no delete method, removing {} from state only",
            TYPE_NAME,
            serial
        );

        DeleteResourceResponse {
            diagnostics: vec![unsupported(TYPE_NAME, "delete")],
            remove_from_state: true,
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for WirelessRadioSettingsResource {
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
impl ResourceWithImportState for WirelessRadioSettingsResource {
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_composite_id(&["serial"], &request, &mut response);
        response
    }
}
