//! `meraki_devices_switch_ports` data source

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

const TYPE_NAME: &str = "meraki_devices_switch_ports";

const METHOD_GROUPS: [&[&str]; 2] = [&["serial"], &["serial", "port_id"]];

#[derive(Default)]
pub struct SwitchPortsDataSource {
    provider_data: Option<MerakiProviderData>,
}

impl SwitchPortsDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let builder = SchemaBuilder::new()
                .version(0)
                .description("Lists the ports of a switch, or fetches one port")
                .attribute(
                    AttributeBuilder::new("serial", AttributeType::String)
                        .description("Switch serial")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("port_id", AttributeType::String)
                        .description("Port ID")
                        .optional()
                        .build(),
                );
            with_results(builder, item_attributes()).build()
        })
    }

    async fn lookup(&self, config: &DynamicValue) -> Result<Lookup, Diagnostic> {
        let provider_data = self.provider_data.as_ref().ok_or_else(not_configured)?;
        let devices = provider_data.client.devices();

        let has_serial = is_set(config, "serial");
        let has_port = is_set(config, "port_id");
        let serial = config
            .get_optional_string(&AttributePath::new("serial"))
            .unwrap_or_default();

        match pick_method(&[&[has_serial], &[has_serial, has_port]]) {
            NO_METHOD => Err(no_method(TYPE_NAME, &METHOD_GROUPS)),
            1 => devices
                .list_switch_ports(&serial)
                .await
                .map(Lookup::Many)
                .map_err(|e| api_failure("getDeviceSwitchPorts", &e)),
            _ => {
                let port_id = config
                    .get_optional_string(&AttributePath::new("port_id"))
                    .unwrap_or_default();
                devices
                    .get_switch_port(&serial, &port_id)
                    .await
                    .map(Lookup::One)
                    .map_err(|e| api_failure("getDeviceSwitchPort", &e))
            }
        }
    }
}

fn item_attributes() -> Vec<Attribute> {
    let string_list = || AttributeType::List(Box::new(AttributeType::String));
    let string = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::String)
            .description(description)
            .computed()
            .build()
    };
    let flag = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::Bool)
            .description(description)
            .computed()
            .build()
    };

    vec![
        string("port_id", "The identifier of the switch port"),
        string("name", "The name of the switch port"),
        AttributeBuilder::new("tags", string_list())
            .description("The list of tags of the switch port")
            .computed()
            .build(),
        flag("enabled", "The status of the switch port"),
        flag("poe_enabled", "The PoE status of the switch port"),
        string("type", "The type of the switch port ('trunk' or 'access')"),
        AttributeBuilder::new("vlan", AttributeType::Number)
            .description("The VLAN of the switch port. For a trunk port, this is the native VLAN")
            .computed()
            .build(),
        AttributeBuilder::new("voice_vlan", AttributeType::Number)
            .description("The voice VLAN of the switch port. Only applicable to access ports")
            .computed()
            .build(),
        string("allowed_vlans", "The VLANs allowed on the switch port. Only applicable to trunk ports"),
        flag("isolation_enabled", "The isolation status of the switch port"),
        flag("rstp_enabled", "The rapid spanning tree protocol status"),
        string("stp_guard", "The state of the STP guard ('disabled', 'root guard', 'bpdu guard' or 'loop guard')"),
        string("link_negotiation", "The link speed for the switch port"),
        string("access_policy_type", "The type of the access policy of the switch port"),
        AttributeBuilder::new("sticky_mac_allow_list", string_list())
            .description("The initial list of MAC addresses for sticky Mac allow list")
            .computed()
            .build(),
        string("udld", "The action to take when Unidirectional Link is detected"),
    ]
}

#[async_trait]
impl DataSource for SwitchPortsDataSource {
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
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let mut diagnostics = vec![];

        if is_set(&request.config, "port_id") && !is_set(&request.config, "serial") {
            diagnostics.push(
                Diagnostic::error("Missing serial", "port_id can only be used together with serial")
                    .with_attribute(AttributePath::new("serial")),
            );
        }

        ValidateDataSourceConfigResponse { diagnostics }
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
impl DataSourceWithConfigure for SwitchPortsDataSource {
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
