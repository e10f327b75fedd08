//! Terraform provider for the Cisco Meraki Dashboard API

pub mod api;
pub mod config;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::MerakiProviderData;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use tfplug::types::{has_errors, AttributePath, Diagnostic};
use tfplug::{DataSourceFactory, Provider, ResourceFactory};

use crate::config::ProviderConfig;
use crate::provider_data::not_configured;

#[derive(Default)]
pub struct MerakiProvider {
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl MerakiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate and configure a resource by type name
    pub async fn create_resource(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> Result<Box<dyn ResourceWithConfigure>, Vec<Diagnostic>> {
        let provider_data = self.provider_data.clone().ok_or_else(|| vec![not_configured()])?;
        let factory = self.resources().remove(type_name).ok_or_else(|| {
            vec![Diagnostic::error(
                "Unknown resource type",
                format!("The meraki provider has no resource named {}", type_name),
            )]
        })?;

        let mut resource = factory();
        let response = resource
            .configure(
                ctx.with_operation(format!("configure {}", type_name)),
                ConfigureResourceRequest {
                    provider_data: Some(provider_data),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    /// Instantiate and configure a data source by type name
    pub async fn create_data_source(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let provider_data = self.provider_data.clone().ok_or_else(|| vec![not_configured()])?;
        let factory = self.data_sources().remove(type_name).ok_or_else(|| {
            vec![Diagnostic::error(
                "Unknown data source type",
                format!("The meraki provider has no data source named {}", type_name),
            )]
        })?;

        let mut data_source = factory();
        let response = data_source
            .configure(
                ctx.with_operation(format!("configure {}", type_name)),
                ConfigureDataSourceRequest {
                    provider_data: Some(provider_data),
                },
            )
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }
}

#[async_trait]
impl Provider for MerakiProvider {
    fn type_name(&self) -> &str {
        "meraki"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: ProviderConfig::schema().clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        let path = AttributePath::new("meraki_base_url");
        if let Some(base_url) = request.config.get_optional_string(&path) {
            if let Err(e) = url::Url::parse(&base_url) {
                diagnostics.push(
                    Diagnostic::error("Invalid base URL", format!("{}: {}", base_url, e))
                        .with_attribute(path),
                );
            }
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let config = match ProviderConfig::load(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };

        tracing::debug!(
            "Configuring meraki provider for {} ({} requests/s, debug {})",
            config.base_url,
            config.requests_per_second,
            config.debug
        );

        match api::Client::with_config(config.client_config()) {
            Ok(client) => {
                let data: Arc<dyn Any + Send + Sync> = Arc::new(MerakiProviderData::new(client));
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(data),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "meraki_organizations".to_string(),
            Box::new(|| Box::new(resources::OrganizationResource::new()) as Box<dyn ResourceWithConfigure>),
        );
        factories.insert(
            "meraki_networks".to_string(),
            Box::new(|| Box::new(resources::NetworkResource::new()) as Box<dyn ResourceWithConfigure>),
        );
        factories.insert(
            "meraki_devices_wireless_radio_settings".to_string(),
            Box::new(|| {
                Box::new(resources::WirelessRadioSettingsResource::new())
                    as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "meraki_organizations".to_string(),
            Box::new(|| Box::new(data_sources::OrganizationsDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        factories.insert(
            "meraki_networks".to_string(),
            Box::new(|| Box::new(data_sources::NetworksDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        factories.insert(
            "meraki_devices_switch_ports".to_string(),
            Box::new(|| {
                Box::new(data_sources::SwitchPortsDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
