//! Provider configuration
//!
//! Every attribute can also come from the environment; the value in the
//! provider block wins when both are set.

use std::sync::OnceLock;
use std::time::Duration;

use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::ClientConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/";
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

const BASE_URL: &str = "meraki_base_url";
const API_KEY: &str = "meraki_dashboard_api_key";
const DEBUG: &str = "meraki_debug";
const REQUESTS_PER_SECOND: &str = "meraki_requests_per_second";

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub debug: bool,
    pub requests_per_second: u32,
}

impl ProviderConfig {
    pub fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            SchemaBuilder::new()
                .version(0)
                .description("Manage Cisco Meraki Dashboard organizations, networks and devices")
                .attribute(
                    AttributeBuilder::new(BASE_URL, AttributeType::String)
                        .description("Dashboard API base URL. Defaults to MERAKI_BASE_URL or https://api.meraki.com/")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(API_KEY, AttributeType::String)
                        .description("Dashboard API key. Defaults to MERAKI_DASHBOARD_API_KEY")
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(DEBUG, AttributeType::Bool)
                        .description("Log request and response bodies. Defaults to MERAKI_DEBUG")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new(REQUESTS_PER_SECOND, AttributeType::Number)
                        .description("Maximum API requests per second, 0 to disable pacing. Defaults to MERAKI_REQUESTS_PER_SECOND or 10")
                        .optional()
                        .build(),
                )
                .build()
        })
    }

    /// Resolve the provider block against the environment
    pub fn load(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = vec![];

        let base_url = string_setting(config, BASE_URL, "MERAKI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = string_setting(config, API_KEY, "MERAKI_DASHBOARD_API_KEY");
        if api_key.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Dashboard API key",
                    "meraki_dashboard_api_key is required (set in provider config or MERAKI_DASHBOARD_API_KEY env var)",
                )
                .with_attribute(AttributePath::new(API_KEY)),
            );
        }

        let debug = match bool_setting(config, DEBUG, "MERAKI_DEBUG") {
            Ok(value) => value.unwrap_or(false),
            Err(diag) => {
                diagnostics.push(diag);
                false
            }
        };

        let requests_per_second =
            match rate_setting(config, REQUESTS_PER_SECOND, "MERAKI_REQUESTS_PER_SECOND") {
                Ok(value) => value.unwrap_or(DEFAULT_REQUESTS_PER_SECOND),
                Err(diag) => {
                    diagnostics.push(diag);
                    DEFAULT_REQUESTS_PER_SECOND
                }
            };

        match api_key {
            Some(api_key) if diagnostics.is_empty() => Ok(Self {
                base_url,
                api_key,
                debug,
                requests_per_second,
            }),
            _ => Err(diagnostics),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            debug: self.debug,
            requests_per_second: self.requests_per_second,
            timeout: Duration::from_secs(60),
        }
    }
}

fn config_value<'a>(config: &'a DynamicValue, name: &str) -> Option<&'a Dynamic> {
    config
        .get(&AttributePath::new(name))
        .ok()
        .filter(|v| v.is_known())
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn string_setting(config: &DynamicValue, name: &str, var: &str) -> Option<String> {
    config_value(config, name)
        .and_then(Dynamic::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| env_value(var))
}

fn bool_setting(config: &DynamicValue, name: &str, var: &str) -> Result<Option<bool>, Diagnostic> {
    if let Some(value) = config_value(config, name).and_then(Dynamic::as_bool) {
        return Ok(Some(value));
    }
    match env_value(var) {
        Some(raw) => raw.trim().parse::<bool>().map(Some).map_err(|_| {
            Diagnostic::error(
                format!("Invalid value for {}", var),
                format!("Expected true or false, got {:?}", raw),
            )
        }),
        None => Ok(None),
    }
}

fn rate_setting(config: &DynamicValue, name: &str, var: &str) -> Result<Option<u32>, Diagnostic> {
    let invalid = |raw: String| {
        Diagnostic::error(
            format!("Invalid value for {}", name),
            format!("Expected a whole number of requests per second, got {}", raw),
        )
        .with_attribute(AttributePath::new(name))
    };

    if let Some(value) = config_value(config, name).and_then(Dynamic::as_number) {
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(invalid(value.to_string()));
        }
        return Ok(Some(value as u32));
    }
    match env_value(var) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| invalid(format!("{:?} from {}", raw, var))),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: [&str; 4] = [
        "MERAKI_BASE_URL",
        "MERAKI_DASHBOARD_API_KEY",
        "MERAKI_DEBUG",
        "MERAKI_REQUESTS_PER_SECOND",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn load_falls_back_to_environment() {
        clear_env();
        std::env::set_var("MERAKI_DASHBOARD_API_KEY", "env-key");
        std::env::set_var("MERAKI_DEBUG", "true");
        std::env::set_var("MERAKI_REQUESTS_PER_SECOND", "5");

        let config = ProviderConfig::load(&DynamicValue::object()).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "env-key");
        assert!(config.debug);
        assert_eq!(config.requests_per_second, 5);

        clear_env();
    }

    #[test]
    #[serial]
    fn provider_block_overrides_environment() {
        clear_env();
        std::env::set_var("MERAKI_DASHBOARD_API_KEY", "env-key");
        std::env::set_var("MERAKI_BASE_URL", "https://env.example.com/");

        let mut block = DynamicValue::object();
        block
            .set_string(&AttributePath::new(API_KEY), "block-key")
            .unwrap();
        block
            .set_string(&AttributePath::new(BASE_URL), "https://n1.meraki.com/")
            .unwrap();
        block
            .set_number(&AttributePath::new(REQUESTS_PER_SECOND), 0.0)
            .unwrap();

        let config = ProviderConfig::load(&block).unwrap();
        assert_eq!(config.api_key, "block-key");
        assert_eq!(config.base_url, "https://n1.meraki.com/");
        assert_eq!(config.requests_per_second, 0);
        assert!(!config.debug);

        clear_env();
    }

    #[test]
    #[serial]
    fn missing_api_key_is_an_error() {
        clear_env();

        let diagnostics = ProviderConfig::load(&DynamicValue::object()).unwrap_err();

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("API key"));
    }

    #[test]
    #[serial]
    fn malformed_environment_values_are_reported() {
        clear_env();
        std::env::set_var("MERAKI_DASHBOARD_API_KEY", "env-key");
        std::env::set_var("MERAKI_DEBUG", "yes please");
        std::env::set_var("MERAKI_REQUESTS_PER_SECOND", "-3");

        let diagnostics = ProviderConfig::load(&DynamicValue::object()).unwrap_err();
        assert_eq!(diagnostics.len(), 2);

        clear_env();
    }

    #[test]
    #[serial]
    fn fractional_rate_is_rejected() {
        clear_env();
        let mut block = DynamicValue::object();
        block
            .set_string(&AttributePath::new(API_KEY), "block-key")
            .unwrap();
        block
            .set_number(&AttributePath::new(REQUESTS_PER_SECOND), 2.5)
            .unwrap();

        let diagnostics = ProviderConfig::load(&block).unwrap_err();
        assert!(diagnostics[0].summary.contains(REQUESTS_PER_SECOND));
    }

    #[test]
    fn schema_marks_api_key_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.attribute(API_KEY).unwrap().sensitive);
        assert_eq!(schema.attributes().len(), 4);
    }
}
