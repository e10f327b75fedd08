use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::error::ApiError;

const API_PATH: &str = "/api/v1";

/// Settings for building a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Log request and response bodies
    pub debug: bool,
    /// 0 disables pacing
    pub requests_per_second: u32,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            debug: false,
            requests_per_second: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Meraki Dashboard API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    debug: bool,
    pacer: Pacer,
}

impl Client {
    /// Create a new API client with default settings
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::new(base_url, api_key))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("terraform-provider-meraki/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", config.api_key),
                debug: config.debug,
                pacer: Pacer::new(config.requests_per_second),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Organization and organization-scoped network operations
    pub fn organizations(&self) -> super::organizations::OrganizationsApi<'_> {
        super::organizations::OrganizationsApi::new(self)
    }

    pub fn networks(&self) -> super::networks::NetworksApi<'_> {
        super::networks::NetworksApi::new(self)
    }

    pub fn devices(&self) -> super::devices::DevicesApi<'_> {
        super::devices::DevicesApi::new(self)
    }

    /// One attempt per call; failures go straight back to the caller
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.inner.pacer.wait().await;

        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);
        if self.inner.debug {
            if let Some(body) = body {
                tracing::debug!("Request body: {}", body);
            }
        }

        let mut request = self
            .inner
            .http_client
            .request(method, &url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("Response status: {}", status);
        if self.inner.debug {
            tracing::debug!("Response body: {}", text);
        }

        if !status.is_success() {
            tracing::error!("API error response ({}): {}", status, text);
            return Err(ApiError::from_response(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(e.to_string())
        })
    }
}

/// `https://api.meraki.com/` -> `https://api.meraki.com/api/v1`
fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let parsed = url::Url::parse(base_url)?;
    let trimmed = parsed.as_str().trim_end_matches('/');
    if trimmed.ends_with(API_PATH) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", trimmed, API_PATH))
    }
}

/// Spaces requests out to at most `requests_per_second`
struct Pacer {
    interval: Option<Duration>,
    next_slot: Mutex<Instant>,
}

impl Pacer {
    fn new(requests_per_second: u32) -> Self {
        let interval = (requests_per_second > 0)
            .then(|| Duration::from_secs(1) / requests_per_second);
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn wait(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if *next_slot > now {
            tokio::time::sleep_until(*next_slot).await;
        }
        *next_slot = (*next_slot).max(now) + interval;
    }
}
