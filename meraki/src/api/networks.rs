use serde_json::Value;

use super::{segment, ApiError, Client};

/// `/networks/{networkId}` endpoints
pub struct NetworksApi<'a> {
    client: &'a Client,
}

impl<'a> NetworksApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// getNetwork
    pub async fn get(&self, network_id: &str) -> Result<Value, ApiError> {
        self.client
            .get(&format!("/networks/{}", segment(network_id)))
            .await
    }

    /// updateNetwork
    pub async fn update(&self, network_id: &str, body: &Value) -> Result<Value, ApiError> {
        self.client
            .put(&format!("/networks/{}", segment(network_id)), body)
            .await
    }

    /// deleteNetwork
    pub async fn delete(&self, network_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/networks/{}", segment(network_id)))
            .await
    }
}
