use serde_json::Value;

use super::{segment, ApiError, Client};

/// `/organizations` endpoints
pub struct OrganizationsApi<'a> {
    client: &'a Client,
}

impl<'a> OrganizationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// getOrganizations
    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let body = self.client.get("/organizations").await?;
        into_list(body)
    }

    /// getOrganization
    pub async fn get(&self, organization_id: &str) -> Result<Value, ApiError> {
        self.client
            .get(&format!("/organizations/{}", segment(organization_id)))
            .await
    }

    /// createOrganization
    pub async fn create(&self, body: &Value) -> Result<Value, ApiError> {
        self.client.post("/organizations", body).await
    }

    /// updateOrganization
    pub async fn update(&self, organization_id: &str, body: &Value) -> Result<Value, ApiError> {
        self.client
            .put(&format!("/organizations/{}", segment(organization_id)), body)
            .await
    }

    /// deleteOrganization
    pub async fn delete(&self, organization_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/organizations/{}", segment(organization_id)))
            .await
    }

    /// getOrganizationNetworks
    pub async fn list_networks(&self, organization_id: &str) -> Result<Vec<Value>, ApiError> {
        let body = self
            .client
            .get(&format!("/organizations/{}/networks", segment(organization_id)))
            .await?;
        into_list(body)
    }

    /// createOrganizationNetwork
    pub async fn create_network(
        &self,
        organization_id: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.client
            .post(
                &format!("/organizations/{}/networks", segment(organization_id)),
                body,
            )
            .await
    }
}

/// List endpoints answer with a bare JSON array
pub(crate) fn into_list(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(vec![]),
        other => Err(ApiError::ParseError(format!(
            "expected a JSON array, got: {}",
            other
        ))),
    }
}
