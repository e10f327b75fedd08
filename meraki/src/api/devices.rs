use serde_json::Value;

use super::organizations::into_list;
use super::{segment, ApiError, Client};

/// `/devices/{serial}` endpoints
pub struct DevicesApi<'a> {
    client: &'a Client,
}

impl<'a> DevicesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// getDeviceWirelessRadioSettings
    pub async fn get_wireless_radio_settings(&self, serial: &str) -> Result<Value, ApiError> {
        self.client
            .get(&format!("/devices/{}/wireless/radio/settings", segment(serial)))
            .await
    }

    /// updateDeviceWirelessRadioSettings
    pub async fn update_wireless_radio_settings(
        &self,
        serial: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.client
            .put(
                &format!("/devices/{}/wireless/radio/settings", segment(serial)),
                body,
            )
            .await
    }

    /// getDeviceSwitchPorts
    pub async fn list_switch_ports(&self, serial: &str) -> Result<Vec<Value>, ApiError> {
        let body = self
            .client
            .get(&format!("/devices/{}/switch/ports", segment(serial)))
            .await?;
        into_list(body)
    }

    /// getDeviceSwitchPort
    pub async fn get_switch_port(&self, serial: &str, port_id: &str) -> Result<Value, ApiError> {
        self.client
            .get(&format!(
                "/devices/{}/switch/ports/{}",
                segment(serial),
                segment(port_id)
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_client(url: &str) -> Client {
        let mut config = ClientConfig::new(url, "key");
        config.requests_per_second = 0;
        Client::with_config(config).unwrap()
    }

    #[tokio::test]
    async fn radio_settings_round_trip_through_put() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v1/devices/Q234-ABCD-5678/wireless/radio/settings")
            .match_body(Matcher::Json(json!({"rfProfileId": "1234"})))
            .with_body(r#"{"serial":"Q234-ABCD-5678","rfProfileId":"1234"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let settings = client
            .devices()
            .update_wireless_radio_settings("Q234-ABCD-5678", &json!({"rfProfileId": "1234"}))
            .await
            .unwrap();

        assert_eq!(settings["rfProfileId"], "1234");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn switch_port_paths_include_port_id() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/v1/devices/Q2SW/switch/ports")
            .with_body(r#"[{"portId":"1"},{"portId":"2"}]"#)
            .create_async()
            .await;
        let single = server
            .mock("GET", "/api/v1/devices/Q2SW/switch/ports/1")
            .with_body(r#"{"portId":"1","enabled":true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert_eq!(client.devices().list_switch_ports("Q2SW").await.unwrap().len(), 2);
        let port = client.devices().get_switch_port("Q2SW", "1").await.unwrap();
        assert_eq!(port["enabled"], true);

        list.assert_async().await;
        single.assert_async().await;
    }
}
