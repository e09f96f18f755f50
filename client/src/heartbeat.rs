use reqwest::Method;
use rollcall_common::api::StatusAck;
use rollcall_common::api::clients::HeartbeatRequest;

use crate::ControlClient;
use crate::error::ApiError;

impl ControlClient {
    /// Report liveness for `client_id`. Unknown ids are registered by the
    /// server on first heartbeat.
    pub async fn send_heartbeat(&self, client_id: &str) -> Result<StatusAck, ApiError> {
        let body = HeartbeatRequest {
            client_id: client_id.to_string(),
        };
        let request = self.request(Method::POST, "heartbeat")?.json(&body);
        self.execute(request).await
    }
}
