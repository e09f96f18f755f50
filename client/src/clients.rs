use reqwest::Method;
use rollcall_common::api::clients::{
    ClientPage, ClientRecord, ListClientsParams, RemoveOfflineResult,
};

use crate::ControlClient;
use crate::error::ApiError;

impl ControlClient {
    /// Fetch one page of client records, ordered by heartbeat recency.
    pub async fn list_clients(&self, params: ListClientsParams) -> Result<ClientPage, ApiError> {
        let request = self.request(Method::GET, "clients")?.query(&params);
        self.execute(request).await
    }

    pub async fn get_client(&self, client_id: &str) -> Result<ClientRecord, ApiError> {
        let request = self.request(Method::GET, &format!("client/{client_id}"))?;
        self.execute(request).await
    }

    /// Delete every client currently marked offline. The count covers this
    /// call only; repeating it without new stragglers yields zero.
    pub async fn remove_offline_clients(&self) -> Result<RemoveOfflineResult, ApiError> {
        let request = self.request(Method::DELETE, "clients/offline")?;
        self.execute(request).await
    }
}
