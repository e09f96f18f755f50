use log::debug;
use reqwest::{IntoUrl, Method, RequestBuilder, Url};
use rollcall_common::api::envelope::Envelope;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// HTTP client for the control server. Owns its transport explicitly:
/// construct one with [`new`](Self::new), or inject a preconfigured
/// `reqwest::Client` through [`with_http_client`](Self::with_http_client).
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ControlClient {
    pub fn new(base_url: impl IntoUrl) -> Result<Self, ApiError> {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl IntoUrl,
    ) -> Result<Self, ApiError> {
        let mut base_url = base_url.into_url().map_err(|_| ApiError::InvalidBaseUrl)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl);
        }

        // Url::join treats a base without a trailing slash as a file and
        // would drop its last path segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|_| ApiError::InvalidBaseUrl)?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        match self.execute_optional(request).await? {
            Some(data) => Ok(data),
            None => Err(ApiError::MissingData),
        }
    }

    /// Like [`execute`](Self::execute), but tolerates a success envelope with
    /// a null payload.
    pub(crate) async fn execute_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.msg)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiError::Status { status, message });
        }

        let envelope = response.json::<Envelope<T>>().await?;
        match envelope.code {
            0 => Ok(envelope.data),
            code => Err(ApiError::Api {
                code,
                message: envelope
                    .msg
                    .unwrap_or_else(|| "request failed".to_string()),
            }),
        }
    }
}
