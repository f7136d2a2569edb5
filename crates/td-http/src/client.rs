//! Shared request plumbing: base URL joining, bearer attachment, and
//! error mapping.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use td_core::error::{ErrorBody, RemoteError};
use td_core::ports::TokenStorePort;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Server root, e.g. `https://api.example.com`. The `/api/v1` prefix
    /// is added per endpoint.
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// The one adapter behind all three remote ports.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStorePort>,
}

impl HttpRemote {
    pub fn new(config: HttpConfig, tokens: Arc<dyn TokenStorePort>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Builder for an API-relative path with the bearer token attached
    /// when one is held.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/v1{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.tokens.get() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Raw request to an absolute URL (presigned object-store uploads);
    /// deliberately no bearer token.
    pub(crate) fn raw(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = builder.send().await.map_err(transport)?;
        let response = check_status(response).await?;
        response.json().await.map_err(transport)
    }

    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        let response = builder.send().await.map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Network(err.to_string())
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(status = status.as_u16(), "request rejected");
    Err(parse_error(status, response).await)
}

/// Map a non-2xx response through the backend's error envelope. A body
/// that fails to parse (proxies, empty bodies) still yields an `Api`
/// error carrying the status.
async fn parse_error(status: StatusCode, response: Response) -> RemoteError {
    match response.json::<ErrorBody>().await {
        Ok(body) => RemoteError::from_body(status.as_u16(), body),
        Err(_) => RemoteError::Api {
            status: status.as_u16(),
            code: "UNKNOWN".to_string(),
            message: format!(
                "request failed with status {}",
                status.canonical_reason().unwrap_or("unknown")
            ),
            details: Vec::new(),
        },
    }
}
