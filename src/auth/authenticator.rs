// Gateway authentication exchange
// One POST per call; retry policy lives in the refresher

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::types::{Credentials, ProxyAuthRequest, ProxyAuthResponse};
use crate::error::{AuthError, Result};

/// Performs a single authentication exchange
///
/// Implementations must not retry internally: every call counts as one
/// attempt against the refresher's attempts limit.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate and return the issued token
    async fn authenticate(&self, credentials: &Credentials) -> Result<String>;
}

/// Where the gateway's authentication endpoint lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEndpoint {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

impl GatewayEndpoint {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Assemble `scheme://host/path`
    pub fn url(&self) -> Result<Url> {
        if self.host.is_empty() {
            return Err(AuthError::InvalidUrl("gateway host is empty".to_string()));
        }

        let path = self.path.trim_start_matches('/');
        let raw = format!("{}://{}/{}", self.scheme, self.host, path);
        Url::parse(&raw).map_err(|e| AuthError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

/// Authenticator backed by the gateway's HTTP endpoint
pub struct HttpAuthenticator {
    /// HTTP client for auth requests
    client: Client,

    /// Fully assembled auth URL
    url: Url,
}

impl HttpAuthenticator {
    /// Create a new authenticator for the given endpoint
    pub fn new(endpoint: &GatewayEndpoint, request_timeout: Duration) -> anyhow::Result<Self> {
        let url = endpoint
            .url()
            .context("Failed to build gateway authentication URL")?;

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url })
    }

    /// Authentication URL this instance posts to
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        tracing::debug!(
            url = %self.url,
            proxy_id = credentials.proxy_id(),
            "Sending proxy authentication request"
        );

        let response = self
            .client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .json(&ProxyAuthRequest::from(credentials))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The status alone decides the outcome; the body is context only
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let data: ProxyAuthResponse = serde_json::from_str(&body)?;

        match data.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::EmptyToken),
        }
    }
}
