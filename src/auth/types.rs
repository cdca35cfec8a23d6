// Authentication types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy credentials presented to the gateway
///
/// Immutable once built. The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    proxy_id: i64,
    proxy_password: String,
}

impl Credentials {
    pub fn new(proxy_id: i64, proxy_password: impl Into<String>) -> Self {
        Self {
            proxy_id,
            proxy_password: proxy_password.into(),
        }
    }

    pub fn proxy_id(&self) -> i64 {
        self.proxy_id
    }

    pub fn proxy_password(&self) -> &str {
        &self.proxy_password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("proxy_id", &self.proxy_id)
            .field("proxy_password", &"<redacted>")
            .finish()
    }
}

/// Gateway proxy authentication request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAuthRequest<'a> {
    pub proxy_id: i64,
    pub proxy_password: &'a str,
}

impl<'a> From<&'a Credentials> for ProxyAuthRequest<'a> {
    fn from(creds: &'a Credentials) -> Self {
        Self {
            proxy_id: creds.proxy_id,
            proxy_password: &creds.proxy_password,
        }
    }
}

/// Gateway proxy authentication response body
#[derive(Deserialize)]
pub struct ProxyAuthResponse {
    #[serde(default)]
    pub token: Option<String>,
}
