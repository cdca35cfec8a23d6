use anyhow::{Context, Result};
use std::time::Duration;

use crate::auth::{AttemptCounting, Credentials, GatewayEndpoint, RetryPolicy};

#[derive(Clone, Debug)]
pub struct Config {
    // Gateway endpoint
    pub gateway_host: String,
    pub gateway_protocol: String,
    pub auth_path: String,

    // Proxy credentials
    pub proxy_id: i64,
    pub proxy_password: String,

    // Retry policy
    pub attempts_limit: u32,
    pub attempt_delay: Duration,
    pub refresh_interval: Duration,
    pub legacy_attempt_count: bool,

    // HTTP client
    pub http_request_timeout: Duration,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            gateway_host: lookup("WEBSOCKET_GATEWAY_HTTP")
                .context("WEBSOCKET_GATEWAY_HTTP is required")?,

            gateway_protocol: lookup("GATEWAY_PROTOCOL").unwrap_or_else(|| "http".to_string()),

            auth_path: lookup("GATEWAY_AUTH_PATH").unwrap_or_else(|| "/auth/proxy".to_string()),

            proxy_id: lookup("PROXY_ID")
                .context("PROXY_ID is required")?
                .trim()
                .parse()
                .context("PROXY_ID must be an integer")?,

            proxy_password: lookup("PROXY_PASSWORD").context("PROXY_PASSWORD is required")?,

            attempts_limit: parse_or(&lookup, "AUTH_ATTEMPTS_LIMIT", 3)?,

            attempt_delay: Duration::from_secs(parse_or(&lookup, "AUTH_ATTEMPT_DELAY_SECS", 1)?),

            refresh_interval: Duration::from_secs(parse_or(
                &lookup,
                "TOKEN_REFRESH_INTERVAL_SECS",
                30,
            )?),

            legacy_attempt_count: lookup("AUTH_LEGACY_ATTEMPT_COUNT")
                .map(|s| parse_bool(&s))
                .unwrap_or(false),

            http_request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_REQUEST_TIMEOUT",
                30,
            )?),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: parse_log_format(&lookup("LOG_FORMAT").unwrap_or_default()),
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.gateway_host.trim().is_empty() {
            anyhow::bail!("WEBSOCKET_GATEWAY_HTTP cannot be empty");
        }

        if !matches!(self.gateway_protocol.as_str(), "http" | "https") {
            anyhow::bail!(
                "GATEWAY_PROTOCOL must be http or https, got: {}",
                self.gateway_protocol
            );
        }

        if self.proxy_password.is_empty() {
            anyhow::bail!("PROXY_PASSWORD cannot be empty");
        }

        if self.attempts_limit == 0 {
            anyhow::bail!("AUTH_ATTEMPTS_LIMIT must be at least 1");
        }

        if self.legacy_attempt_count && self.attempts_limit < 2 {
            anyhow::bail!("AUTH_LEGACY_ATTEMPT_COUNT requires AUTH_ATTEMPTS_LIMIT of at least 2");
        }

        if self.refresh_interval.is_zero() {
            anyhow::bail!("TOKEN_REFRESH_INTERVAL_SECS must be greater than 0");
        }

        if self.http_request_timeout.is_zero() {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than 0");
        }

        self.endpoint()
            .url()
            .context("Gateway authentication URL is invalid")?;

        Ok(())
    }

    pub fn endpoint(&self) -> GatewayEndpoint {
        GatewayEndpoint::new(
            self.gateway_protocol.clone(),
            self.gateway_host.clone(),
            self.auth_path.clone(),
        )
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.proxy_id, self.proxy_password.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let counting = if self.legacy_attempt_count {
            AttemptCounting::Legacy
        } else {
            AttemptCounting::Configured
        };

        RetryPolicy::new(self.attempts_limit, self.attempt_delay, self.refresh_interval)
            .with_counting(counting)
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

/// Parse a boolean flag from string
fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse log format from string
fn parse_log_format(s: &str) -> LogFormat {
    match s.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}
