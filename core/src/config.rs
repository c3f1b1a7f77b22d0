//! Configuration for the native transport.

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, Result};

/// Connection settings for `UreqClient`.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Base URL of the default (master) instance, e.g. `https://scc:8443`.
    pub base_url: String,
    /// Base URL of the shadow instance. Shadow requests fail without it.
    pub shadow_url: Option<String>,
    /// Basic-auth user name.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Skip TLS certificate verification (connectors ship self-signed certs).
    pub skip_cert_verification: bool,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Deadline for a whole request/response round trip.
    pub request_timeout: Duration,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8443".to_string(),
            shadow_url: None,
            username: None,
            password: None,
            skip_cert_verification: false,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ConnectorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SCC_BASE_URL`: master instance URL (default: "https://localhost:8443")
    /// - `SCC_SHADOW_URL`: shadow instance URL (optional)
    /// - `SCC_USERNAME` / `SCC_PASSWORD`: basic-auth credentials (optional)
    /// - `SCC_SKIP_CERT_VERIFICATION`: "true" or "1" to skip TLS verification
    /// - `SCC_CONNECT_TIMEOUT_MS`: connection timeout (default: 10000)
    /// - `SCC_REQUEST_TIMEOUT_MS`: request timeout (default: 60000)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("SCC_BASE_URL")
            .unwrap_or_else(|_| "https://localhost:8443".to_string());
        let shadow_url = std::env::var("SCC_SHADOW_URL").ok();
        let username = std::env::var("SCC_USERNAME").ok();
        let password = std::env::var("SCC_PASSWORD").ok();

        let skip_cert_verification = std::env::var("SCC_SKIP_CERT_VERIFICATION")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let connect_timeout_ms = parse_millis("SCC_CONNECT_TIMEOUT_MS", 10_000)?;
        let request_timeout_ms = parse_millis("SCC_REQUEST_TIMEOUT_MS", 60_000)?;

        let config = Self {
            base_url,
            shadow_url,
            username,
            password,
            skip_cert_verification,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_shadow_url(mut self, url: impl Into<String>) -> Self {
        self.shadow_url = Some(url.into());
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_skip_cert_verification(mut self, skip: bool) -> Self {
        self.skip_cert_verification = skip;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Both URLs must be absolute http(s) URLs with a host.
    pub fn validate(&self) -> Result<()> {
        parse_base_url("base_url", &self.base_url)?;
        if let Some(shadow) = &self.shadow_url {
            parse_base_url("shadow_url", shadow)?;
        }
        Ok(())
    }
}

/// Parse a base URL, normalized to end with `/` so relative paths join under it.
pub(crate) fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| ApiError::Config(format!("invalid {name} '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!(
            "{name} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::Config(format!("{name} has no host: {raw}")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_millis(var: &str, default: u64) -> Result<u64> {
    match std::env::var(var) {
        Ok(v) => v
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid {var}: {e}"))),
        Err(_) => Ok(default),
    }
}
