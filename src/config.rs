//! Client configuration.
//!
//! Configuration is either built programmatically with [`ConfigBuilder`] or loaded from the
//! process environment (and an optional `.env` file) with [`Config::from_env`]. Missing
//! credentials are a [`ConfigError`]; callers are expected to treat that as fatal at startup.

use {
    crate::{constants::*, ConfigError, Region},
    chrono::Duration,
    derive_builder::{Builder, UninitializedFieldError},
    log::{debug, warn},
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        str::FromStr,
        time::Duration as StdDuration,
    },
};

/// The client secret used to key request signatures.
///
/// The secret is never revealed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wrap a raw client secret.
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self(secret.into())
    }

    /// The raw secret bytes, for keying HMAC.
    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<String> for ClientSecret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

impl From<&str> for ClientSecret {
    fn from(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

impl Debug for ClientSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("ClientSecret")
    }
}

impl Display for ClientSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("ClientSecret")
    }
}

/// Immutable client configuration.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(error = "ConfigError"), derive(Debug))]
pub struct Config {
    /// The cloud project's client (access) id.
    #[builder(setter(into))]
    client_id: String,

    /// The cloud project's client secret.
    #[builder(setter(into))]
    client_secret: ClientSecret,

    /// The id of the FingerBot device.
    #[builder(setter(into))]
    device_id: String,

    /// The data center to talk to.
    #[builder(default)]
    region: Region,

    /// Overrides the region's endpoint, e.g. to point at a test server.
    #[builder(setter(into, strip_option), default)]
    base_url: Option<String>,

    /// Timeout applied to every HTTP request.
    #[builder(default = "StdDuration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)")]
    http_timeout: StdDuration,

    /// Safety margin subtracted from the token expiry.
    #[builder(default = "Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS)")]
    refresh_margin: Duration,
}

impl From<UninitializedFieldError> for ConfigError {
    fn from(e: UninitializedFieldError) -> Self {
        ConfigError::Missing(vec![e.field_name().to_string()])
    }
}

impl Config {
    /// Create a [ConfigBuilder] to construct a [Config].
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from the environment, reading a `.env` file first if one exists.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] naming every absent required variable, or another
    /// [`ConfigError`] if a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("from_env: loaded {}", path.display()),
            Err(e) if e.not_found() => (),
            Err(e) => warn!("from_env: ignoring unreadable .env file: {}", e),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` to resolve variable names. Empty values are treated as
    /// absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let client_id = get(ENV_CLIENT_ID);
        let client_secret = get(ENV_CLIENT_SECRET);
        let device_id = get(ENV_DEVICE_ID);

        let missing: Vec<String> = [
            (ENV_CLIENT_ID, client_id.is_none()),
            (ENV_CLIENT_SECRET, client_secret.is_none()),
            (ENV_DEVICE_ID, device_id.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let mut builder = Self::builder();
        builder
            .client_id(client_id.unwrap_or_default())
            .client_secret(client_secret.unwrap_or_default())
            .device_id(device_id.unwrap_or_default());

        if let Some(region) = get(ENV_REGION) {
            builder.region(Region::from_str(&region)?);
        }

        if let Some(base_url) = get(ENV_BASE_URL) {
            builder.base_url(base_url.trim_end_matches('/').to_string());
        }

        if let Some(secs) = get(ENV_HTTP_TIMEOUT_SECS) {
            builder.http_timeout(StdDuration::from_secs(parse_number(ENV_HTTP_TIMEOUT_SECS, &secs)?));
        }

        if let Some(secs) = get(ENV_TOKEN_REFRESH_MARGIN_SECS) {
            let margin = parse_number::<u64>(ENV_TOKEN_REFRESH_MARGIN_SECS, &secs)?;
            let margin = i64::try_from(margin).ok().and_then(Duration::try_seconds).ok_or_else(|| {
                ConfigError::InvalidValue {
                    name: ENV_TOKEN_REFRESH_MARGIN_SECS.to_string(),
                    value: secs.clone(),
                }
            })?;
            builder.refresh_margin(margin);
        }

        let config = builder.build()?;
        debug!("from_env: device_id={} region={}", config.device_id, config.region);
        Ok(config)
    }

    /// Retrieve the client id.
    #[inline]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Retrieve the client secret.
    #[inline]
    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    /// Retrieve the device id.
    #[inline]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Retrieve the region.
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// The endpoint requests are sent to: the override if set, otherwise the region's.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_else(|| self.region.base_url())
    }

    /// Retrieve the HTTP timeout.
    #[inline]
    pub fn http_timeout(&self) -> StdDuration {
        self.http_timeout
    }

    /// Retrieve the token refresh margin.
    #[inline]
    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}
