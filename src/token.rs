//! Access token acquisition and caching.

use {
    crate::{
        canonical::{canonical_url, RequestBody},
        clock::Clock,
        constants::*,
        transport::{into_transport_error, PlatformRequest, PlatformResponse},
        AuthError, Config, HttpMethod, PlatformError, Signer,
    },
    chrono::{DateTime, Duration, Utc},
    http::StatusCode,
    log::{debug, trace},
    parking_lot::RwLock,
    serde::Deserialize,
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        sync::Arc,
    },
    tokio::sync::Mutex as AsyncMutex,
    tower::{BoxError, Service, ServiceExt},
};

/// The response envelope of the token endpoint.
#[derive(Deserialize)]
struct TokenEnvelope {
    #[serde(default)]
    success: bool,

    #[serde(default)]
    code: Option<i64>,

    #[serde(default)]
    msg: Option<String>,

    #[serde(default)]
    result: Option<TokenResult>,
}

#[derive(Deserialize)]
struct TokenResult {
    access_token: String,

    /// Lifetime in seconds.
    expire_time: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Obtains access tokens from the platform and caches them until shortly before they expire.
///
/// A token is reused while `now < expires_at - refresh_margin`. Once that no longer holds, the
/// next [`get_token`](TokenManager::get_token) performs a new handshake. Handshakes are
/// serialized: callers arriving while one is in flight wait for it and then reuse its token.
/// A failed handshake leaves the cache untouched and is not retried.
pub struct TokenManager<T> {
    signer: Signer,
    base_url: String,
    transport: T,
    clock: Arc<dyn Clock>,
    refresh_margin: Duration,
    cache: RwLock<Option<CachedToken>>,
    handshake: AsyncMutex<()>,
}

impl<T> TokenManager<T> {
    /// Create a token manager talking to `base_url` through `transport`.
    pub fn new<S: Into<String>>(
        signer: Signer,
        base_url: S,
        transport: T,
        clock: Arc<dyn Clock>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            signer,
            base_url: base_url.into(),
            transport,
            clock,
            refresh_margin,
            cache: RwLock::new(None),
            handshake: AsyncMutex::new(()),
        }
    }

    /// Create a token manager from a [`Config`].
    pub fn from_config(config: &Config, transport: T, clock: Arc<dyn Clock>) -> Self {
        Self::new(Signer::from_config(config), config.base_url(), transport, clock, config.refresh_margin())
    }

    /// When the cached token expires, if one is cached. This is the server-reported expiry; the
    /// token stops being used `refresh_margin` earlier.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.cache.read().as_ref().map(|c| c.expires_at)
    }

    /// Drop the cached token so the next call performs a handshake.
    pub fn invalidate(&self) {
        debug!("invalidate: dropping cached access token");
        *self.cache.write() = None;
    }

    #[inline]
    pub(crate) fn signer(&self) -> &Signer {
        &self.signer
    }

    #[inline]
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn cached(&self) -> Option<String> {
        let now = self.clock.now();
        self.cache
            .read()
            .as_ref()
            .filter(|c| c.expires_at.checked_sub_signed(self.refresh_margin).is_some_and(|t| now < t))
            .map(|c| c.access_token.clone())
    }
}

impl<T> TokenManager<T>
where
    T: Service<PlatformRequest, Response = PlatformResponse, Error = BoxError> + Clone + Send,
    T::Future: Send,
{
    /// Return a valid access token, performing the handshake if none is cached.
    ///
    /// # Errors
    /// Returns an [`AuthError`] if the handshake fails at the network, HTTP, or platform level.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached() {
            trace!("get_token: using cached token");
            return Ok(token);
        }

        let _gate = self.handshake.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached() {
            trace!("get_token: token refreshed by concurrent handshake");
            return Ok(token);
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *self.cache.write() = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken, AuthError> {
        let url = canonical_url(PATH_TOKEN, &[(QP_GRANT_TYPE, QP_GRANT_TYPE_SIMPLE)]);
        let signed = self.signer.sign(HttpMethod::Get, &url, &RequestBody::empty(), None, self.clock.now());
        let headers = self.signer.headers(&signed)?;
        let req = PlatformRequest::new(HttpMethod::Get, format!("{}{}", self.base_url, url), headers, None);

        debug!("request_token: requesting access token from {}", self.base_url);
        let response = match self.transport.clone().oneshot(req).await {
            Ok(response) => response,
            Err(e) => {
                let e = into_transport_error(e);
                debug!("request_token: transport error: {}", e);
                return Err(e.into());
            }
        };

        if response.status() != StatusCode::OK {
            debug!("request_token: HTTP {}", response.status().as_u16());
            return Err(AuthError::Http(response.status().as_u16()));
        }

        let envelope: TokenEnvelope =
            serde_json::from_slice(response.body()).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        if !envelope.success {
            let e = PlatformError {
                code: envelope.code,
                msg: envelope.msg.unwrap_or_default(),
            };
            debug!("request_token: rejected: {}", e);
            return Err(AuthError::Platform(e));
        }

        let result = envelope.result.ok_or_else(|| AuthError::MalformedResponse("missing result".to_string()))?;
        let expires_at = Some(result.expire_time)
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| {
                debug!("request_token: expire_time {} out of range", result.expire_time);
                AuthError::MalformedResponse("expire_time out of range".to_string())
            })?;
        debug!("request_token: obtained access token expiring at {}", expires_at);

        Ok(CachedToken {
            access_token: result.access_token,
            expires_at,
        })
    }
}

impl<T> Debug for TokenManager<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TokenManager")
            .field("signer", &self.signer)
            .field("base_url", &self.base_url)
            .field("refresh_margin", &self.refresh_margin)
            .field("expires_at", &self.expires_at())
            .finish()
    }
}
