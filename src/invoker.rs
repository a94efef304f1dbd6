//! Signed API invocation and result normalization.

use {
    crate::{
        canonical::{canonical_url, RequestBody},
        constants::*,
        token::TokenManager,
        transport::{into_transport_error, PlatformRequest, PlatformResponse},
        FingerbotError, HttpMethod, PlatformError, TransportError, UnsupportedMethodError,
    },
    http::{
        header::{HeaderValue, CONTENT_TYPE},
        StatusCode,
    },
    log::{debug, trace},
    serde::{Serialize, Serializer},
    serde_json::{Map, Value},
    std::{error::Error, str::FromStr},
    tower::{BoxError, Service, ServiceExt},
};

/// The outcome of one API call.
///
/// Every call yields one of these; failures never escape as errors. An HTTP 200 carries the
/// platform's JSON unchanged, including logical failures (`"success": false`) reported inside it.
#[derive(Clone, Debug, PartialEq)]
pub enum NormalizedResult {
    /// The platform answered with HTTP 200 and a JSON body.
    Response(Value),

    /// The call failed before a usable response was obtained.
    Failure {
        /// What went wrong.
        error: FingerbotError,

        /// The leading part of the response body, for HTTP failures.
        response: Option<String>,
    },
}

impl NormalizedResult {
    /// A failure with no response body.
    pub fn failure<E: Into<FingerbotError>>(error: E) -> Self {
        Self::Failure {
            error: error.into(),
            response: None,
        }
    }

    /// Whether the platform reported `"success": true`.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Response(value) => value.get("success").and_then(Value::as_bool).unwrap_or(false),
            Self::Failure {
                ..
            } => false,
        }
    }

    /// The logical failure reported inside an HTTP 200 envelope, if any.
    pub fn platform_error(&self) -> Option<PlatformError> {
        match self {
            Self::Response(value) if !self.is_success() => Some(PlatformError {
                code: value.get("code").and_then(Value::as_i64),
                msg: value.get("msg").and_then(Value::as_str).unwrap_or_default().to_string(),
            }),
            _ => None,
        }
    }

    /// Render as JSON: the platform's body for a response, otherwise
    /// `{"success": false, "error": ..., "response"?: ..., "detail"?: ...}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Response(value) => value.clone(),
            Self::Failure {
                error,
                response,
            } => {
                let mut map = Map::new();
                map.insert("success".to_string(), Value::Bool(false));
                map.insert("error".to_string(), Value::String(error.to_string()));
                if let Some(response) = response {
                    map.insert("response".to_string(), Value::String(response.clone()));
                }
                if let Some(source) = error.source() {
                    map.insert("detail".to_string(), Value::String(source.to_string()));
                }
                Value::Object(map)
            }
        }
    }

    /// Convert into the envelope's `result` member, or the error that prevented it.
    ///
    /// A response without a `result` member yields `null`.
    pub fn into_result(self) -> Result<Value, FingerbotError> {
        if let Some(e) = self.platform_error() {
            return Err(e.into());
        }

        match self {
            Self::Response(mut value) => Ok(value.get_mut("result").map(Value::take).unwrap_or(Value::Null)),
            Self::Failure {
                error,
                ..
            } => Err(error),
        }
    }
}

impl Serialize for NormalizedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Issues signed calls against the platform and normalizes their outcome.
#[derive(Debug)]
pub struct ApiInvoker<T> {
    tokens: TokenManager<T>,
}

impl<T> ApiInvoker<T> {
    /// Create an invoker that authenticates through `tokens`.
    pub fn new(tokens: TokenManager<T>) -> Self {
        Self {
            tokens,
        }
    }

    /// Retrieve the token manager.
    #[inline]
    pub fn token_manager(&self) -> &TokenManager<T> {
        &self.tokens
    }
}

impl<T> ApiInvoker<T>
where
    T: Service<PlatformRequest, Response = PlatformResponse, Error = BoxError> + Clone + Send,
    T::Future: Send,
{
    /// Call `path` with the named HTTP method.
    ///
    /// `body`, when present and not `null`, is sent as compact JSON. `params` become the query
    /// string in canonical order.
    ///
    /// # Errors
    /// Returns [`UnsupportedMethodError`] if `method` is not GET, POST, PUT, or DELETE. Nothing is
    /// sent in that case. All other failures are reported inside the [`NormalizedResult`].
    pub async fn invoke(
        &self,
        path: &str,
        method: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
    ) -> Result<NormalizedResult, UnsupportedMethodError> {
        let method = HttpMethod::from_str(method).map_err(|e| {
            debug!("invoke: {}", e);
            e
        })?;

        let body = match body.filter(|b| !b.is_null()).map(RequestBody::json).transpose() {
            Ok(body) => body.unwrap_or_default(),
            Err(e) => return Ok(NormalizedResult::failure(TransportError::other(format!("cannot encode body: {}", e)))),
        };

        Ok(self.send(method, path, body, params).await)
    }

    /// Call `path` with an already-serialized body. An empty body is not sent.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
        params: &[(&str, &str)],
    ) -> NormalizedResult {
        let token = match self.tokens.get_token().await {
            Ok(token) => token,
            Err(e) => {
                debug!("send: {} {}: no access token: {}", method, path, e);
                return NormalizedResult::failure(e);
            }
        };

        let url = canonical_url(path, params);
        let signer = self.tokens.signer();
        let signed = signer.sign(method, &url, &body, Some(&token), self.tokens.clock().now());
        let mut headers = match signer.headers(&signed) {
            Ok(headers) => headers,
            Err(e) => return NormalizedResult::failure(e),
        };

        let body = if body.is_empty() {
            None
        } else {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            Some(body.into_bytes())
        };

        debug!("send: {} {}", method, url);
        let req = PlatformRequest::new(method, format!("{}{}", self.tokens.base_url(), url), headers, body);
        let response = match self.tokens.transport().clone().oneshot(req).await {
            Ok(response) => response,
            Err(e) => {
                let e = into_transport_error(e);
                debug!("send: {} {}: {}", method, url, e);
                return NormalizedResult::failure(e);
            }
        };

        normalize(response)
    }
}

fn normalize(response: PlatformResponse) -> NormalizedResult {
    let status = response.status();
    if status != StatusCode::OK {
        debug!("normalize: HTTP {}", status.as_u16());
        return NormalizedResult::Failure {
            error: FingerbotError::Http(status.as_u16()),
            response: Some(leading_text(response.body())),
        };
    }

    match serde_json::from_slice::<Value>(response.body()) {
        Ok(value) => {
            trace!("normalize: {}", value);
            NormalizedResult::Response(value)
        }
        Err(e) => {
            debug!("normalize: HTTP 200 with a non-JSON body: {}", e);
            NormalizedResult::Failure {
                error: FingerbotError::InvalidResponse(e.to_string()),
                response: Some(leading_text(response.body())),
            }
        }
    }
}

/// The first characters of a response body, for diagnostics.
fn leading_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY_CHARS).collect()
}
