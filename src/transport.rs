//! The HTTP seam between the client and the cloud platform.
//!
//! Requests leave the crate as a [`PlatformRequest`] handed to a
//! [`tower::Service`]. [`ReqwestTransport`] is the production implementation; tests can wrap
//! an async function with [`service_for_transport_fn`] instead.

use {
    crate::{HttpMethod, TransportError},
    bytes::Bytes,
    http::{HeaderMap, StatusCode},
    log::trace,
    std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
        time::Duration as StdDuration,
    },
    tower::{service_fn, util::ServiceFn, BoxError, Service},
};

/// A fully signed request, ready to be sent.
#[derive(Clone, Debug)]
pub struct PlatformRequest {
    method: HttpMethod,
    url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl PlatformRequest {
    /// Create a new request.
    pub fn new(method: HttpMethod, url: String, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Retrieve the method.
    #[inline]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Retrieve the absolute URL, including the query string.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieve the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Retrieve the body, if any.
    #[inline]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// The status and raw body returned by the platform.
#[derive(Clone, Debug)]
pub struct PlatformResponse {
    status: StatusCode,
    body: Bytes,
}

impl PlatformResponse {
    /// Create a new response.
    pub fn new<B: Into<Bytes>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Retrieve the HTTP status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Retrieve the response body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Sends [`PlatformRequest`]s over HTTPS with [`reqwest`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests fail after `timeout`.
    pub fn new(timeout: StdDuration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
        })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
        }
    }
}

impl Service<PlatformRequest> for ReqwestTransport {
    type Response = PlatformResponse;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<PlatformResponse, BoxError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: PlatformRequest) -> Self::Future {
        let client = self.client.clone();

        Box::pin(async move {
            trace!("ReqwestTransport: {} {}", req.method, req.url);
            let mut builder = client.request(req.method.to_http(), &req.url).headers(req.headers);
            if let Some(body) = req.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(TransportError::from)?;
            let status = response.status();
            let body = response.bytes().await.map_err(TransportError::from)?;
            trace!("ReqwestTransport: HTTP {} ({} bytes)", status.as_u16(), body.len());
            Ok(PlatformResponse::new(status, body))
        })
    }
}

/// Create a Service that wraps a function that sends a [`PlatformRequest`].
pub fn service_for_transport_fn<F, Fut>(f: F) -> ServiceFn<F>
where
    F: FnMut(PlatformRequest) -> Fut + Send + 'static,
    Fut: Future<Output = Result<PlatformResponse, BoxError>> + Send + 'static,
{
    service_fn(f)
}

/// Recover a [`TransportError`] from whatever a transport service returned.
pub(crate) fn into_transport_error(e: BoxError) -> TransportError {
    match e.downcast::<TransportError>() {
        Ok(e) => *e,
        Err(e) => match e.downcast::<reqwest::Error>() {
            Ok(e) => TransportError::from(*e),
            Err(e) => TransportError::other(e.to_string()),
        },
    }
}
