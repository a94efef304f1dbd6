//! Request signature generation.
//!
//! Every call to the platform carries an HMAC-SHA256 signature computed over:
//!
//! ```text
//! client_id ‖ access_token? ‖ t ‖ nonce ‖ METHOD \n content-sha256 \n <signed headers> \n canonical-url
//! ```
//!
//! The access token is omitted (empty) on the token handshake and present on every business call.
//! This crate never signs custom headers, so the signed headers line is always empty.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.

use {
    crate::{
        canonical::RequestBody,
        config::{ClientSecret, Config},
        constants::*,
        crypto::hmac_sha256,
        HttpMethod, TransportError,
    },
    chrono::{DateTime, Utc},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    log::trace,
    qualifier_attr::qualifiers,
    std::fmt::{Debug, Formatter, Result as FmtResult},
    uuid::Uuid,
};

/// The result of signing one request.
///
/// Timestamp and nonce are fresh per call; a `SignedRequest` must never be reused. The access
/// token it was signed with travels with it and is left out of `Debug`.
#[derive(Clone, Eq, PartialEq)]
pub struct SignedRequest {
    method: HttpMethod,
    canonical_url: String,
    access_token: Option<String>,
    timestamp: String,
    nonce: String,
    content_sha256: String,
    string_to_sign: String,
    signature: String,
}

impl SignedRequest {
    /// Retrieve the method that was signed.
    #[inline]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Retrieve the canonical URL that was signed.
    #[inline]
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    /// Whether an access token was part of the signature.
    #[inline]
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Retrieve the millisecond timestamp, as sent in the `t` header.
    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Retrieve the nonce.
    #[inline]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Retrieve the SHA-256 of the body.
    #[inline]
    pub fn content_sha256(&self) -> &str {
        &self.content_sha256
    }

    /// Retrieve the string to sign.
    #[inline]
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// Retrieve the uppercase hex signature.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl Debug for SignedRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("canonical_url", &self.canonical_url)
            .field("has_access_token", &self.has_access_token())
            .field("timestamp", &self.timestamp)
            .field("nonce", &self.nonce)
            .field("content_sha256", &self.content_sha256)
            .field("signature", &self.signature)
            .finish()
    }
}

/// The ordered components of the HMAC input.
///
/// Kept as named fields so the exact byte sequence is auditable; [`HmacInput::concat`] joins them
/// with no separators.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
struct HmacInput<'a> {
    client_id: &'a str,
    access_token: Option<&'a str>,
    timestamp: &'a str,
    nonce: &'a str,
    string_to_sign: &'a str,
}

impl HmacInput<'_> {
    /// The components, in signing order. An absent access token contributes an empty string.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn components(&self) -> [&str; 5] {
        [self.client_id, self.access_token.unwrap_or(""), self.timestamp, self.nonce, self.string_to_sign]
    }

    /// The HMAC input string.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn concat(&self) -> String {
        self.components().concat()
    }
}

/// Build the string to sign: method, content hash, signed headers (always empty), and canonical
/// URL, joined by `\n`.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn string_to_sign(method: HttpMethod, content_sha256: &str, canonical_url: &str) -> String {
    [method.as_str(), content_sha256, "", canonical_url].join("\n")
}

/// Computes request signatures for one set of client credentials.
#[derive(Clone, Debug)]
pub struct Signer {
    client_id: String,
    client_secret: ClientSecret,
}

impl Signer {
    /// Create a signer for the given credentials.
    pub fn new<S: Into<String>>(client_id: S, client_secret: ClientSecret) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Create a signer from a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.client_id(), config.client_secret().clone())
    }

    /// Retrieve the client id.
    #[inline]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Sign a request at `now` with a freshly generated nonce.
    pub fn sign(
        &self,
        method: HttpMethod,
        canonical_url: &str,
        body: &RequestBody,
        access_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> SignedRequest {
        let timestamp = now.timestamp_millis().to_string();
        let nonce = Uuid::new_v4().to_string();
        self.sign_with(method, canonical_url, body, access_token, &timestamp, &nonce)
    }

    /// Sign a request with an explicit timestamp and nonce.
    ///
    /// The result is fully determined by the inputs and the credentials.
    pub fn sign_with(
        &self,
        method: HttpMethod,
        canonical_url: &str,
        body: &RequestBody,
        access_token: Option<&str>,
        timestamp: &str,
        nonce: &str,
    ) -> SignedRequest {
        let content_sha256 = body.content_hash();
        let string_to_sign = string_to_sign(method, &content_sha256, canonical_url);
        trace!("String to sign:\n{}", string_to_sign);

        let input = HmacInput {
            client_id: &self.client_id,
            access_token,
            timestamp,
            nonce,
            string_to_sign: &string_to_sign,
        };
        let signature = hex::encode_upper(hmac_sha256(self.client_secret.as_bytes(), input.concat().as_bytes()));

        SignedRequest {
            method,
            canonical_url: canonical_url.to_string(),
            access_token: access_token.map(str::to_string),
            timestamp: timestamp.to_string(),
            nonce: nonce.to_string(),
            content_sha256,
            string_to_sign,
            signature,
        }
    }

    /// Build the authentication headers for `signed`: `client_id`, `sign`, `t`, `nonce`,
    /// `sign_method`, and `access_token` when the request was signed with one.
    ///
    /// # Errors
    /// Fails if the client id or access token contains bytes not allowed in a header value.
    pub fn headers(&self, signed: &SignedRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HDR_CLIENT_ID, &self.client_id)?;
        if let Some(token) = signed.access_token.as_deref() {
            insert_header(&mut headers, HDR_ACCESS_TOKEN, token)?;
        }
        insert_header(&mut headers, HDR_SIGN, signed.signature())?;
        insert_header(&mut headers, HDR_T, signed.timestamp())?;
        insert_header(&mut headers, HDR_NONCE, signed.nonce())?;
        insert_header(&mut headers, HDR_SIGN_METHOD, SIGN_METHOD_HMAC_SHA256)?;
        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), TransportError> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| TransportError::other(format!("value for header '{}' is not a valid header value", name)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
