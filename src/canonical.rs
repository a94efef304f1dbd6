//! Canonicalization functionality for signature generation.
//!
//! This covers the two request-derived inputs to the string to sign: the SHA-256 of the exact
//! body bytes and the canonical URL (path plus sorted query string).

use {
    crate::{constants::SHA256_EMPTY, crypto::sha256_hex},
    bytes::Bytes,
    serde::Serialize,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// A serialized request body.
///
/// The bytes held here are the bytes hashed into the signature and the bytes sent on the wire;
/// a body is serialized exactly once.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct RequestBody {
    bytes: Bytes,
}

impl RequestBody {
    /// An empty body.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serialize `value` as compact JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            bytes: Bytes::from(serde_json::to_vec(value)?),
        })
    }

    /// Wrap already-serialized bytes.
    #[inline]
    pub fn from_bytes<B: Into<Bytes>>(bytes: B) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Whether the body has no content.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The body bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the body, returning its bytes.
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// The lowercase hex SHA-256 of the body.
    #[inline]
    pub fn content_hash(&self) -> String {
        content_hash(&self.bytes)
    }
}

impl Debug for RequestBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RequestBody").field("bytes", &String::from_utf8_lossy(&self.bytes)).finish()
    }
}

/// Return the lowercase hex SHA-256 of `body`.
///
/// An empty body yields the well-known hash of the empty string without hashing anything.
pub fn content_hash(body: &[u8]) -> String {
    if body.is_empty() {
        SHA256_EMPTY.to_string()
    } else {
        sha256_hex(body)
    }
}

/// Build the canonical URL for `path` and its query parameters.
///
/// Parameters are ordered by key, byte-wise; parameters sharing a key keep their input order.
/// Keys and values are joined verbatim: anything that needs percent-encoding must already be
/// encoded. With no parameters the path is returned unchanged.
pub fn canonical_url<K, V>(path: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return path.to_string();
    }

    let mut sorted: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let query = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<String>>().join("&");
    format!("{}?{}", path, query)
}
