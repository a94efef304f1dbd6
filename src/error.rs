use {
    crate::constants::*,
    std::{
        error::Error as StdError,
        fmt::{Display, Formatter, Result as FmtResult},
    },
    thiserror::Error,
};

/// Broad category of a transport failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportErrorKind {
    /// The request did not complete within the configured timeout.
    Timeout,

    /// The connection could not be established (refused, DNS, TLS handshake).
    Connect,

    /// Any other network or protocol failure.
    Other,
}

/// A network-level failure talking to the cloud platform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    /// Create a new transport error of the given kind.
    pub fn new<S: Into<String>>(kind: TransportErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a timeout failure.
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Shorthand for a connection failure.
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    /// Shorthand for an uncategorized failure.
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }

    /// The category of this failure.
    #[inline]
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The underlying error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            TransportErrorKind::Timeout => f.write_str("timeout"),
            TransportErrorKind::Connect => f.write_str("connection error"),
            TransportErrorKind::Other => write!(f, "request error: {}", self.message),
        }
    }
}

impl StdError for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest reports a connect timeout as both; the timeout is the more useful category.
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, e.to_string())
    }
}

/// A logical failure reported by the platform inside an HTTP 200 envelope.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("platform error {}: {}", .code.map_or_else(|| "?".to_string(), |c| c.to_string()), .msg)]
pub struct PlatformError {
    /// The platform's numeric error code, if supplied.
    pub code: Option<i64>,

    /// The platform's error message.
    pub msg: String,
}

/// The token handshake failed.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum AuthError {
    /// The platform rejected the handshake.
    #[error("token request rejected: {0}")]
    Platform(PlatformError),

    /// The token endpoint returned a non-200 status.
    #[error("token request failed with HTTP {0}")]
    Http(u16),

    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Transport(#[from] TransportError),

    /// The token endpoint returned something that is not a token envelope.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

/// The requested HTTP method is outside the supported set.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unsupported method: {0}")]
pub struct UnsupportedMethodError(pub String);

/// Configuration could not be loaded. This is fatal at startup.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// One or more required settings are absent.
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// The region code is not one of the known data centers.
    #[error("unknown region '{0}'; expected one of eu, us, cn")]
    InvalidRegion(String),

    /// A setting could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue {
        /// The setting name.
        name: String,

        /// The offending value.
        value: String,
    },
}

/// Error returned by the client's operations.
///
/// The [`Display`] form of each variant is the short message placed in the `error` field of a
/// normalized failure.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum FingerbotError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No access token could be obtained.
    #[error("no access token")]
    Auth(#[source] AuthError),

    /// The API call failed at the network level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API call returned a non-200 status.
    #[error("HTTP {0}")]
    Http(u16),

    /// The platform reported a logical failure.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The platform returned a body that is not JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP method is not supported.
    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethodError),
}

impl FingerbotError {
    /// A stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => ERR_CODE_CONFIG,
            Self::Auth(_) => ERR_CODE_AUTH,
            Self::Transport(e) => match e.kind() {
                TransportErrorKind::Timeout => ERR_CODE_TIMEOUT,
                TransportErrorKind::Connect => ERR_CODE_CONNECTION,
                TransportErrorKind::Other => ERR_CODE_TRANSPORT,
            },
            Self::Http(_) => ERR_CODE_HTTP_STATUS,
            Self::Platform(_) => ERR_CODE_PLATFORM,
            Self::InvalidResponse(_) => ERR_CODE_INVALID_RESPONSE,
            Self::UnsupportedMethod(_) => ERR_CODE_UNSUPPORTED_METHOD,
        }
    }
}

impl From<AuthError> for FingerbotError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}
