//! Common constants used throughout the crate.
//!
//! This was consolidated here so the signer, token manager, and invoker agree on header
//! names and endpoint paths. If a value is spelled incorrectly, at least it can be fixed in one
//! spot.
//!
//! Tests that are testing the content of a header or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Content-Type value for JSON request bodies.
pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Lifetime, in seconds, of the write that clears desired properties.
pub(crate) const CLEAR_DESIRED_DURATION_SECS: u64 = 1;

/// Status code reporting the battery level in percent.
pub(crate) const CODE_BATTERY_PERCENTAGE: &str = "battery_percentage";

/// Status codes reporting the charging state; devices use either spelling.
pub(crate) const CODE_CHARGE_STATE: &str = "charge_state";
pub(crate) const CODE_CHARGE_STATUS: &str = "charge_status";

/// Status code reporting the power switch.
pub(crate) const CODE_SWITCH: &str = "switch";

/// Default lifetime, in seconds, of desired properties written to the device shadow.
pub(crate) const DEFAULT_DESIRED_DURATION_SECS: u64 = 3600;

/// Default HTTP timeout in seconds.
pub(crate) const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default safety margin subtracted from the token expiry, in seconds.
pub(crate) const DEFAULT_REFRESH_MARGIN_SECS: i64 = 300;

/// Environment variable: optional base URL override.
pub(crate) const ENV_BASE_URL: &str = "TUYA_BASE_URL";

/// Environment variable: client (access) id.
pub(crate) const ENV_CLIENT_ID: &str = "TUYA_CLIENT_ID";

/// Environment variable: client secret.
pub(crate) const ENV_CLIENT_SECRET: &str = "TUYA_CLIENT_SECRET";

/// Environment variable: device id.
pub(crate) const ENV_DEVICE_ID: &str = "TUYA_DEVICE_ID";

/// Environment variable: HTTP timeout in seconds.
pub(crate) const ENV_HTTP_TIMEOUT_SECS: &str = "TUYA_HTTP_TIMEOUT_SECS";

/// Environment variable: data center region.
pub(crate) const ENV_REGION: &str = "TUYA_REGION";

/// Environment variable: token refresh margin in seconds.
pub(crate) const ENV_TOKEN_REFRESH_MARGIN_SECS: &str = "TUYA_TOKEN_REFRESH_MARGIN_SECS";

/// Error code: AuthError
pub(crate) const ERR_CODE_AUTH: &str = "AuthError";

/// Error code: ConfigError
pub(crate) const ERR_CODE_CONFIG: &str = "ConfigError";

/// Error code: ConnectionError
pub(crate) const ERR_CODE_CONNECTION: &str = "ConnectionError";

/// Error code: HttpStatus
pub(crate) const ERR_CODE_HTTP_STATUS: &str = "HttpStatus";

/// Error code: InvalidResponse
pub(crate) const ERR_CODE_INVALID_RESPONSE: &str = "InvalidResponse";

/// Error code: PlatformError
pub(crate) const ERR_CODE_PLATFORM: &str = "PlatformError";

/// Error code: Timeout
pub(crate) const ERR_CODE_TIMEOUT: &str = "Timeout";

/// Error code: TransportError
pub(crate) const ERR_CODE_TRANSPORT: &str = "TransportError";

/// Error code: UnsupportedMethod
pub(crate) const ERR_CODE_UNSUPPORTED_METHOD: &str = "UnsupportedMethod";

/// Header carrying the access token on business calls.
pub(crate) const HDR_ACCESS_TOKEN: &str = "access_token";

/// Header carrying the client id.
pub(crate) const HDR_CLIENT_ID: &str = "client_id";

/// Header carrying the request nonce.
pub(crate) const HDR_NONCE: &str = "nonce";

/// Header carrying the signature.
pub(crate) const HDR_SIGN: &str = "sign";

/// Header carrying the signature method.
pub(crate) const HDR_SIGN_METHOD: &str = "sign_method";

/// Header carrying the millisecond timestamp.
pub(crate) const HDR_T: &str = "t";

/// Upper bound of the arm position, in percent.
pub(crate) const MAX_ARM_PERCENT: i64 = 100;

/// Upper bound of the click hold time, in seconds.
pub(crate) const MAX_CLICK_SUSTAIN_SECS: i64 = 10;

/// Maximum number of characters of a non-200 response body echoed back to the caller.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Device mode that presses and then releases.
pub(crate) const MODE_CLICK: &str = "click";

/// Token endpoint path.
pub(crate) const PATH_TOKEN: &str = "/v1.0/token";

/// Query parameter selecting the simple-mode grant.
pub(crate) const QP_GRANT_TYPE: &str = "grant_type";

/// The simple-mode grant type value.
pub(crate) const QP_GRANT_TYPE_SIMPLE: &str = "1";

/// Shadow write type for desired properties.
pub(crate) const SHADOW_TYPE_DESIRED: u8 = 1;

/// SHA-256 of an empty string.
pub(crate) const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Signature method advertised in the `sign_method` header.
pub(crate) const SIGN_METHOD_HMAC_SHA256: &str = "HMAC-SHA256";
