//! The `fingerbot_cloud_client` crate drives a FingerBot push-button actuator through the Tuya cloud
//! OpenAPI.
//!
//! Every platform call is signed with HMAC-SHA256 over the client id, an access token, a
//! millisecond timestamp, a nonce, and a digest of the request itself. This crate handles that
//! signing, obtains and caches the access token, and turns every outcome (success, platform
//! rejection, HTTP error, or network failure) into a single [`NormalizedResult`] shape.
//!
//! # Workflow
//! 1. Load a [`Config`], usually from the environment with [`Config::from_env`].
//! 2. Create a [`FingerBot`] for the configured device.
//! 3. Apply [`DesiredProperties`] presets or call [`ApiInvoker::invoke`] directly for anything else.
//!
//! The network sits behind a [`tower::Service`]. [`ReqwestTransport`] is used by default; wrap an
//! async function with [`service_for_transport_fn`] to substitute your own.
//!
//! ## Example
//! ```rust
//! use fingerbot_cloud_client::{ClientSecret, HttpMethod, RequestBody, Signer};
//!
//! let signer = Signer::new("X", ClientSecret::new("Y"));
//! let body = RequestBody::json(&serde_json::json!({"switch": true})).unwrap();
//!
//! // `sign` picks the timestamp and nonce itself; they are pinned here for a reproducible result.
//! let signed = signer.sign_with(
//!     HttpMethod::Post,
//!     "/v1.0/devices/bfbd4ashj4z74h5n/status",
//!     &body,
//!     Some("T"),
//!     "1000",
//!     "N",
//! );
//! assert_eq!(signed.signature(), "1A04AC4718C47802BE464520FC2447BCA7DDADEDC363773FCD6B00AAAC9D3E4E");
//! ```
//!
//! Talking to a real device:
//! ```rust,no_run
//! use fingerbot_cloud_client::{Config, DesiredProperties, FingerBot};
//!
//! # tokio_test::block_on(async {
//! let config = Config::from_env().unwrap();
//! let bot = FingerBot::from_config(&config).unwrap();
//!
//! let result = bot.apply(&DesiredProperties::click()).await;
//! println!("{}", result.to_json());
//!
//! let raw = bot.invoker().invoke("/v1.0/devices/bfbd4ashj4z74h5n/status", "GET", None, &[]).await.unwrap();
//! assert!(raw.is_success());
//! # });
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

mod canonical;
mod clock;
mod config;
mod constants;
mod crypto;
mod device;
mod error;
mod invoker;
mod method;
mod region;
mod signer;
mod token;
mod transport;

pub use crate::{
    canonical::{canonical_url, content_hash, RequestBody},
    clock::{Clock, ManualClock, SystemClock},
    config::{ClientSecret, Config, ConfigBuilder},
    device::{
        BatteryHealth, BatteryInfo, ChargingState, DesiredProperties, FingerBot, InvalidSwitchState, SwitchState,
    },
    error::{
        AuthError, ConfigError, FingerbotError, PlatformError, TransportError, TransportErrorKind,
        UnsupportedMethodError,
    },
    invoker::{ApiInvoker, NormalizedResult},
    method::HttpMethod,
    region::Region,
    signer::{SignedRequest, Signer},
    token::TokenManager,
    transport::{service_for_transport_fn, PlatformRequest, PlatformResponse, ReqwestTransport},
};
