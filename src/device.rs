//! FingerBot operations built on the signed API invoker.
//!
//! The FingerBot is driven by writing *desired properties* to its cloud shadow; the device picks
//! them up the next time it wakes. [`DesiredProperties`] carries the property set and its preset
//! constructors, and [`FingerBot`] issues the calls.

use {
    crate::{
        canonical::RequestBody,
        clock::{Clock, SystemClock},
        constants::*,
        invoker::{ApiInvoker, NormalizedResult},
        token::TokenManager,
        transport::{PlatformRequest, PlatformResponse, ReqwestTransport},
        AuthError, Config, FingerbotError, HttpMethod, TransportError,
    },
    chrono::{DateTime, Utc},
    log::debug,
    serde::Serialize,
    serde_json::Value,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
        sync::Arc,
    },
    thiserror::Error,
    tower::{BoxError, Service},
};

/// A set of desired properties for the device shadow. Unset properties are left as they are.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DesiredProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    arm_down_percent: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    arm_up_percent: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    click_sustain_time: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    switch: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

impl DesiredProperties {
    fn arm(down: u8, up: u8) -> Self {
        Self {
            arm_down_percent: Some(down),
            arm_up_percent: Some(up),
            switch: Some(true),
            ..Default::default()
        }
    }

    fn click_with(hold: Option<u8>) -> Self {
        Self {
            click_sustain_time: hold,
            mode: Some(MODE_CLICK.to_string()),
            ..Self::arm(100, 100)
        }
    }

    /// Lower the arm fully and keep it down.
    pub fn press() -> Self {
        Self::arm(100, 0)
    }

    /// Raise the arm fully.
    pub fn release() -> Self {
        Self::arm(0, 100)
    }

    /// Press and release.
    pub fn click() -> Self {
        Self::click_with(None)
    }

    /// Press and release, holding for one second.
    pub fn quick_click() -> Self {
        Self::click_with(Some(1))
    }

    /// Press and release, holding for the maximum ten seconds.
    pub fn long_press() -> Self {
        Self::click_with(Some(MAX_CLICK_SUSTAIN_SECS as u8))
    }

    /// Move the arm to the half-way position.
    pub fn half_press() -> Self {
        Self::arm(50, 50)
    }

    /// Click with explicit arm positions and hold time.
    ///
    /// Positions are clamped to `0..=100` percent and the hold time to `0..=10` seconds.
    pub fn custom_position(down_percent: i64, up_percent: i64, hold_secs: i64) -> Self {
        Self {
            arm_down_percent: Some(clamp(down_percent, MAX_ARM_PERCENT)),
            arm_up_percent: Some(clamp(up_percent, MAX_ARM_PERCENT)),
            click_sustain_time: Some(clamp(hold_secs, MAX_CLICK_SUSTAIN_SECS)),
            switch: Some(true),
            mode: Some(MODE_CLICK.to_string()),
        }
    }

    /// Set how long a click holds the arm down, clamped to `0..=10` seconds.
    pub fn hold_time(secs: i64) -> Self {
        Self {
            click_sustain_time: Some(clamp(secs, MAX_CLICK_SUSTAIN_SECS)),
            switch: Some(true),
            ..Default::default()
        }
    }

    /// Turn the device on or off.
    pub fn switch(on: bool) -> Self {
        Self {
            switch: Some(on),
            ..Default::default()
        }
    }

    /// No properties at all. Writing this clears anything pending.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Retrieve the arm-down position, in percent.
    #[inline]
    pub fn arm_down_percent(&self) -> Option<u8> {
        self.arm_down_percent
    }

    /// Retrieve the arm-up position, in percent.
    #[inline]
    pub fn arm_up_percent(&self) -> Option<u8> {
        self.arm_up_percent
    }

    /// Retrieve the click hold time, in seconds.
    #[inline]
    pub fn click_sustain_time(&self) -> Option<u8> {
        self.click_sustain_time
    }

    /// Retrieve the switch state.
    #[inline]
    pub fn switch_state(&self) -> Option<bool> {
        self.switch
    }

    /// Retrieve the mode.
    #[inline]
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }
}

fn clamp(value: i64, max: i64) -> u8 {
    // max is at most 100, so the cast cannot truncate.
    value.clamp(0, max) as u8
}

/// The body of a desired-properties write. `properties` is itself a JSON document encoded as a
/// string.
#[derive(Serialize)]
struct DesiredShadowWrite<'a> {
    properties: &'a str,
    duration: u64,
    #[serde(rename = "type")]
    kind: u8,
}

/// The requested switch state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchState {
    /// Turn on.
    On,

    /// Turn off.
    Off,

    /// Invert the current state.
    Toggle,
}

/// The switch state string was not `on`, `off`, or `toggle`.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid switch state '{0}'; expected on, off, or toggle")]
pub struct InvalidSwitchState(pub String);

impl FromStr for SwitchState {
    type Err = InvalidSwitchState;

    fn from_str(s: &str) -> Result<Self, InvalidSwitchState> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            _ => Err(InvalidSwitchState(s.to_string())),
        }
    }
}

/// Battery health bucket derived from the charge percentage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatteryHealth {
    /// 80% or more.
    Excellent,

    /// 50% to 79%.
    Good,

    /// 20% to 49%.
    Fair,

    /// Below 20%.
    Low,
}

impl BatteryHealth {
    /// Classify a charge percentage.
    pub fn from_percentage(percentage: i64) -> Self {
        match percentage {
            p if p >= 80 => Self::Excellent,
            p if p >= 50 => Self::Good,
            p if p >= 20 => Self::Fair,
            _ => Self::Low,
        }
    }
}

impl Display for BatteryHealth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Low => "low",
        })
    }
}

/// The charging state reported by the device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChargingState {
    /// Charging.
    Charging,

    /// Not charging.
    NotCharging,

    /// Fully charged.
    Done,

    /// A value this crate does not recognize, kept as reported.
    Other(String),
}

impl ChargingState {
    fn from_value(value: &Value) -> Self {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        match raw.as_str() {
            "charging" | "1" => Self::Charging,
            "not_charging" | "0" => Self::NotCharging,
            "charge_done" => Self::Done,
            _ => Self::Other(raw),
        }
    }
}

/// Battery information extracted from a device status report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatteryInfo {
    percentage: Option<i64>,
    charging: Option<ChargingState>,
}

impl BatteryInfo {
    /// Extract battery information from the `result` array of a status report.
    pub fn from_status(status: &[Value]) -> Self {
        let percentage = status_value(status, CODE_BATTERY_PERCENTAGE).and_then(Value::as_i64);
        let charging = status_value(status, CODE_CHARGE_STATE)
            .or_else(|| status_value(status, CODE_CHARGE_STATUS))
            .map(ChargingState::from_value);

        Self {
            percentage,
            charging,
        }
    }

    /// Retrieve the charge level in percent, if the device reported one.
    #[inline]
    pub fn percentage(&self) -> Option<i64> {
        self.percentage
    }

    /// The health bucket for the charge level.
    pub fn health(&self) -> Option<BatteryHealth> {
        self.percentage.map(BatteryHealth::from_percentage)
    }

    /// Retrieve the charging state, if the device reported one.
    #[inline]
    pub fn charging(&self) -> Option<&ChargingState> {
        self.charging.as_ref()
    }

    /// Whether the device reports that it is charging.
    pub fn is_charging(&self) -> bool {
        self.charging == Some(ChargingState::Charging)
    }
}

fn status_value<'a>(status: &'a [Value], code: &str) -> Option<&'a Value> {
    status.iter().find(|s| s.get("code").and_then(Value::as_str) == Some(code)).and_then(|s| s.get("value"))
}

/// A FingerBot reachable through the cloud platform.
#[derive(Debug)]
pub struct FingerBot<T = ReqwestTransport> {
    invoker: ApiInvoker<T>,
    device_id: String,
}

impl FingerBot<ReqwestTransport> {
    /// Create a client for the device named in `config`, talking HTTPS with the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self, FingerbotError> {
        let transport = ReqwestTransport::new(config.http_timeout())?;
        Ok(Self::with_transport(config, transport, Arc::new(SystemClock)))
    }
}

impl<T> FingerBot<T> {
    /// Create a client for the device named in `config` using the given transport and clock.
    pub fn with_transport(config: &Config, transport: T, clock: Arc<dyn Clock>) -> Self {
        Self::new(ApiInvoker::new(TokenManager::from_config(config, transport, clock)), config.device_id())
    }

    /// Create a client for `device_id` using an existing invoker.
    pub fn new<S: Into<String>>(invoker: ApiInvoker<T>, device_id: S) -> Self {
        Self {
            invoker,
            device_id: device_id.into(),
        }
    }

    /// Retrieve the device id.
    #[inline]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Retrieve the invoker, for calls this type does not wrap.
    #[inline]
    pub fn invoker(&self) -> &ApiInvoker<T> {
        &self.invoker
    }

    fn device_path(&self, suffix: &str) -> String {
        format!("/v1.0/devices/{}{}", self.device_id, suffix)
    }

    fn desired_path(&self) -> String {
        format!("/v2.0/cloud/thing/{}/shadow/properties/desired", self.device_id)
    }
}

impl<T> FingerBot<T>
where
    T: Service<PlatformRequest, Response = PlatformResponse, Error = BoxError> + Clone + Send,
    T::Future: Send,
{
    /// Fetch the device record.
    pub async fn device_info(&self) -> NormalizedResult {
        self.get(&self.device_path("")).await
    }

    /// Fetch the current data points.
    pub async fn status(&self) -> NormalizedResult {
        self.get(&self.device_path("/status")).await
    }

    /// Fetch the instruction set the device supports.
    pub async fn functions(&self) -> NormalizedResult {
        self.get(&self.device_path("/functions")).await
    }

    /// Fetch the desired properties still pending on the shadow.
    pub async fn desired_properties(&self) -> NormalizedResult {
        self.get(&self.desired_path()).await
    }

    /// Write desired properties that stay pending for `duration_secs`.
    pub async fn set_desired_properties(&self, properties: &DesiredProperties, duration_secs: u64) -> NormalizedResult {
        let properties = match serde_json::to_string(properties) {
            Ok(properties) => properties,
            Err(e) => return NormalizedResult::failure(TransportError::other(format!("cannot encode body: {}", e))),
        };

        let write = DesiredShadowWrite {
            properties: &properties,
            duration: duration_secs,
            kind: SHADOW_TYPE_DESIRED,
        };
        let body = match RequestBody::json(&write) {
            Ok(body) => body,
            Err(e) => return NormalizedResult::failure(TransportError::other(format!("cannot encode body: {}", e))),
        };

        debug!("set_desired_properties: {} for {}s", properties, duration_secs);
        self.invoker.send(HttpMethod::Post, &self.desired_path(), body, &[]).await
    }

    /// Write desired properties with the default one-hour lifetime.
    pub async fn apply(&self, properties: &DesiredProperties) -> NormalizedResult {
        self.set_desired_properties(properties, DEFAULT_DESIRED_DURATION_SECS).await
    }

    /// Replace any pending desired properties with an empty set that expires almost immediately.
    pub async fn clear_desired_properties(&self) -> NormalizedResult {
        self.set_desired_properties(&DesiredProperties::empty(), CLEAR_DESIRED_DURATION_SECS).await
    }

    /// Turn the device on or off, or invert its current state.
    ///
    /// Toggling reads the current state first. If the state cannot be read, the device is assumed
    /// to be on.
    pub async fn set_switch(&self, state: SwitchState) -> NormalizedResult {
        let on = match state {
            SwitchState::On => true,
            SwitchState::Off => false,
            SwitchState::Toggle => !self.current_switch().await,
        };

        self.apply(&DesiredProperties::switch(on)).await
    }

    async fn current_switch(&self) -> bool {
        match self.status().await.into_result() {
            Ok(Value::Array(status)) => status_value(&status, CODE_SWITCH).and_then(Value::as_bool).unwrap_or(true),
            Ok(_) => true,
            Err(e) => {
                debug!("current_switch: status unavailable, assuming on: {}", e);
                true
            }
        }
    }

    /// Read the battery level and charging state.
    pub async fn battery(&self) -> Result<BatteryInfo, FingerbotError> {
        match self.status().await.into_result()? {
            Value::Array(status) => Ok(BatteryInfo::from_status(&status)),
            other => Err(FingerbotError::InvalidResponse(format!("status result is not an array: {}", other))),
        }
    }

    /// Check that credentials are accepted by obtaining an access token.
    ///
    /// Returns the token's expiry; the token itself is not exposed.
    pub async fn test_connection(&self) -> Result<DateTime<Utc>, FingerbotError> {
        let tokens = self.invoker.token_manager();
        tokens.get_token().await?;
        tokens.expires_at().ok_or_else(|| AuthError::MalformedResponse("token was not retained".to_string()).into())
    }

    async fn get(&self, path: &str) -> NormalizedResult {
        self.invoker.send(HttpMethod::Get, path, RequestBody::empty(), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{BatteryHealth, BatteryInfo, ChargingState, DesiredProperties, FingerBot, SwitchState},
        crate::{
            clock::ManualClock,
            crypto::sha256_hex,
            transport::{PlatformRequest, PlatformResponse},
            Config, FingerbotError, HttpMethod,
        },
        http::StatusCode,
        parking_lot::Mutex,
        serde_json::{json, Value},
        std::{
            future::{ready, Ready},
            str::FromStr,
            sync::Arc,
            task::{Context, Poll},
        },
        tower::{BoxError, Service},
    };

    const TOKEN_OK: &str = r#"{"success":true,"result":{"access_token":"tok","expire_time":7200}}"#;

    #[derive(Clone, Debug)]
    struct Recorded {
        method: HttpMethod,
        url: String,
        body: Option<String>,
    }

    /// Issues tokens and answers every other call with `reply`, recording what was sent.
    #[derive(Clone)]
    struct RecordingTransport {
        reply: &'static str,
        log: Arc<Mutex<Vec<Recorded>>>,
    }

    impl Service<PlatformRequest> for RecordingTransport {
        type Response = PlatformResponse;
        type Error = BoxError;
        type Future = Ready<Result<PlatformResponse, BoxError>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), BoxError>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: PlatformRequest) -> Self::Future {
            if req.url().ends_with("/v1.0/token?grant_type=1") {
                return ready(Ok(PlatformResponse::new(StatusCode::OK, TOKEN_OK)));
            }

            assert_eq!(req.headers()["access_token"], "tok");
            self.log.lock().push(Recorded {
                method: req.method(),
                url: req.url().to_string(),
                body: req.body().map(|b| String::from_utf8_lossy(b).to_string()),
            });
            ready(Ok(PlatformResponse::new(StatusCode::OK, self.reply)))
        }
    }

    fn fingerbot(reply: &'static str) -> (FingerBot<RecordingTransport>, Arc<Mutex<Vec<Recorded>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport {
            reply,
            log: log.clone(),
        };

        let config = Config::builder()
            .client_id("X")
            .client_secret("Y")
            .device_id("bfbd4ashj4z74h5n")
            .base_url("https://openapi.test")
            .build()
            .unwrap();
        (FingerBot::with_transport(&config, transport, Arc::new(ManualClock::at_epoch_seconds(1000))), log)
    }

    #[test_log::test]
    fn test_presets() {
        let props = serde_json::to_value(DesiredProperties::press()).unwrap();
        assert_eq!(props, json!({"arm_down_percent": 100, "arm_up_percent": 0, "switch": true}));

        let props = serde_json::to_value(DesiredProperties::release()).unwrap();
        assert_eq!(props, json!({"arm_down_percent": 0, "arm_up_percent": 100, "switch": true}));

        let props = serde_json::to_value(DesiredProperties::click()).unwrap();
        assert_eq!(props, json!({"arm_down_percent": 100, "arm_up_percent": 100, "switch": true, "mode": "click"}));

        assert_eq!(DesiredProperties::quick_click().click_sustain_time(), Some(1));
        assert_eq!(DesiredProperties::long_press().click_sustain_time(), Some(10));
        assert_eq!(DesiredProperties::long_press().mode(), Some("click"));

        let half = DesiredProperties::half_press();
        assert_eq!((half.arm_down_percent(), half.arm_up_percent(), half.mode()), (Some(50), Some(50), None));

        assert_eq!(serde_json::to_string(&DesiredProperties::empty()).unwrap(), "{}");
    }

    #[test_log::test]
    fn test_property_order_is_stable() {
        let props = serde_json::to_string(&DesiredProperties::custom_position(75, 25, 5)).unwrap();
        assert_eq!(
            props,
            r#"{"arm_down_percent":75,"arm_up_percent":25,"click_sustain_time":5,"switch":true,"mode":"click"}"#
        );
    }

    #[test_log::test]
    fn test_clamping() {
        let props = DesiredProperties::custom_position(150, -5, 42);
        assert_eq!(props.arm_down_percent(), Some(100));
        assert_eq!(props.arm_up_percent(), Some(0));
        assert_eq!(props.click_sustain_time(), Some(10));

        assert_eq!(DesiredProperties::hold_time(-1).click_sustain_time(), Some(0));
        assert_eq!(DesiredProperties::hold_time(3).click_sustain_time(), Some(3));
        assert_eq!(DesiredProperties::hold_time(11).switch_state(), Some(true));
    }

    #[test_log::test]
    fn test_switch_state_parse() {
        assert_eq!(SwitchState::from_str("on"), Ok(SwitchState::On));
        assert_eq!(SwitchState::from_str("OFF"), Ok(SwitchState::Off));
        assert_eq!(SwitchState::from_str(" Toggle "), Ok(SwitchState::Toggle));
        assert_eq!(
            SwitchState::from_str("flip").unwrap_err().to_string(),
            "invalid switch state 'flip'; expected on, off, or toggle"
        );
    }

    #[test_log::test]
    fn test_battery_info() {
        let status = json!([
            {"code": "switch", "value": true},
            {"code": "battery_percentage", "value": 64},
            {"code": "charge_state", "value": "charging"},
        ]);
        let info = BatteryInfo::from_status(status.as_array().unwrap());
        assert_eq!(info.percentage(), Some(64));
        assert_eq!(info.health(), Some(BatteryHealth::Good));
        assert!(info.is_charging());

        let status = json!([{"code": "charge_status", "value": 0}]);
        let info = BatteryInfo::from_status(status.as_array().unwrap());
        assert_eq!(info.percentage(), None);
        assert_eq!(info.health(), None);
        assert_eq!(info.charging(), Some(&ChargingState::NotCharging));

        let status = json!([{"code": "charge_state", "value": "trickle"}]);
        let info = BatteryInfo::from_status(status.as_array().unwrap());
        assert_eq!(info.charging(), Some(&ChargingState::Other("trickle".to_string())));
        assert!(!info.is_charging());
    }

    #[test_log::test]
    fn test_battery_health_buckets() {
        assert_eq!(BatteryHealth::from_percentage(100), BatteryHealth::Excellent);
        assert_eq!(BatteryHealth::from_percentage(80), BatteryHealth::Excellent);
        assert_eq!(BatteryHealth::from_percentage(79), BatteryHealth::Good);
        assert_eq!(BatteryHealth::from_percentage(50), BatteryHealth::Good);
        assert_eq!(BatteryHealth::from_percentage(20), BatteryHealth::Fair);
        assert_eq!(BatteryHealth::from_percentage(19), BatteryHealth::Low);
        assert_eq!(BatteryHealth::Fair.to_string(), "fair");
    }

    #[test_log::test(tokio::test)]
    async fn test_set_desired_properties_body() {
        let (bot, log) = fingerbot(r#"{"success":true,"result":true}"#);
        let result = bot.apply(&DesiredProperties::switch(true)).await;
        assert!(result.is_success());

        let calls = log.lock().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].url, "https://openapi.test/v2.0/cloud/thing/bfbd4ashj4z74h5n/shadow/properties/desired");

        let body = calls[0].body.clone().unwrap();
        assert_eq!(body, r#"{"properties":"{\"switch\":true}","duration":3600,"type":1}"#);
        assert_eq!(sha256_hex(body.as_bytes()), "0fd53baee2d5fe324bbf6666f573745b8505bfb99d8b7e67fa459ce2ec4e2a2b");

        let decoded: Value = serde_json::from_str(&body).unwrap();
        let inner: Value = serde_json::from_str(decoded["properties"].as_str().unwrap()).unwrap();
        assert_eq!(inner, json!({"switch": true}));
    }

    #[test_log::test(tokio::test)]
    async fn test_clear_desired_properties() {
        let (bot, log) = fingerbot(r#"{"success":true,"result":true}"#);
        bot.clear_desired_properties().await;
        assert_eq!(log.lock()[0].body.as_deref(), Some(r#"{"properties":"{}","duration":1,"type":1}"#));
    }

    #[test_log::test(tokio::test)]
    async fn test_read_endpoints() {
        let (bot, log) = fingerbot(r#"{"success":true,"result":{}}"#);
        bot.device_info().await;
        bot.status().await;
        bot.functions().await;
        bot.desired_properties().await;

        let urls: Vec<String> = log.lock().iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                "https://openapi.test/v1.0/devices/bfbd4ashj4z74h5n",
                "https://openapi.test/v1.0/devices/bfbd4ashj4z74h5n/status",
                "https://openapi.test/v1.0/devices/bfbd4ashj4z74h5n/functions",
                "https://openapi.test/v2.0/cloud/thing/bfbd4ashj4z74h5n/shadow/properties/desired",
            ]
        );
        assert!(log.lock().iter().all(|r| r.method == HttpMethod::Get && r.body.is_none()));
    }

    #[test_log::test(tokio::test)]
    async fn test_toggle_inverts_current_state() {
        let (bot, log) = fingerbot(r#"{"success":true,"result":[{"code":"switch","value":true}]}"#);
        bot.set_switch(SwitchState::Toggle).await;

        let calls = log.lock().clone();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].url.ends_with("/status"));
        assert_eq!(calls[1].body.as_deref(), Some(r#"{"properties":"{\"switch\":false}","duration":3600,"type":1}"#));
    }

    #[test_log::test(tokio::test)]
    async fn test_toggle_defaults_to_on_when_unknown() {
        let (bot, log) = fingerbot(r#"{"success":false,"code":2001,"msg":"device is offline"}"#);
        bot.set_switch(SwitchState::Toggle).await;
        assert_eq!(
            log.lock()[1].body.as_deref(),
            Some(r#"{"properties":"{\"switch\":false}","duration":3600,"type":1}"#)
        );

        let (bot, log) = fingerbot(r#"{"success":true,"result":true}"#);
        bot.set_switch(SwitchState::On).await;
        assert_eq!(log.lock().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_battery_and_connection() {
        let (bot, _log) = fingerbot(
            r#"{"success":true,"result":[{"code":"battery_percentage","value":15},{"code":"charge_status","value":"charge_done"}]}"#,
        );
        let info = bot.battery().await.unwrap();
        assert_eq!(info.health(), Some(BatteryHealth::Low));
        assert_eq!(info.charging(), Some(&ChargingState::Done));

        assert_eq!(bot.test_connection().await.unwrap().timestamp(), 8200);

        let (bot, _log) = fingerbot(r#"{"success":false,"code":2001,"msg":"device is offline"}"#);
        match bot.battery().await.unwrap_err() {
            FingerbotError::Platform(e) => assert_eq!(e.code, Some(2001)),
            other => panic!("unexpected {:?}", other),
        }
    }
}
