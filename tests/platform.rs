use {
    fingerbot_cloud_client::{
        ClientSecret, Config, DesiredProperties, FingerBot, HttpMethod, RequestBody, Signer, UnsupportedMethodError,
    },
    serde_json::json,
    std::time::Duration as StdDuration,
    wiremock::{
        matchers::{body_string, header, header_exists, method, path, query_param},
        Mock, MockServer, Request, ResponseTemplate,
    },
};

const CLIENT_ID: &str = "4upgk93g77348pvmcgu9";
const CLIENT_SECRET: &str = "0123456789abcdef0123456789abcdef";
const DEVICE_ID: &str = "bfbd4ashj4z74h5n";

fn config(base_url: &str) -> Config {
    Config::builder()
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .device_id(DEVICE_ID)
        .base_url(base_url)
        .http_timeout(StdDuration::from_millis(500))
        .build()
        .unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1.0/token"))
        .and(query_param("grant_type", "1"))
        .and(header("client_id", CLIENT_ID))
        .and(header("sign_method", "HMAC-SHA256"))
        .and(header_exists("sign"))
        .and(header_exists("t"))
        .and(header_exists("nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"access_token": "3f4eda2bdec17232f67c0b188af3eec1", "expire_time": 7200, "uid": "bay1"},
            "t": 1700000000000_u64,
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn header_str<'a>(req: &'a Request, name: &str) -> &'a str {
    req.headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

/// Recompute the signature the server should expect for `req`.
fn expected_signature(req: &Request, method: HttpMethod, canonical_url: &str) -> String {
    let signer = Signer::new(CLIENT_ID, ClientSecret::new(CLIENT_SECRET));
    let token = req.headers.get("access_token").and_then(|v| v.to_str().ok());
    signer
        .sign_with(
            method,
            canonical_url,
            &RequestBody::from_bytes(req.body.clone()),
            token,
            header_str(req, "t"),
            header_str(req, "nonce"),
        )
        .signature()
        .to_string()
}

#[test_log::test(tokio::test)]
async fn status_round_trip() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let body = json!({"success": true, "result": [{"code": "switch", "value": true}], "t": 1, "tid": "x"});
    Mock::given(method("GET"))
        .and(path(format!("/v1.0/devices/{}/status", DEVICE_ID)))
        .and(header("access_token", "3f4eda2bdec17232f67c0b188af3eec1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(2)
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    assert_eq!(bot.status().await.to_json(), body);
    assert_eq!(bot.status().await.to_json(), body);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    let token_req = &requests[0];
    let canonical = "/v1.0/token?grant_type=1";
    assert_eq!(header_str(token_req, "sign"), expected_signature(token_req, HttpMethod::Get, canonical));
    assert!(token_req.headers.get("access_token").is_none());

    let status_req = &requests[1];
    let canonical = format!("/v1.0/devices/{}/status", DEVICE_ID);
    assert_eq!(header_str(status_req, "sign"), expected_signature(status_req, HttpMethod::Get, &canonical));
    assert_eq!(header_str(status_req, "t").len(), 13);
    assert!(status_req.headers.get("content-type").is_none());
    assert_ne!(header_str(&requests[1], "nonce"), header_str(&requests[2], "nonce"));
}

#[test_log::test(tokio::test)]
async fn desired_properties_write() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let desired_path = format!("/v2.0/cloud/thing/{}/shadow/properties/desired", DEVICE_ID);
    Mock::given(method("POST"))
        .and(path(desired_path.as_str()))
        .and(header("content-type", "application/json"))
        .and(body_string(
            r#"{"properties":"{\"arm_down_percent\":100,\"arm_up_percent\":100,\"switch\":true,\"mode\":\"click\"}","duration":3600,"type":1}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": true})))
        .expect(1)
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    assert!(bot.apply(&DesiredProperties::click()).await.is_success());

    let requests = server.received_requests().await.unwrap();
    let write = &requests[1];
    assert_eq!(header_str(write, "sign"), expected_signature(write, HttpMethod::Post, &desired_path));
}

#[test_log::test(tokio::test)]
async fn invoke_sorts_query_parameters() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": {"list": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    let params = [("page_size", "20"), ("device_ids", DEVICE_ID)];
    let result = bot.invoker().invoke("/v1.0/iot-03/devices", "get", None, &params).await;
    assert!(result.unwrap().is_success());

    let requests = server.received_requests().await.unwrap();
    let req = &requests[1];
    assert_eq!(req.url.query(), Some("device_ids=bfbd4ashj4z74h5n&page_size=20"));
    let canonical = "/v1.0/iot-03/devices?device_ids=bfbd4ashj4z74h5n&page_size=20";
    assert_eq!(header_str(req, "sign"), expected_signature(req, HttpMethod::Get, canonical));
}

#[test_log::test(tokio::test)]
async fn non_200_is_normalized() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1.0/devices/{}", DEVICE_ID)))
        .respond_with(ResponseTemplate::new(502).set_body_string("z".repeat(1000)))
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    let json = bot.device_info().await.to_json();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "HTTP 502");
    assert_eq!(json["response"], "z".repeat(200));
}

#[test_log::test(tokio::test)]
async fn token_rejection_skips_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "code": 1004, "msg": "sign invalid"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(path(format!("/v1.0/devices/{}/status", DEVICE_ID)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    let json = bot.status().await.to_json();
    assert_eq!(
        json,
        json!({
            "success": false,
            "error": "no access token",
            "detail": "token request rejected: platform error 1004: sign invalid",
        })
    );
    assert!(bot.test_connection().await.is_err());
}

#[test_log::test(tokio::test)]
async fn unsupported_method_sends_nothing() {
    let server = MockServer::start().await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    let e = bot.invoker().invoke("/v1.0/devices/x", "PATCH", Some(&json!({"a": 1})), &[]).await.unwrap_err();
    assert_eq!(e, UnsupportedMethodError("PATCH".to_string()));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn slow_call_times_out() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1.0/devices/{}/functions", DEVICE_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true})).set_delay(StdDuration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let bot = FingerBot::from_config(&config(&server.uri())).unwrap();
    assert_eq!(bot.functions().await.to_json(), json!({"success": false, "error": "timeout"}));
}

#[test_log::test(tokio::test)]
async fn unreachable_platform() {
    // Nothing listens on the discard port.
    let bot = FingerBot::from_config(&config("http://127.0.0.1:9")).unwrap();
    let json = bot.status().await.to_json();
    assert_eq!(json["error"], "no access token");
    assert_eq!(json["detail"], "token request failed: connection error");
}
