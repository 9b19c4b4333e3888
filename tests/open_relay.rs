//! End-to-end tests for the open relay.

use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{raw_client, spawn_relay, test_config};

fn encode(target: &str) -> String {
    url::form_urlencoded::byte_serialize(target.as_bytes()).collect()
}

#[tokio::test]
async fn streams_body_status_and_headers_unchanged() {
    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/upgcxcode/1.m4s"))
        .and(header("referer", "https://www.bilibili.com/"))
        .and(header("range", "bytes=0-65535"))
        .respond_with(
            ResponseTemplate::new(206)
                .set_body_raw(payload.clone(), "video/mp4")
                .insert_header("content-range", "bytes 0-65535/1048576")
                .insert_header("content-encoding", "identity"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let relay = spawn_relay(test_config(&upstream.uri())).await;
    let target = format!("{}/upgcxcode/1.m4s", upstream.uri());
    let response = raw_client()
        .get(relay.url(&format!("/?url={}", encode(&target))))
        .header("range", "bytes=0-65535")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 206);
    assert_eq!(response.headers()["content-type"], "video/mp4");
    assert_eq!(response.headers()["content-range"], "bytes 0-65535/1048576");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.bytes().await.unwrap().as_ref(), payload.as_slice());
}

#[tokio::test]
async fn referer_parameter_overrides_default() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cover.jpg"))
        .and(header("referer", "https://m.bilibili.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8, 2, 3], "image/jpeg"))
        .expect(1)
        .mount(&upstream)
        .await;

    let relay = spawn_relay(test_config(&upstream.uri())).await;
    let target = format!("{}/cover.jpg", upstream.uri());
    let response = reqwest::get(relay.url(&format!(
        "/?url={}&referer={}",
        encode(&target),
        encode("https://m.bilibili.com/")
    )))
    .await
    .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[1u8, 2, 3]);
}

#[tokio::test]
async fn upstream_error_status_is_relayed() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/expired.mp4"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&upstream)
        .await;

    let relay = spawn_relay(test_config(&upstream.uri())).await;
    let target = format!("{}/expired.mp4", upstream.uri());
    let response = reqwest::get(relay.url(&format!("/?url={}", encode(&target))))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(response.text().await.unwrap(), "denied");
}

#[tokio::test]
async fn missing_url_is_an_error_envelope() {
    let relay = spawn_relay(test_config("http://127.0.0.1:9")).await;
    let response = reqwest::get(relay.url("/")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], -1);
    assert_eq!(body["error"], "missing required parameter: url");
}

#[tokio::test]
async fn disallowed_host_is_never_fetched() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut config = test_config(&upstream.uri());
    config.relay.allowed_hosts = vec!["bilivideo.com".into()];
    let relay = spawn_relay(config).await;

    let target = format!("{}/secret", upstream.uri());
    let response = reqwest::get(relay.url(&format!("/?url={}", encode(&target))))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid relay target: host '127.0.0.1' is not allowed");
}
