//! Outbound JSON POST against a local backend.

use reqkit::outbound::post_json;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

mod common;

#[derive(Serialize)]
struct Foo {
    bar: String,
}

#[tokio::test]
async fn test_post_json_default_client() {
    let addr = common::start_echo_backend().await;
    let payload = Foo { bar: "bar".into() };

    let (res, status) = post_json(&format!("http://{addr}/some/path"), &payload, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["received"], json!({"bar": "bar"}));
}

#[tokio::test]
async fn test_post_json_custom_client() {
    let addr = common::start_echo_backend().await;
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let (_, status) = post_json(&format!("http://{addr}/hook"), &json!([1, 2, 3]), Some(&client))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
}
