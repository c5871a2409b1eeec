mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::ScriptedBackend;
use lead_scan_rs::clipboard::MemoryClipboard;
use lead_scan_rs::contract::ContractTable;
use lead_scan_rs::server::{router, AppState};
use lead_scan_rs::view::ScanClient;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(backend: Arc<ScriptedBackend>) -> (Router, Arc<ScanClient>) {
    let client = Arc::new(
        ScanClient::new(backend, ContractTable::default()).with_clipboard(MemoryClipboard::new()),
    );
    (router(AppState::new(client.clone()), "ui"), client)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn state_starts_idle() {
    let (app, _) = app(Arc::new(ScriptedBackend::new()));
    let (status, v) = call(&app, "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["state"], "idle");
    assert_eq!(v["mode"], "fast");
    assert_eq!(v["loading"], false);
}

#[tokio::test]
async fn scan_runs_in_background() {
    let backend = Arc::new(ScriptedBackend::new().reply(r#"{"status":"success","emails":["a@x.com"]}"#));
    let (app, client) = app(backend.clone());

    let (status, v) = call(&app, "POST", "/api/scan", Some(json!({ "target": "x.com" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(v["target"], "x.com");

    while client.is_loading().await {
        tokio::task::yield_now().await;
    }
    let (_, v) = call(&app, "GET", "/api/state", None).await;
    assert_eq!(v["state"], "success");
    assert_eq!(v["view"]["outcome"]["emails"], json!(["a@x.com"]));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn scan_rejects_empty_target_and_bulk() {
    let backend = Arc::new(ScriptedBackend::new());
    let (app, _) = app(backend.clone());

    let (status, _) = call(&app, "POST", "/api/scan", Some(json!({ "target": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, v) = call(
        &app,
        "POST",
        "/api/scan",
        Some(json!({ "target": "x.com", "mode": "bulk" })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(v["error"].as_str().unwrap().contains("Pro"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn scan_conflicts_while_loading() {
    let (backend, gate) = ScriptedBackend::gated();
    let backend = Arc::new(backend.reply(r#"{"status":"success","emails":[]}"#));
    let (app, client) = app(backend.clone());

    let (status, _) = call(&app, "POST", "/api/scan", Some(json!({ "target": "x.com" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = call(&app, "POST", "/api/scan", Some(json!({ "target": "y.com" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    gate.notify_one();
    while client.is_loading().await {
        tokio::task::yield_now().await;
    }
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn mode_target_and_reset_endpoints() {
    let (app, _) = app(Arc::new(ScriptedBackend::new()));

    let (_, v) = call(&app, "POST", "/api/mode", Some(json!({ "mode": "deep" }))).await;
    assert_eq!(v["mode"], "deep");
    let (_, v) = call(&app, "POST", "/api/target", Some(json!({ "target": "z.com" }))).await;
    assert_eq!(v["target"], "z.com");
    let (status, v) = call(&app, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["state"], "idle");
    assert_eq!(v["generation"], 1);
}

#[tokio::test]
async fn ui_copy_buttons_carry_email_as_data() {
    let (app, _) = app(Arc::new(ScriptedBackend::new()));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();

    // Backend text never lands inside inline script handlers.
    assert!(!html.contains("onclick="));
    assert!(html.contains("data-email=\"${esc(e)}\""));
    assert!(html.contains("btn.dataset.email"));
    // Related links are filtered to http(s) before becoming anchors.
    assert!(html.contains("isWeb(l.link)"));
}
