mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn test_status() {
    let app = TestApp::new();
    let admin = app.token_for("admin").await;
    app.create_user("bob", "user", false).await;

    let (status, body) = app.get("/api/v1/system/status", &admin).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["users"], 2);
    assert_eq!(body["data"]["sites"], 0);
    assert!(body["data"]["uptimeSeconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_restart_is_published() {
    let app = TestApp::new();
    let admin = app.token_for("admin").await;
    let mut restarts = app.state.subscribe_restarts();

    let (status, body) = app
        .request("POST", "/api/v1/system/restart", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["code"], 202);
    assert_eq!(body["message"], "restart requested");

    let request = restarts.recv().await.unwrap();
    assert_eq!(body["data"]["requestedBy"], request.requested_by.as_str());
    assert!(request.requested_by.starts_with("admin-"));
}

#[tokio::test]
async fn test_restart_requires_capability() {
    let app = TestApp::new();
    let configurator = app.token_for("configurator").await;

    let (status, body) = app
        .request("POST", "/api/v1/system/restart", Some(&configurator), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "forbidden: missing capability system:restart");
}
