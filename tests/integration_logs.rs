mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use uuid::Uuid;

use simplewaf_db::WafLogRepository;
use simplewaf_models::waf_logs::WafLog;

fn waf_log(src_ip: &str, domain: &str, dst_port: i32, created_at: DateTime<Utc>) -> WafLog {
    WafLog {
        id: Uuid::new_v4(),
        rule_id: 941100,
        src_ip: src_ip.to_string(),
        src_port: 52000,
        dst_ip: "10.0.0.2".to_string(),
        dst_port,
        domain: domain.to_string(),
        uri: "/search?q=<script>".to_string(),
        request_id: Uuid::new_v4().to_string(),
        message: "XSS Attack Detected".to_string(),
        payload: "<script>".to_string(),
        phase: 2,
        severity: 2,
        accuracy: 0,
        sec_mark: String::new(),
        sec_lang_raw: String::new(),
        request: String::new(),
        response: String::new(),
        logs: vec![],
        created_at,
    }
}

async fn seed(app: &TestApp) {
    let now = Utc::now();
    let logs = [
        waf_log("203.0.113.7", "shop.example.com", 443, now - Duration::minutes(20)),
        waf_log("203.0.113.7", "shop.example.com", 443, now - Duration::minutes(5)),
        waf_log("198.51.100.4", "blog.example.com", 80, now - Duration::hours(3)),
    ];
    for log in logs {
        app.state.repos.waf_logs.insert(log).await.unwrap();
    }
}

#[tokio::test]
async fn test_list_logs_filters() {
    let app = TestApp::new();
    seed(&app).await;
    let auditor = app.token_for("auditor").await;

    let (status, body) = app.get("/api/v1/logs", &auditor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 3);

    let (status, body) = app
        .get("/api/v1/logs?srcIp=203.0.113.7&dstPort=443", &auditor)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 2);
    assert_eq!(body["data"]["results"][0]["domain"], "shop.example.com");

    let (status, body) = app.get("/api/v1/logs?domain=&pageSize=1", &auditor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_attack_events() {
    let app = TestApp::new();
    seed(&app).await;
    let auditor = app.token_for("auditor").await;

    let (status, body) = app.get("/api/v1/logs/events", &auditor).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 2);
    assert_eq!(body["data"]["truncated"], false);

    let latest = &body["data"]["results"][0];
    assert_eq!(latest["srcIp"], "203.0.113.7");
    assert_eq!(latest["count"], 2);
    assert_eq!(latest["durationInMinutes"], 15);
    assert_eq!(latest["isOngoing"], true);

    let older = &body["data"]["results"][1];
    assert_eq!(older["srcIp"], "198.51.100.4");
    assert_eq!(older["isOngoing"], false);
}

#[tokio::test]
async fn test_inverted_time_range() {
    let app = TestApp::new();
    let auditor = app.token_for("auditor").await;

    for uri in ["/api/v1/logs", "/api/v1/logs/events"] {
        let (status, body) = app
            .get(
                &format!("{uri}?startTime=2024-05-02T00:00:00Z&endTime=2024-05-01T00:00:00Z"),
                &auditor,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "startTime must not be after endTime");
    }
}

#[tokio::test]
async fn test_bad_query_value() {
    let app = TestApp::new();
    let auditor = app.token_for("auditor").await;

    let (status, _) = app.get("/api/v1/logs?dstPort=http", &auditor).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_logs_far_past_last_page() {
    let app = TestApp::new();
    seed(&app).await;
    let auditor = app.token_for("auditor").await;

    for uri in [
        "/api/v1/logs?page=9223372036854775807",
        "/api/v1/logs/events?page=9223372036854775807&pageSize=100",
    ] {
        let (status, body) = app.get(uri, &auditor).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body["data"]["results"].as_array().unwrap().is_empty(), "{uri}");
    }
}
