mod common;

use axum::http::StatusCode;
use common::{ADMIN_KEY, TestApp, json_body, test_config};
use trustright::config::Config;
use trustright::database::Plan;

#[tokio::test]
async fn analytics_requires_admin_key() {
    let app = TestApp::new();

    let response = app.get("/api/admin/analytics", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/api/admin/analytics", Some("wrong-key")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 用户 token 不能访问管理接口
    let token = app.token("u1", "user@example.com");
    let response = app.get("/api/admin/analytics", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn analytics_reports_real_activity() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Free).await;
    app.subscribe("u2", Plan::Pro).await;
    let token = app.token("u1", "user@example.com");
    app.analyze(&token, "https://walmart.com").await;
    app.analyze(&token, "https://walmart.com").await;

    let response = app
        .get("/api/admin/analytics?timeRange=30d", Some(ADMIN_KEY))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["resp_data"];

    assert_eq!(data["totalAnalyses"], 1);
    assert_eq!(data["totalUsers"], 2);
    assert_eq!(data["averageTrustScore"], 64);
    assert_eq!(data["flaggedWebsites"], 1);
    assert_eq!(data["freeUsers"], 1);
    assert_eq!(data["proUsers"], 1);
    assert_eq!(data["freeToProConversion"], 50.0);
    assert_eq!(data["dailyStats"].as_array().unwrap().len(), 30);
    assert_eq!(data["dailyStats"][29]["analyses"], 2);
    assert_eq!(data["dailyStats"][29]["users"], 1);
    assert_eq!(data["trustScoreDistribution"][3]["range"], "60-69");
    assert_eq!(data["trustScoreDistribution"][3]["count"], 1);
    assert_eq!(data["topDomains"][0]["domain"], "walmart.com");
    assert_eq!(data["topDomains"][0]["analyses"], 2);
    assert_eq!(data["flagsByCategory"][0]["category"], "Privacy Concerns");
    assert_eq!(data["flagsByCategory"][0]["count"], 0);
}

#[tokio::test]
async fn analytics_is_rate_limited_per_ip() {
    let app = TestApp::with_config(Config {
        admin_rate_limit: 2,
        ..test_config()
    });

    for _ in 0..2 {
        let response = app.get("/api/admin/analytics", Some(ADMIN_KEY)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.get("/api/admin/analytics", Some(ADMIN_KEY)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
}
