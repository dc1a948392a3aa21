mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{START_MS, TestApp, json_body};
use trustright::database::{Plan, Subscription};

#[tokio::test]
async fn analyze_requires_a_valid_token() {
    let app = TestApp::new();

    let response = app.get("/api/user/subscription", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], 1002);

    let response = app.analyze("not-a-jwt", "https://amazon.com").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.analyzer.calls(), 0);
}

#[tokio::test]
async fn fresh_analysis_is_cached_per_company_family() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Pro).await;
    let token = app.token("u1", "user@example.com");

    let response = app.analyze(&token, "https://www.amazon.com/dp/B0001").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["resp_data"];
    assert_eq!(json["code"], 0);
    assert_eq!(data["fromCache"], false);
    assert_eq!(data["isDemo"], false);
    assert_eq!(data["domain"], "amazon.com");
    assert_eq!(data["trustScore"], 64);
    assert_eq!(data["searchesRemaining"], 99);
    assert!(data["id"].is_i64());

    // 同一公司的另一个域名直接命中缓存
    let response = app.analyze(&token, "amazon.co.uk").await;
    let json = json_body(response).await;
    let data = &json["resp_data"];
    assert_eq!(data["fromCache"], true);
    assert_eq!(data["domain"], "amazon.co.uk");
    assert_eq!(data["company_name"], "amazon.com Inc");
    assert_eq!(data["searchesRemaining"], 98);

    assert_eq!(app.analyzer.calls(), 1);
    assert_eq!(app.repository.search_count().await, 2);
    assert_eq!(app.repository.website_count().await, 2);
}

#[tokio::test]
async fn cached_analysis_expires_after_ttl() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Pro).await;
    let token = app.token("u1", "user@example.com");

    app.analyze(&token, "https://amazon.de").await;
    app.advance(app.config.cache_ttl() - Duration::from_millis(1));
    let json = json_body(app.analyze(&token, "https://amazon.com").await).await;
    assert_eq!(json["resp_data"]["fromCache"], true);
    assert_eq!(app.analyzer.calls(), 1);

    app.advance(Duration::from_millis(2));
    let json = json_body(app.analyze(&token, "https://amazon.com").await).await;
    assert_eq!(json["resp_data"]["fromCache"], false);
    assert_eq!(app.analyzer.calls(), 2);
}

#[tokio::test]
async fn sixth_request_in_a_minute_is_rejected() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Pro).await;
    app.subscribe("u2", Plan::Pro).await;
    let token = app.token("u1", "user@example.com");

    for _ in 0..5 {
        let response = app.analyze(&token, "https://target.com").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.analyze(&token, "https://target.com").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
    let reset = (START_MS + 60_000 + 999) / 1000;
    assert_eq!(response.headers()["X-RateLimit-Reset"], reset.to_string().as_str());
    assert_eq!(json_body(response).await["code"], 1005);

    // 其他用户不受影响
    let other = app.token("u2", "other@example.com");
    assert_eq!(app.analyze(&other, "https://target.com").await.status(), StatusCode::OK);

    // 窗口结束后恢复
    app.advance(Duration::from_secs(61));
    assert_eq!(app.analyze(&token, "https://target.com").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_subscription_is_forbidden() {
    let app = TestApp::new();
    let token = app.token("ghost", "ghost@example.com");

    let response = app.analyze(&token, "https://target.com").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], 1003);

    let mut inactive = Subscription::new("ghost", Plan::Pro);
    inactive.is_active = false;
    app.repository.insert_subscription(inactive).await;
    let response = app.analyze(&token, "https://target.com").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.analyzer.calls(), 0);
}

#[tokio::test]
async fn exhausted_quota_is_reported() {
    let app = TestApp::new();
    let mut subscription = Subscription::new("u1", Plan::Free);
    subscription.searches_used = 5;
    app.repository.insert_subscription(subscription).await;
    let token = app.token("u1", "user@example.com");

    let response = app.analyze(&token, "https://target.com").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(response).await;
    assert_eq!(json["code"], 1006);
    assert!(json["msg"].as_str().unwrap().contains("5/5"));
    assert_eq!(app.analyzer.calls(), 0);
}

#[tokio::test]
async fn empty_url_is_a_validation_error() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Free).await;
    let token = app.token("u1", "user@example.com");

    let response = app.analyze(&token, "   ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 1000);
}

#[tokio::test]
async fn upstream_failure_returns_uncharged_demo_report() {
    let app = TestApp::new();
    app.subscribe("u1", Plan::Free).await;
    let token = app.token("u1", "user@example.com");
    app.analyzer.set_failing(true);

    let response = app.analyze(&token, "https://shopify.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = &json["resp_data"];
    assert_eq!(data["isDemo"], true);
    assert_eq!(data["trustScore"], 50);
    assert_eq!(data["company_name"], "Shopify.com");
    assert_eq!(data["searchesRemaining"], 5);
    assert!(data.get("id").is_none());
    assert_eq!(app.repository.search_count().await, 0);

    // 失败结果没有进入缓存
    app.analyzer.set_failing(false);
    let json = json_body(app.analyze(&token, "https://shopify.com").await).await;
    assert_eq!(json["resp_data"]["fromCache"], false);
    assert_eq!(json["resp_data"]["isDemo"], false);
    assert_eq!(json["resp_data"]["searchesRemaining"], 4);
    assert_eq!(app.analyzer.calls(), 2);
}
