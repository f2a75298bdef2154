use axum::http::StatusCode;
use chrono::{Duration, Utc};
use integration_tests::TestApp;
use serde_json::{json, Value};

fn warning(scope: &str, expires_in: Duration) -> Value {
    json!({
        "level": "URGENT",
        "affected_scope": scope,
        "prevention_measures": "Spray copper before the rain front.",
        "expire_time": (Utc::now() + expires_in).to_rfc3339()
    })
}

#[tokio::test]
async fn publish_broadcasts_to_every_registered_email() {
    let app = TestApp::new();
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;
    app.signup("farmer1@x.com", "FARMER").await;
    app.signup("farmer2@x.com", "FARMER").await;

    let res = app.post("/api/v1/warning/", &expert, warning("north valley", Duration::days(3))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let id = res.json()["id"].as_i64().unwrap();
    assert_eq!(res.json()["level"], "URGENT");

    let broadcast = app.next_broadcast().await.expect("broadcast");
    assert_eq!(broadcast.warning.id, id);
    let mut recipients = broadcast.recipients;
    recipients.sort();
    assert_eq!(recipients, ["expert@x.com", "farmer1@x.com", "farmer2@x.com"]);
}

#[tokio::test]
async fn farmers_cannot_publish_or_withdraw() {
    let app = TestApp::new();
    let (_, farmer) = app.signup("farmer@x.com", "FARMER").await;
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;

    let res = app.post("/api/v1/warning/", &farmer, warning("x", Duration::days(1))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let id = app.post("/api/v1/warning/", &expert, warning("x", Duration::days(1))).await.json()["id"]
        .as_i64()
        .unwrap();
    assert_eq!(app.delete(&format!("/api/v1/warning/{id}"), &farmer).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn active_list_hides_expired_and_orders_newest_first() {
    let app = TestApp::new();
    let (_, farmer) = app.signup("farmer@x.com", "FARMER").await;
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;

    app.post("/api/v1/warning/", &expert, warning("expired", -Duration::hours(1))).await;
    app.post("/api/v1/warning/", &expert, warning("older", Duration::days(2))).await;
    app.post("/api/v1/warning/", &expert, warning("newer", Duration::days(2))).await;

    let active = app.get("/api/v1/warning/active", &farmer).await;
    assert_eq!(active.status, StatusCode::OK);
    let scopes: Vec<String> = active
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["affected_scope"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(scopes, ["newer", "older"]);
}

#[tokio::test]
async fn withdraw_then_404() {
    let app = TestApp::new();
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;
    let id = app.post("/api/v1/warning/", &expert, warning("x", Duration::days(1))).await.json()["id"]
        .as_i64()
        .unwrap();

    let uri = format!("/api/v1/warning/{id}");
    assert_eq!(app.delete(&uri, &expert).await.status, StatusCode::OK);
    assert_eq!(app.delete(&uri, &expert).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/v1/warning/active", &expert).await.json(), json!([]));
}

#[tokio::test]
async fn active_list_requires_a_token() {
    let app = TestApp::new();
    let res = app.call(axum::http::Method::GET, "/api/v1/warning/active", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
