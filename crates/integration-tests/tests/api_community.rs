use axum::http::StatusCode;
use integration_tests::TestApp;
use serde_json::{json, Value};

fn content(title: &str) -> Value {
    json!({ "title": title, "content": "Hang pheromone traps before bloom.", "category": "pests" })
}

fn audit(id: i64, target_type: &str, approve: bool) -> Value {
    json!({ "target_id": id, "target_type": target_type, "is_approved": approve, "feedback": "checked" })
}

#[tokio::test]
async fn only_experts_and_admins_write_articles() {
    let app = TestApp::new();
    let (_, farmer) = app.signup("farmer@x.com", "FARMER").await;
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;

    assert_eq!(
        app.post("/api/v1/community/articles", &farmer, content("a")).await.status,
        StatusCode::FORBIDDEN
    );
    let created = app.post("/api/v1/community/articles", &expert, content("a")).await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.json()["status"], "PENDING");
    assert_eq!(created.json()["views"], 0);
}

#[tokio::test]
async fn post_is_hidden_until_approved() {
    let app = TestApp::new();
    let (farmer_id, farmer) = app.signup("farmer@x.com", "FARMER").await;
    let (_, admin) = app.signup("admin@x.com", "ADMIN").await;

    let post = app.post("/api/v1/community/posts", &farmer, content("traps")).await.json();
    assert_eq!(post["status"], "PENDING");
    assert_eq!(post["author_id"], farmer_id);
    let id = post["id"].as_i64().unwrap();

    let published = app.get("/api/v1/community/posts", &farmer).await.json();
    assert_eq!(published, json!([]));

    let pending = app.get("/api/v1/community/audit/pending?target_type=post", &admin).await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.json()[0]["id"], id);

    let res = app.post("/api/v1/community/audit", &admin, audit(id, "post", true)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    assert_eq!(res.json()["status"], "PUBLISHED");
    assert!(res.json()["msg"].is_string());

    let published = app.get("/api/v1/community/posts", &farmer).await.json();
    assert_eq!(published[0]["id"], id);
    let pending = app.get("/api/v1/community/audit/pending?target_type=post", &admin).await.json();
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn rejection_leaves_content_pending_and_is_logged() {
    let app = TestApp::new();
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;
    let (admin_id, admin) = app.signup("admin@x.com", "ADMIN").await;
    let id = app.post("/api/v1/community/articles", &expert, content("draft")).await.json()["id"]
        .as_i64()
        .unwrap();

    let res = app.post("/api/v1/community/audit", &admin, audit(id, "article", false)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "PENDING");

    let logs = app.get("/api/v1/community/audit/logs?target_type=article", &admin).await.json();
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["result"], "REJECTED");
    assert_eq!(logs[0]["auditor_id"], admin_id);
    assert_eq!(logs[0]["feedback"], "checked");
}

#[tokio::test]
async fn every_decision_appends_a_log_entry() {
    let app = TestApp::new();
    let (_, farmer) = app.signup("farmer@x.com", "FARMER").await;
    let (_, admin) = app.signup("admin@x.com", "ADMIN").await;
    let id = app.post("/api/v1/community/posts", &farmer, content("p")).await.json()["id"].as_i64().unwrap();

    for _ in 0..2 {
        let res = app.post("/api/v1/community/audit", &admin, audit(id, "post", true)).await;
        assert_eq!(res.json()["status"], "PUBLISHED");
    }

    let logs = app
        .get(&format!("/api/v1/community/audit/logs?target_type=post&target_id={id}"), &admin)
        .await
        .json();
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    // newest first
    assert!(logs[0]["id"].as_i64() > logs[1]["id"].as_i64());
}

#[tokio::test]
async fn moderation_is_admin_only() {
    let app = TestApp::new();
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;
    let id = app.post("/api/v1/community/articles", &expert, content("a")).await.json()["id"].as_i64().unwrap();

    assert_eq!(
        app.get("/api/v1/community/audit/pending?target_type=article", &expert).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.post("/api/v1/community/audit", &expert, audit(id, "article", true)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.get("/api/v1/community/audit/logs", &expert).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn audit_input_errors() {
    let app = TestApp::new();
    let (_, admin) = app.signup("admin@x.com", "ADMIN").await;

    let bad_type = app.post("/api/v1/community/audit", &admin, audit(1, "comment", true)).await;
    assert_eq!(bad_type.status, StatusCode::BAD_REQUEST);
    assert!(bad_type.json()["errors"]["target_type"].is_array());

    let missing = app.post("/api/v1/community/audit", &admin, audit(999, "post", true)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let bad_query = app.get("/api/v1/community/audit/pending?target_type=comment", &admin).await;
    assert_eq!(bad_query.status, StatusCode::BAD_REQUEST);

    let no_query = app.get("/api/v1/community/audit/pending", &admin).await;
    assert_eq!(no_query.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn article_and_post_ids_are_independent() {
    let app = TestApp::new();
    let (_, expert) = app.signup("expert@x.com", "EXPERT").await;
    let (_, admin) = app.signup("admin@x.com", "ADMIN").await;

    let article = app.post("/api/v1/community/articles", &expert, content("a")).await.json();
    let post = app.post("/api/v1/community/posts", &expert, content("p")).await.json();
    assert_eq!(article["id"], post["id"]);

    app.post("/api/v1/community/audit", &admin, audit(post["id"].as_i64().unwrap(), "post", true)).await;
    assert_eq!(app.get("/api/v1/community/articles", &expert).await.json(), json!([]));
    assert_eq!(app.get("/api/v1/community/posts", &expert).await.json()[0]["title"], "p");
}
