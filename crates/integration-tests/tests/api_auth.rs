use axum::http::{header, Method, StatusCode};
use integration_tests::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_login_me() {
    let app = TestApp::new();

    let registered = app.register("farmer@x.com", "FARMER").await;
    assert_eq!(registered.status, StatusCode::OK);
    let body = registered.json();
    assert_eq!(body["email"], "farmer@x.com");
    assert_eq!(body["role"], "FARMER");
    assert_eq!(body["is_verified"], false);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let login = app.login("farmer@x.com", PASSWORD).await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.json()["token_type"], "bearer");
    let token = login.json()["access_token"].as_str().unwrap().to_owned();

    let me = app.get("/api/v1/users/me", &token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "farmer@x.com");
    assert_eq!(me.json()["role"], "FARMER");
}

#[tokio::test]
async fn role_defaults_to_farmer() {
    let app = TestApp::new();
    let body = json!({ "email": "a@x.com", "username": "a", "password": PASSWORD });
    let res = app.call(Method::POST, "/api/v1/users/register", None, Some(body)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["role"], "FARMER");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new();
    assert_eq!(app.register("dup@x.com", "FARMER").await.status, StatusCode::OK);

    let again = app.register("dup@x.com", "EXPERT").await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert!(again.json()["detail"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn invalid_registration_reports_fields() {
    let app = TestApp::new();
    let body = json!({ "email": "not-an-email", "username": "x", "password": "12345" });
    let res = app.call(Method::POST, "/api/v1/users/register", None, Some(body)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let errors = &res.json()["errors"];
    assert!(errors["email"].is_array());
    assert!(errors["password"].is_array());
}

#[tokio::test]
async fn wrong_password_is_401_with_challenge() {
    let app = TestApp::new();
    app.register("farmer@x.com", "FARMER").await;

    for (email, password) in [("farmer@x.com", "wrong-pw"), ("ghost@x.com", PASSWORD)] {
        let res = app.login(email, password).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers[header::WWW_AUTHENTICATE], "Bearer");
    }
}

#[tokio::test]
async fn protected_routes_demand_a_valid_token() {
    let app = TestApp::new();
    let (id, _) = app.signup("farmer@x.com", "FARMER").await;

    let missing = app.call(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.headers[header::WWW_AUTHENTICATE], "Bearer");

    let garbage = app.get("/api/v1/users/me", "not.a.jwt").await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let expired = app.get("/api/v1/users/me", &app.expired_token(id)).await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.json()["detail"], "could not validate credentials");
}

#[tokio::test]
async fn token_for_a_vanished_principal_is_rejected() {
    let app = TestApp::new();
    let res = app.get("/api/v1/users/me", &app.token_for(999)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_rechecks_the_current_one() {
    let app = TestApp::new();
    let (_, token) = app.signup("farmer@x.com", "FARMER").await;

    let wrong = app
        .put(
            "/api/v1/users/me/password",
            &token,
            json!({ "current_password": "nope", "new_password": "brand-new" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let short = app
        .put(
            "/api/v1/users/me/password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "123" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let ok = app
        .put(
            "/api/v1/users/me/password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "brand-new" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    assert_eq!(app.login("farmer@x.com", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("farmer@x.com", "brand-new").await.status, StatusCode::OK);
}

#[tokio::test]
async fn racing_registrations_admit_one_with_a_clean_message() {
    let app = TestApp::new();
    let (a, b, c) = tokio::join!(
        app.register("race@x.com", "FARMER"),
        app.register("race@x.com", "FARMER"),
        app.register("race@x.com", "EXPERT"),
    );

    let mut statuses: Vec<StatusCode> = [&a, &b, &c].iter().map(|r| r.status).collect();
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST]);

    for res in [a, b, c].iter().filter(|r| r.status == StatusCode::BAD_REQUEST) {
        assert_eq!(res.json()["detail"], "email already registered");
    }
}
