//! Account flows: signup, login, current user, logout and the user list.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use anar_shop_integration_tests::{PASSWORD, TestApp};

#[tokio::test]
async fn test_signup_returns_token_and_profile() {
    let app = TestApp::new().await;

    let resp = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "name": "Saraa", "email": "Saraa@Example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["success"], true);
    assert!(!resp.body["token"].as_str().unwrap().is_empty());
    assert_eq!(resp.body["user"]["email"], "saraa@example.com");
    assert_eq!(resp.body["user"]["role"], "customer");
    assert!(resp.body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_bad_input() {
    let app = TestApp::new().await;
    app.signup("Saraa", "saraa@example.com").await;

    let dup = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "name": "Other", "email": "SARAA@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["message"], "User already exists");

    let short = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "name": "Bat", "email": "bat@example.com", "password": "12345" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["message"], "Password must be at least 6 characters");

    let missing = app
        .post("/api/auth/signup", None, json!({ "email": "x@example.com" }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["success"], false);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    app.signup("Saraa", "saraa@example.com").await;

    let wrong = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "saraa@example.com", "password": "nope-nope" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid credentials");

    let unknown = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "saraa@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["token"].as_str().unwrap();

    let me = app.get("/api/auth/me", Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["name"], "Saraa");
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::new().await;

    let none = app.get("/api/auth/me", None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["message"], "Not authorized to access this route");

    let bogus = app.get("/api/auth/me", Some("not-a-real-token")).await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    let token = app.signup("Saraa", "saraa@example.com").await;

    let resp = app.post("/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Logged out");

    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_list_is_admin_only() {
    let app = TestApp::new().await;
    let customer = app.signup("Saraa", "saraa@example.com").await;
    let admin = app.admin_token().await;

    let denied = app.get("/api/auth/users", Some(&customer)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(
        denied.body["message"],
        "User role customer is not authorized to access this route"
    );

    let listed = app.get("/api/auth/users", Some(&admin)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], 2);
    let users = listed.body["users"].as_array().unwrap();
    assert!(users.iter().all(|u| u.get("password").is_none()));
    assert!(users.iter().all(|u| u["_id"].is_string() && u.get("id").is_none()));
}
