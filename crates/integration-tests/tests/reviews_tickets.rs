//! Product reviews and support tickets.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use anar_shop_integration_tests::TestApp;

#[tokio::test]
async fn test_review_lifecycle() {
    let app = TestApp::new().await;
    let author = app.signup("Saraa", "saraa@example.com").await;
    let other = app.signup("Bold", "bold@example.com").await;

    let created = app
        .post(
            "/api/reviews",
            Some(&author),
            json!({ "productId": "p1", "rating": 5, "comment": "Great fit" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["review"]["userName"], "saraa");
    let id = created.body["review"]["_id"].as_str().unwrap().to_owned();

    let listed = app.get("/api/reviews/product/p1", None).await;
    assert_eq!(listed.body["reviews"].as_array().unwrap().len(), 1);
    let empty = app.get("/api/reviews/product/p2", None).await;
    assert!(empty.body["reviews"].as_array().unwrap().is_empty());

    let denied = app.delete(&format!("/api/reviews/{id}"), Some(&other)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["message"], "Not authorized");

    let deleted = app.delete(&format!("/api/reviews/{id}"), Some(&author)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Review deleted");

    let missing = app.delete(&format!("/api/reviews/{id}"), Some(&author)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_rating_range() {
    let app = TestApp::new().await;
    let token = app.signup("Saraa", "saraa@example.com").await;

    let resp = app
        .post(
            "/api/reviews",
            Some(&token),
            json!({ "productId": "p1", "rating": 6, "comment": "Too good" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn test_admin_can_delete_any_review() {
    let app = TestApp::new().await;
    let author = app.signup("Saraa", "saraa@example.com").await;
    let admin = app.admin_token().await;

    let created = app
        .post(
            "/api/reviews",
            Some(&author),
            json!({ "productId": "p1", "rating": 1, "comment": "Spam" }),
        )
        .await;
    let id = created.body["review"]["_id"].as_str().unwrap();

    let deleted = app.delete(&format!("/api/reviews/{id}"), Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_ticket_lifecycle() {
    let app = TestApp::new().await;
    let customer = app.signup("Saraa", "saraa@example.com").await;
    let admin = app.admin_token().await;

    let opened = app
        .post(
            "/api/tickets",
            Some(&customer),
            json!({ "subject": "Late delivery", "message": "Where is my order?" }),
        )
        .await;
    assert_eq!(opened.status, StatusCode::CREATED);
    let ticket = &opened.body["ticket"];
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["priority"], "medium");
    assert_eq!(ticket["userEmail"], "saraa@example.com");
    let id = ticket["_id"].as_str().unwrap().to_owned();

    let mine = app.get("/api/tickets", Some(&customer)).await;
    assert_eq!(mine.body["tickets"].as_array().unwrap().len(), 1);

    let denied = app.get("/api/tickets/admin/all", Some(&customer)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let forbidden = app
        .put(&format!("/api/tickets/{id}"), Some(&customer), json!({ "status": "closed" }))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let malformed = app
        .put_raw(&format!("/api/tickets/{id}"), Some(&customer), "{not json")
        .await;
    assert_eq!(malformed.status, StatusCode::FORBIDDEN);
    assert_eq!(malformed.body["message"], "Not authorized");

    let updated = app
        .put(
            &format!("/api/tickets/{id}"),
            Some(&admin),
            json!({ "status": "in-progress", "priority": "high" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["ticket"]["status"], "in-progress");
    assert_eq!(updated.body["ticket"]["priority"], "high");

    let all = app.get("/api/tickets/admin/all", Some(&admin)).await;
    assert_eq!(all.body["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ticket_requires_subject_and_message() {
    let app = TestApp::new().await;
    let token = app.signup("Saraa", "saraa@example.com").await;

    let resp = app
        .post("/api/tickets", Some(&token), json!({ "subject": "Hello" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Subject and message are required");
}
