//! Products and categories.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use anar_shop_integration_tests::TestApp;

#[tokio::test]
async fn test_product_crud() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_product(&admin, "Men's Classic Sneakers", "Male").await;

    let shown = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["product"]["price"], 45.5);
    assert_eq!(shown.body["product"]["totalStock"], 7);

    let updated = app
        .put(
            &format!("/api/products/{id}"),
            Some(&admin),
            json!({ "price": 50, "colors": [{ "color": "Black", "quantity": 1 }] }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["product"]["price"], 50.0);
    assert_eq!(updated.body["product"]["totalStock"], 1);
    assert_eq!(updated.body["product"]["name"], "Men's Classic Sneakers");

    let deleted = app.delete(&format!("/api/products/{id}"), Some(&admin)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Product deleted");

    let gone = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "Product not found");
}

#[tokio::test]
async fn test_product_listing_filters_by_category() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_product(&admin, "Sneakers", "Male").await;
    app.create_product(&admin, "Handbag", "Female").await;
    app.create_product(&admin, "Dress", "Female").await;

    let all = app.get("/api/products", None).await;
    assert_eq!(all.body["products"].as_array().unwrap().len(), 3);
    assert_eq!(all.body["products"][0]["name"], "Dress");

    let female = app.get("/api/products?category=Female", None).await;
    assert_eq!(female.body["products"].as_array().unwrap().len(), 2);

    let unknown = app.get("/api/products?category=Pets", None).await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_product_writes_need_admin() {
    let app = TestApp::new().await;
    let customer = app.signup("Saraa", "saraa@example.com").await;
    let body = json!({
        "name": "Scarf",
        "price": 10,
        "imageUrl": "/images/scarf.jpg",
        "category": "Accessories",
    });

    let anonymous = app.post("/api/products", None, body.clone()).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app.post("/api/products", Some(&customer), body).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_validation() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let missing = app
        .post("/api/products", Some(&admin), json!({ "name": "Scarf" }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["message"], "Please provide all required fields");

    let bad_category = app
        .post(
            "/api/products",
            Some(&admin),
            json!({ "name": "Scarf", "price": 10, "imageUrl": "/x.jpg", "category": "Pets" }),
        )
        .await;
    assert_eq!(bad_category.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let created = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "Winter Sale", "description": "Warm things" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["category"]["slug"], "winter-sale");
    let id = created.body["category"]["_id"].as_str().unwrap().to_owned();

    let dup = app
        .post(
            "/api/categories",
            Some(&admin),
            json!({ "name": "winter  sale", "description": "Again" }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["message"], "Category already exists");

    let listed = app.get("/api/categories", None).await;
    assert_eq!(listed.body["categories"].as_array().unwrap().len(), 1);

    let hidden = app
        .put(
            &format!("/api/categories/{id}"),
            Some(&admin),
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(hidden.status, StatusCode::OK);
    let listed = app.get("/api/categories", None).await;
    assert!(listed.body["categories"].as_array().unwrap().is_empty());

    let deleted = app.delete(&format!("/api/categories/{id}"), Some(&admin)).await;
    assert_eq!(deleted.body["message"], "Category deleted");

    let missing = app.delete(&format!("/api/categories/{id}"), Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
