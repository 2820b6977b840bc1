//! Integration tests for Anar Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory store
//! cargo test -p anar-shop-integration-tests
//!
//! # Live tests against a running server
//! API_BASE_URL=http://localhost:4000 cargo test -p anar-shop-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the full router (middleware included) through
//! `tower::ServiceExt::oneshot`, so no port is bound and no database is
//! needed.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use anar_shop_api::app;
use anar_shop_api::config::ApiConfig;
use anar_shop_api::services::auth::AuthService;
use anar_shop_api::state::AppState;
use anar_shop_api::store::{MemoryStore, ensure_indexes};
use anar_shop_core::models::SignupRequest;

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "secret123";

/// A response with its body already parsed.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// The API router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    config: ApiConfig,
}

impl TestApp {
    /// An app with development settings.
    pub async fn new() -> Self {
        Self::with_config(ApiConfig::development()).await
    }

    /// An app with custom settings.
    pub async fn with_config(config: ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        ensure_indexes(store.as_ref()).await.unwrap();
        let router = app(AppState::new(config.clone(), store.clone()));
        Self {
            router,
            store,
            config,
        }
    }

    /// The backing store, for arranging data directly.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Send a request built by the caller.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a JSON request, optionally with a bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// Send a PUT whose body is sent verbatim as `application/json`.
    pub async fn put_raw(&self, uri: &str, token: Option<&str>, body: &str) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_owned())).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Sign up a customer and return their token.
    pub async fn signup(&self, name: &str, email: &str) -> String {
        let resp = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "signup failed: {:?}", resp.body);
        resp.body["token"].as_str().unwrap().to_owned()
    }

    /// Create an admin account directly in the store and log in as it.
    pub async fn admin_token(&self) -> String {
        let new_user = SignupRequest {
            name: Some("Admin User".to_owned()),
            email: Some("admin@anarshop.com".to_owned()),
            password: Some(PASSWORD.to_owned()),
        }
        .validate()
        .unwrap();
        AuthService::new(self.store(), self.config.session_ttl)
            .create_or_promote_admin(new_user)
            .await
            .unwrap();

        let resp = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": "admin@anarshop.com", "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "admin login failed: {:?}", resp.body);
        resp.body["token"].as_str().unwrap().to_owned()
    }

    /// Create a product as `admin` and return its id.
    pub async fn create_product(&self, admin: &str, name: &str, category: &str) -> String {
        let resp = self
            .post(
                "/api/products",
                Some(admin),
                json!({
                    "name": name,
                    "price": 45.5,
                    "imageUrl": "/images/test.jpg",
                    "category": category,
                    "colors": [
                        { "color": "Black", "quantity": 3 },
                        { "color": "White", "quantity": 4 },
                    ],
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create product failed: {:?}", resp.body);
        resp.body["product"]["_id"].as_str().unwrap().to_owned()
    }
}

/// A valid order body for one unit of `product_id`.
#[must_use]
pub fn order_body(product_id: &str) -> Value {
    json!({
        "items": [{
            "productId": product_id,
            "name": "Test product",
            "price": 45.5,
            "quantity": 2,
            "color": "Black",
        }],
        "shippingAddress": {
            "name": "Saraa",
            "phone": "88001122",
            "street": "Seoul street 5",
            "city": "Ulaanbaatar",
            "zipCode": "14250",
        },
        "totalAmount": 91,
    })
}
