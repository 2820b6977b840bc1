//! Service banner and health checks.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;
use crate::store::StoreKind;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub status: &'static str,
    pub database: &'static str,
}

/// Service banner.
///
/// GET /
pub async fn banner(State(state): State<AppState>) -> Json<Banner> {
    Json(Banner {
        message: "Anar Shop API",
        status: "running",
        database: match state.store().kind() {
            StoreKind::Mongo => "connected",
            StoreKind::Memory => "in-memory",
        },
    })
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Liveness health check endpoint.
///
/// GET /health
///
/// Does not check dependencies and is exempt from rate limiting.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// Readiness health check endpoint.
///
/// GET /health/ready
///
/// Returns 503 Service Unavailable if the store does not answer a ping.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
