//! Fixed-window rate limiting keyed by client address.
//!
//! Each client gets a window of `max_requests` requests that starts with its
//! first request. Once the window is full further requests are rejected with
//! 429 until it expires. Windows live in a `moka` cache whose TTL equals the
//! window length, so idle clients are evicted without a sweep.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Paths that are never rate limited.
const EXEMPT_PATHS: &[&str] = &["/health"];

/// Key used when neither a forwarded address nor the peer address is known.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug)]
struct Window {
    started: Instant,
    count: AtomicU64,
}

impl Window {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            count: AtomicU64::new(0),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The request may proceed.
    Allowed {
        /// Requests left in the current window.
        remaining: u64,
    },
    /// The window is full.
    Limited {
        /// Time until the window resets.
        retry_after: Duration,
    },
}

/// Per-client fixed-window counters.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Cache<String, Arc<Window>>,
}

impl RateLimiter {
    /// Create a limiter for `config`.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let windows = Cache::builder().time_to_live(config.window).build();
        Self { config, windows }
    }

    /// Count a request from `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str) -> RateDecision {
        let mut window = self
            .windows
            .get_with_by_ref(key, async { Arc::new(Window::new()) })
            .await;

        if window.started.elapsed() >= self.config.window {
            window = Arc::new(Window::new());
            self.windows.insert(key.to_owned(), Arc::clone(&window)).await;
        }

        let max = self.config.max_requests;
        match window
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then_some(count + 1)
            }) {
            Ok(previous) => RateDecision::Allowed {
                remaining: max - previous - 1,
            },
            Err(_) => RateDecision::Limited {
                retry_after: self.config.window.saturating_sub(window.started.elapsed()),
            },
        }
    }

    /// Number of clients with a live window.
    pub async fn tracked_clients(&self) -> u64 {
        self.windows.run_pending_tasks().await;
        self.windows.entry_count()
    }
}

/// The client key for a request: the first `X-Forwarded-For` entry, else the
/// peer address, else `unknown`.
#[must_use]
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

/// Middleware applying the shared [`RateLimiter`] to every non-exempt path.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    match state.rate_limiter().check(&key).await {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
            AppError::RateLimited { retry_after }.into_response()
        }
    }
}
