//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (origin allow-list)
//! 5. Body limit (10 MB)
//! 6. Rate limiting (fixed window per client)

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAdmin, RequireAuth, bearer_token};
pub use cors::cors_layer;
pub use rate_limit::{RateDecision, RateLimiter, client_key, rate_limit_middleware};
pub use request_id::request_id_middleware;
