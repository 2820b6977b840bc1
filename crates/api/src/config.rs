//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the server starts with an in-memory store when
//! no database is configured.
//!
//! - `MONGODB_URI` - `MongoDB` connection string
//! - `MONGODB_DATABASE` - Database name when the URI has none (default: anar-shop)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 4000)
//! - `APP_ENV` - `production` or `development` (default: development)
//! - `RENDER`, `VERCEL`, `RENDER_SERVICE_NAME` - Hosting markers that imply production
//! - `FRONTEND_URL` - Comma-separated extra CORS origins
//! - `RATE_LIMIT_MAX_REQUESTS` - Requests per window per client
//!   (default: 100 in production, 1000 otherwise)
//! - `RATE_LIMIT_WINDOW_SECS` - Rate limit window length (default: 900)
//! - `SESSION_TTL_DAYS` - Bearer token lifetime (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Origins the storefront is deployed on.
pub const DEFAULT_ORIGINS: &[&str] = &[
    "https://anar-gamma.vercel.app",
    "https://anar-shop.vercel.app",
    "https://anar-shop-git-main.vercel.app",
];

/// Local frontend dev servers.
pub const DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];

const DEFAULT_DATABASE: &str = "anar-shop";
const DEFAULT_WINDOW_SECS: u64 = 15 * 60;
const PRODUCTION_MAX_REQUESTS: u64 = 100;
const DEVELOPMENT_MAX_REQUESTS: u64 = 1000;
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    /// Resolve the environment from `APP_ENV` and the hosting markers.
    ///
    /// Any hosting marker forces production, whatever `APP_ENV` says.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `APP_ENV` is not a known value.
    pub fn detect(
        app_env: Option<&str>,
        render: Option<&str>,
        vercel: Option<&str>,
        render_service_name: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let hosted = render == Some("true") || vercel == Some("1") || render_service_name.is_some();
        if hosted {
            return Ok(Self::Production);
        }
        app_env.map_or(Ok(Self::Development), str::parse)
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Lowercase name, as used for `APP_ENV`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvVar(
                "APP_ENV".to_string(),
                format!("unknown environment `{other}`"),
            )),
        }
    }
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: Vec<String>,
    allow_any: bool,
}

impl CorsPolicy {
    /// Build the allow-list.
    ///
    /// With `FRONTEND_URL` set, its entries are added to the deployed
    /// origins. Without it, production falls back to the deployed origins and
    /// also lets unknown origins through, while development allows only the
    /// local dev servers.
    #[must_use]
    pub fn resolve(environment: AppEnvironment, frontend_url: Option<&str>) -> Self {
        let frontend_url = frontend_url.filter(|v| !v.trim().is_empty());

        let (origins, allow_any) = match (frontend_url, environment) {
            (Some(urls), _) => {
                let mut origins: Vec<String> =
                    DEFAULT_ORIGINS.iter().map(|&o| o.to_owned()).collect();
                for url in urls.split(',').map(str::trim).filter(|u| !u.is_empty()) {
                    if !origins.iter().any(|o| o == url) {
                        origins.push(url.to_owned());
                    }
                }
                (origins, false)
            }
            (None, AppEnvironment::Production) => {
                tracing::warn!(
                    "FRONTEND_URL not set in production, falling back to default origins"
                );
                (DEFAULT_ORIGINS.iter().map(|&o| o.to_owned()).collect(), true)
            }
            (None, AppEnvironment::Development) => (
                DEVELOPMENT_ORIGINS.iter().map(|&o| o.to_owned()).collect(),
                false,
            ),
        };

        Self { origins, allow_any }
    }

    /// The explicitly listed origins.
    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Decide whether a request from `origin` may proceed.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        if origin.contains("vercel.app") || origin.contains("vercel.com") {
            return true;
        }
        if self.origins.iter().any(|o| o == origin) {
            return true;
        }
        if self.allow_any {
            tracing::warn!(origin, "allowing unlisted origin because FRONTEND_URL is not set");
            return true;
        }
        tracing::warn!(origin, allowed = ?self.origins, "CORS blocked origin");
        false
    }
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client.
    pub max_requests: u64,
    /// Window length.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Defaults for an environment: 100 requests per 15 minutes in
    /// production, 1000 otherwise.
    #[must_use]
    pub const fn for_environment(environment: AppEnvironment) -> Self {
        Self {
            max_requests: if environment.is_production() {
                PRODUCTION_MAX_REQUESTS
            } else {
                DEVELOPMENT_MAX_REQUESTS
            },
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `MongoDB` connection string (may contain credentials)
    pub mongodb_uri: Option<SecretString>,
    /// Database used when the URI does not name one
    pub mongodb_database: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: AppEnvironment,
    /// CORS allow-list
    pub cors: CorsPolicy,
    /// Rate limiting
    pub rate_limit: RateLimitConfig,
    /// Bearer token lifetime
    pub session_ttl: chrono::TimeDelta,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Local development settings with no database configured.
    #[must_use]
    pub fn development() -> Self {
        let environment = AppEnvironment::Development;
        Self {
            mongodb_uri: None,
            mongodb_database: DEFAULT_DATABASE.to_owned(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            environment,
            cors: CorsPolicy::resolve(environment, None),
            rate_limit: RateLimitConfig::for_environment(environment),
            session_ttl: chrono::TimeDelta::days(DEFAULT_SESSION_TTL_DAYS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = AppEnvironment::detect(
            get_optional_env("APP_ENV").as_deref(),
            get_optional_env("RENDER").as_deref(),
            get_optional_env("VERCEL").as_deref(),
            get_optional_env("RENDER_SERVICE_NAME").as_deref(),
        )?;

        let defaults = RateLimitConfig::for_environment(environment);
        let rate_limit = RateLimitConfig {
            max_requests: parse_env_or("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?,
            window: Duration::from_secs(parse_env_or(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
        };
        if rate_limit.max_requests == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RATE_LIMIT_MAX_REQUESTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if rate_limit.window.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "RATE_LIMIT_WINDOW_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let session_days: i64 = parse_env_or("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)?;
        let session_ttl = chrono::TimeDelta::try_days(session_days)
            .filter(|ttl| *ttl > chrono::TimeDelta::zero())
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "SESSION_TTL_DAYS".to_string(),
                    "must be a positive number of days".to_string(),
                )
            })?;

        Ok(Self {
            mongodb_uri: get_optional_env("MONGODB_URI").map(SecretString::from),
            mongodb_database: get_env_or_default("MONGODB_DATABASE", DEFAULT_DATABASE),
            host: parse_env_or("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_env_or("PORT", 4000)?,
            environment,
            cors: CorsPolicy::resolve(environment, get_optional_env("FRONTEND_URL").as_deref()),
            rate_limit,
            session_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        let env = AppEnvironment::detect(None, None, None, None).ok();
        assert_eq!(env, Some(AppEnvironment::Development));
    }

    #[test]
    fn test_hosting_markers_imply_production() {
        let cases = [
            (Some("true"), None, None),
            (None, Some("1"), None),
            (None, None, Some("anar-api")),
        ];
        for (render, vercel, service) in cases {
            let env = AppEnvironment::detect(Some("development"), render, vercel, service).ok();
            assert_eq!(env, Some(AppEnvironment::Production));
        }
        // RENDER must be exactly "true"
        let env = AppEnvironment::detect(None, Some("false"), None, None).ok();
        assert_eq!(env, Some(AppEnvironment::Development));
    }

    #[test]
    fn test_unknown_app_env_is_rejected() {
        let result = AppEnvironment::detect(Some("staging"), None, None, None);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_cors_frontend_url_extends_defaults() {
        let policy = CorsPolicy::resolve(
            AppEnvironment::Production,
            Some(" https://shop.example.mn , https://anar-shop.vercel.app,"),
        );
        assert_eq!(policy.origins().len(), DEFAULT_ORIGINS.len() + 1);
        assert!(policy.is_allowed("https://shop.example.mn"));
        assert!(!policy.is_allowed("https://evil.example.com"));
    }

    #[test]
    fn test_cors_development_without_frontend_url() {
        let policy = CorsPolicy::resolve(AppEnvironment::Development, None);
        assert!(policy.is_allowed("http://localhost:3000"));
        assert!(policy.is_allowed("http://localhost:3001"));
        assert!(!policy.is_allowed("http://localhost:8080"));
        assert!(!policy.is_allowed("https://anar-shop.example.com"));
    }

    #[test]
    fn test_cors_production_without_frontend_url_allows_any() {
        let policy = CorsPolicy::resolve(AppEnvironment::Production, None);
        assert_eq!(policy.origins().len(), DEFAULT_ORIGINS.len());
        assert!(policy.is_allowed("https://anything.example.com"));
    }

    #[test]
    fn test_cors_vercel_previews_always_pass() {
        let policy = CorsPolicy::resolve(AppEnvironment::Development, None);
        assert!(policy.is_allowed("https://anar-shop-pr-12.vercel.app"));
        assert!(policy.is_allowed("https://preview.vercel.com"));
    }

    #[test]
    fn test_rate_limit_defaults() {
        let prod = RateLimitConfig::for_environment(AppEnvironment::Production);
        assert_eq!(prod.max_requests, 100);
        assert_eq!(prod.window, Duration::from_secs(900));

        let dev = RateLimitConfig::for_environment(AppEnvironment::Development);
        assert_eq!(dev.max_requests, 1000);
    }

    #[test]
    fn test_development_config() {
        let config = ApiConfig::development();
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.socket_addr().port(), 4000);
        assert_eq!(config.session_ttl, chrono::TimeDelta::days(30));
    }
}
