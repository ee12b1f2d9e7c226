//! Server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderValue;
use jsonwebtoken::Algorithm;

/// Path of the JWKS document below the platform base URL.
const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log line format.
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Which repository implementation backs the API.
    pub store_backend: StoreBackend,
    /// Bearer token verification settings.
    pub auth: AuthConfig,
}

/// Settings for verifying bearer tokens against the identity provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// URL of the provider's JSON Web Key Set.
    pub jwks_url: String,
    /// Required `aud` claim.
    pub audience: String,
    /// Signature algorithms tokens may use.
    pub algorithms: Vec<Algorithm>,
    /// Minimum time between JWKS refetches triggered by unknown key ids.
    pub refresh_cooldown: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL, configured through `DATABASE_URL`.
    Postgres,
    /// Process-local storage; data is lost on restart.
    Memory,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`: Platform base URL (unless `JWKS_URL` is given)
    ///
    /// Optional:
    /// - `JWKS_URL`: Explicit JWKS endpoint
    /// - `JWT_AUDIENCE`: Expected audience (default: "authenticated")
    /// - `JWT_ALGORITHMS`: Accepted algorithms (default: "RS256,ES256")
    /// - `JWKS_REFRESH_COOLDOWN_SECS`: Refetch throttle (default: 10)
    /// - `PORT`: Server port (default: 8000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "text" or "json" (default: "text")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `STORE_BACKEND`: "postgres" or "memory" (default: "postgres")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwks_url = match lookup("JWKS_URL") {
            Some(url) => url,
            None => {
                let base = lookup("SUPABASE_URL")
                    .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_URL".to_string()))?;
                format!("{}{}", base.trim_end_matches('/'), JWKS_PATH)
            }
        };

        let audience = lookup("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string());

        let algorithms = parse_algorithms(
            &lookup("JWT_ALGORITHMS").unwrap_or_else(|| "RS256,ES256".to_string()),
        )?;

        let refresh_cooldown = Duration::from_secs(parse_or(
            &lookup,
            "JWKS_REFRESH_COOLDOWN_SECS",
            10u64,
        )?);

        let port = parse_or(&lookup, "PORT", 8000u16)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected \"text\" or \"json\", got {:?}", other),
                });
            }
        };

        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string());
        validate_origins(&cors_allowed_origins)?;

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "STORE_BACKEND".to_string(),
                    reason: format!("expected \"postgres\" or \"memory\", got {:?}", other),
                });
            }
        };

        Ok(Self {
            port,
            log_level,
            log_format,
            cors_allowed_origins,
            store_backend,
            auth: AuthConfig {
                jwks_url,
                audience,
                algorithms,
                refresh_cooldown,
            },
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Parsed CORS origins, or `None` when every origin is allowed.
    pub fn cors_origins(&self) -> Option<Vec<HeaderValue>> {
        if self.cors_allowed_origins.trim() == "*" {
            return None;
        }
        Some(
            self.cors_allowed_origins
                .split(',')
                .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
                .collect(),
        )
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("cannot parse {:?}", raw),
        }),
        None => Ok(default),
    }
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        name: "JWT_ALGORITHMS".to_string(),
        reason,
    };

    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let alg = Algorithm::from_str(name)
            .map_err(|_| invalid(format!("unknown algorithm {:?}", name)))?;
        if matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(invalid(format!(
                "{:?} is symmetric; only public-key algorithms are accepted",
                alg
            )));
        }
        algorithms.push(alg);
    }

    if algorithms.is_empty() {
        return Err(invalid("at least one algorithm is required".to_string()));
    }
    Ok(algorithms)
}

fn validate_origins(raw: &str) -> Result<(), ConfigError> {
    if raw.trim() == "*" {
        return Ok(());
    }
    for origin in raw.split(',').map(str::trim) {
        if origin.is_empty() || HeaderValue::from_str(origin).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin {:?}", origin),
            });
        }
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
