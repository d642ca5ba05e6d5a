use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, FromEnv, env_required};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allowed browser origins.
///
/// Loaded from `CORS_ALLOWED_ORIGIN` (required, comma-separated):
/// - Development: `CORS_ALLOWED_ORIGIN=http://localhost:3000,http://localhost:5173`
/// - Production: `CORS_ALLOWED_ORIGIN=https://example.com,https://app.example.com`
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the CORS layer.
    ///
    /// - Methods: GET, POST, PUT, DELETE, PATCH, OPTIONS
    /// - Headers: Content-Type, Authorization, Accept, Cookie
    /// - Credentials: Allowed
    /// - Max age: 1 hour
    pub fn layer(&self) -> io::Result<CorsLayer> {
        let allowed_origins = self
            .allowed_origins
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
                )
            })?;

        if allowed_origins.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CORS_ALLOWED_ORIGIN cannot be empty",
            ));
        }

        tracing::info!(
            "CORS configured with allowed origins: {}",
            self.allowed_origins.join(",")
        );

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed_origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                header::COOKIE,
            ])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600)))
    }
}

impl FromEnv for CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_required("CORS_ALLOWED_ORIGIN")?;
        Ok(Self::new(raw.split(',').map(str::trim)))
    }
}
