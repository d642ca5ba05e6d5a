//! # Axum Helpers
//!
//! A collection of utilities, middleware, and helpers for building Axum web applications.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT credential check and the authorization gate
//! - **[`middleware`]**: Ordered per-route step chains
//! - **[`server`]**: Server setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Structured error responses with error codes
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{CorsConfig, ShutdownCoordinator, create_router, serve_until_shutdown};
//! use tokio::net::TcpListener;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let router = create_router::<ApiDoc>(Router::new(), &CorsConfig::new(["http://localhost:3000"]), "/rest")?;
//! let listener = TcpListener::bind("0.0.0.0:8080").await?;
//! serve_until_shutdown(listener, router, ShutdownCoordinator::default(), Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod http;
pub mod middleware;
pub mod server;

pub use auth::{
    ACCESS_TOKEN_TTL, AuthConfig, AuthError, AuthorizationGate, CredentialVerifier, Identity,
    JwtClaims, JwtConfig, JwtVerifier, OwnershipPolicy,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_router,
    health_router, run_health_checks, serve_until_shutdown, shutdown_signal,
};

pub use http::{CorsConfig, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use middleware::{Chain, Step, run_chain};
