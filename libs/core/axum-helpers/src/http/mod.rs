//! HTTP middleware module.
//!
//! This module provides HTTP-level middleware for:
//! - CORS configuration
//! - Security headers
//!
//! ```ignore
//! use axum_helpers::http::{CorsConfig, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(CorsConfig::new(["http://localhost:3000"]).layer()?);
//! ```

pub mod cors;
pub mod security;

pub use cors::CorsConfig;
pub use security::security_headers;
