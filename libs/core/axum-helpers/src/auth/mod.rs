//! Authentication and authorization module.
//!
//! This module provides:
//! - Stateless JWT verification (HS256) behind the [`CredentialVerifier`] trait
//! - The [`AuthorizationGate`] chain step with a configurable ownership policy
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum_helpers::auth::{AuthConfig, AuthorizationGate, JwtVerifier};
//! use axum_helpers::middleware::Chain;
//! use core_config::FromEnv;
//!
//! let config = AuthConfig::from_env()?;
//! let verifier = Arc::new(JwtVerifier::new(&config.jwt));
//! let chain = Chain::new().then(AuthorizationGate::new(verifier, config.ownership));
//! ```

pub mod config;
pub mod gate;
pub mod jwt;

pub use config::{AuthConfig, JwtConfig, OwnershipPolicy};
pub use gate::{AuthorizationGate, OWNER_PATH_PARAM, extract_token_from_request};
pub use jwt::{ACCESS_TOKEN_TTL, AuthError, CredentialVerifier, Identity, JwtClaims, JwtVerifier};
