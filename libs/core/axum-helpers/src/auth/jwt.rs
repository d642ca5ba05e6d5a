use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Access token time-to-live (15 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
    pub jti: String,
}

/// The caller a verified credential belongs to.
///
/// Inserted into request extensions by the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub name: Option<String>,
}

impl From<JwtClaims> for Identity {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: claims.sub,
            name: claims.name,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidCredential(#[source] jsonwebtoken::errors::Error),

    #[error("Token subject does not own this resource")]
    NotOwner,

    #[error("Failed to issue token: {0}")]
    Issue(#[source] jsonwebtoken::errors::Error),
}

/// Checks a raw credential and resolves the caller.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Stateless HS256 JWT verifier.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!("JWT verifier initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Create an access token (15 min) for `subject`
    pub fn create_access_token(
        &self,
        subject: &str,
        name: Option<&str>,
    ) -> Result<String, AuthError> {
        self.create_token(subject, name, ACCESS_TOKEN_TTL)
    }

    /// Create JWT token with specified TTL
    pub fn create_token(
        &self,
        subject: &str,
        name: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.to_string(),
            name: name.map(str::to_string),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Issue)
    }
}

impl CredentialVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(AuthError::InvalidCredential)?;

        Ok(token_data.claims.into())
    }
}
