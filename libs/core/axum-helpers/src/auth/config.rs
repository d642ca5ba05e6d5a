//! Configuration types for the authorization gate.
//!
//! Both structs implement `FromEnv` from `core_config`, following the same
//! pattern as `MongoConfig` and `ServerConfig`.

use core_config::{ConfigError, FromEnv, env_or_default, env_required};
use std::fmt;
use std::str::FromStr;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters for security
///
/// ```ignore
/// use axum_helpers::JwtConfig;
/// use core_config::FromEnv;
///
/// let config = JwtConfig::from_env()?;
/// let config = JwtConfig::new("my-super-secret-key-that-is-at-least-32-chars");
/// ```
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret.
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self { secret }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self { secret })
    }
}

/// How the gate treats routes that address a single record by `{id}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Any valid credential passes.
    #[default]
    Presence,
    /// The credential subject must equal the `{id}` path parameter.
    Owner,
}

impl FromStr for OwnershipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(Self::Presence),
            "owner" => Ok(Self::Owner),
            other => Err(format!("expected 'presence' or 'owner', got '{other}'")),
        }
    }
}

impl fmt::Display for OwnershipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence => f.write_str("presence"),
            Self::Owner => f.write_str("owner"),
        }
    }
}

/// Gate configuration: signing secret plus ownership policy.
///
/// - `JWT_SECRET` (required)
/// - `AUTH_OWNERSHIP_POLICY` (`presence` | `owner`, default: `presence`)
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub ownership: OwnershipPolicy,
}

impl AuthConfig {
    pub fn new(jwt: JwtConfig, ownership: OwnershipPolicy) -> Self {
        Self { jwt, ownership }
    }
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig::from_env()?;
        let raw = env_or_default("AUTH_OWNERSHIP_POLICY", "presence");
        let ownership = raw
            .parse::<OwnershipPolicy>()
            .map_err(|details| ConfigError::ParseError {
                key: "AUTH_OWNERSHIP_POLICY".to_string(),
                details,
            })?;

        Ok(Self { jwt, ownership })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_valid() {
        let config = JwtConfig::new(SECRET);
        assert_eq!(config.secret, SECRET);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }

    #[test]
    fn test_ownership_policy_parse() {
        assert_eq!("presence".parse(), Ok(OwnershipPolicy::Presence));
        assert_eq!(" Owner ".parse(), Ok(OwnershipPolicy::Owner));
        assert!("admin".parse::<OwnershipPolicy>().is_err());
    }

    #[test]
    fn test_auth_config_defaults_to_presence() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("AUTH_OWNERSHIP_POLICY", None::<&str>),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.ownership, OwnershipPolicy::Presence);
            },
        );
    }

    #[test]
    fn test_auth_config_owner_policy() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("AUTH_OWNERSHIP_POLICY", Some("owner")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.ownership, OwnershipPolicy::Owner);
            },
        );
    }

    #[test]
    fn test_auth_config_rejects_unknown_policy() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("AUTH_OWNERSHIP_POLICY", Some("everyone")),
            ],
            || {
                let err = AuthConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("AUTH_OWNERSHIP_POLICY"));
            },
        );
    }
}
