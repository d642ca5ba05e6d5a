use axum_helpers::{AuthConfig, CorsConfig};
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_users::UploadsConfig;
use std::str::FromStr;

pub use core_config::Environment;

/// Backend holding the records, chosen with `DOCUMENT_STORE`
#[derive(Clone, Debug)]
pub enum StoreConfig {
    Mongo(MongoConfig),
    /// Process-local store, lost on exit
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoreKind {
    Mongo,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'mongodb' or 'memory', got '{other}'")),
        }
    }
}

impl FromEnv for StoreConfig {
    /// - DOCUMENT_STORE: `mongodb` (default) or `memory`
    fn from_env() -> Result<Self, ConfigError> {
        let kind = env_or_default("DOCUMENT_STORE", "mongodb")
            .parse::<StoreKind>()
            .map_err(|details| ConfigError::ParseError {
                key: "DOCUMENT_STORE".to_string(),
                details,
            })?;

        match kind {
            StoreKind::Mongo => Ok(Self::Mongo(MongoConfig::from_env()?)),
            StoreKind::Memory => Ok(Self::Memory),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub uploads: UploadsConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            store: StoreConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            uploads: UploadsConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-with-at-least-32-chars";

    #[test]
    fn test_memory_store_needs_no_mongo_settings() {
        temp_env::with_vars(
            [
                ("DOCUMENT_STORE", Some("memory")),
                ("JWT_SECRET", Some(SECRET)),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:3000")),
                ("MONGODB_URL", None),
                ("MONGO_URL", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(matches!(config.store, StoreConfig::Memory));
            },
        );
    }

    #[test]
    fn test_mongo_store_reads_mongo_settings() {
        temp_env::with_vars(
            [
                ("DOCUMENT_STORE", None),
                ("JWT_SECRET", Some(SECRET)),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:3000")),
                ("MONGODB_URL", Some("mongodb://db:27017")),
                ("MONGODB_DATABASE", Some("alpha")),
            ],
            || match Config::from_env().unwrap().store {
                StoreConfig::Mongo(mongo) => assert_eq!(mongo.database(), "alpha"),
                StoreConfig::Memory => panic!("expected mongodb"),
            },
        );
    }

    #[test]
    fn test_unknown_store_is_rejected() {
        temp_env::with_var("DOCUMENT_STORE", Some("postgres"), || {
            assert!(StoreConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        temp_env::with_vars(
            [
                ("DOCUMENT_STORE", Some("memory")),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:3000")),
                ("JWT_SECRET", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
