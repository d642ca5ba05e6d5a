use alpha_auth_api::{Config, StoreConfig};
use axum_helpers::{AuthConfig, CorsConfig, JwtConfig, JwtVerifier, OwnershipPolicy};
use core_config::{Environment, app_info, server::ServerConfig};
use domain_users::UploadsConfig;

pub const SECRET: &str = "alpha-auth-test-secret-at-least-32-chars";

pub fn config() -> Config {
    Config {
        app: app_info!(),
        environment: Environment::Development,
        server: ServerConfig::ephemeral(),
        store: StoreConfig::Memory,
        auth: AuthConfig::new(JwtConfig::new(SECRET), OwnershipPolicy::Presence),
        cors: CorsConfig::new(["http://localhost:3000"]),
        uploads: UploadsConfig {
            dir: std::env::temp_dir().join("alpha-auth-test-uploads"),
        },
    }
}

pub fn token(subject: &str) -> String {
    JwtVerifier::new(&JwtConfig::new(SECRET))
        .create_access_token(subject, None)
        .unwrap()
}
