//! Application lifecycle.
//!
//! [`Application::build`] opens the store and prepares indexes,
//! [`Application::router`] exposes the full router for embedding, and
//! [`Application::start`] serves it until [`RunningApplication::stop`] or
//! SIGINT/SIGTERM.

use axum::Router;
use axum_helpers::{
    CredentialVerifier, JwtVerifier, ShutdownCoordinator, create_router, health_router,
    serve_until_shutdown,
};
use domain_users::LocalAvatarStore;
use eyre::WrapErr;
use resource_servlet::{DocumentStore, InMemoryDocumentStore, MongoDocumentStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{Config, StoreConfig};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::api;

/// Time allowed for cleanup once shutdown begins
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix of every resource route
pub const BASE_PATH: &str = "/rest";

pub struct Application {
    state: AppState,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Application {
    /// Connect the configured store and create unique indexes.
    pub async fn build(config: Config) -> eyre::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.store {
            StoreConfig::Mongo(mongo) => {
                info!("Connecting to MongoDB at {}", mongo.url());
                let store = MongoDocumentStore::connect(mongo)
                    .await
                    .wrap_err("failed to connect to MongoDB")?;
                info!("Successfully connected to MongoDB database: {}", mongo.database());
                Arc::new(store)
            }
            StoreConfig::Memory => {
                tracing::warn!("Using the in-memory document store; records are lost on exit");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Self::with_store(config, store).await
    }

    /// Build around an existing store.
    pub async fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> eyre::Result<Self> {
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtVerifier::new(&config.auth.jwt));
        let avatars = Arc::new(LocalAvatarStore::from_config(&config.uploads));
        let state = AppState::new(config, store, avatars);

        state
            .registry
            .ensure_indexes(state.store.as_ref())
            .await
            .wrap_err("failed to create unique indexes")?;

        Ok(Self { state, verifier })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Full router: `/rest` resources, docs, `/health`, `/ready` and the JSON 404.
    pub fn router(&self) -> eyre::Result<Router> {
        let gated = api::gated_chain(&self.state, self.verifier.clone());
        let resources = api::routes(&self.state, &gated)?;

        let router = create_router::<ApiDoc>(resources, &self.state.config.cors, BASE_PATH)?
            .merge(health_router(self.state.config.app.clone()))
            .merge(api::health::router(self.state.clone()));
        Ok(router)
    }

    /// Bind the configured address and serve in the background.
    pub async fn start(self) -> eyre::Result<RunningApplication> {
        let router = self.router()?;
        let address = self.state.config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .wrap_err_with(|| format!("failed to bind {address}"))?;
        let local_addr = listener.local_addr()?;

        let coordinator = ShutdownCoordinator::default();
        let store = self.state.store.clone();
        let cleanup = async move {
            info!("Shutting down: releasing the document store");
            drop(store);
        };

        let handle = tokio::spawn(serve_until_shutdown(
            listener,
            router,
            coordinator.clone(),
            SHUTDOWN_TIMEOUT,
            cleanup,
        ));

        info!(%local_addr, app = self.state.config.app.name, "Application started");
        Ok(RunningApplication {
            local_addr,
            coordinator,
            handle,
        })
    }
}

/// Handle to a serving application.
pub struct RunningApplication {
    local_addr: SocketAddr,
    coordinator: ShutdownCoordinator,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningApplication {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Begin graceful shutdown. Idempotent.
    pub fn stop(&self) {
        self.coordinator.shutdown();
    }

    /// Wait until the server has drained and cleanup has run.
    pub async fn wait(self) -> eyre::Result<()> {
        self.handle
            .await
            .wrap_err("server task panicked")?
            .wrap_err("server error")?;
        info!("Application stopped");
        Ok(())
    }
}
