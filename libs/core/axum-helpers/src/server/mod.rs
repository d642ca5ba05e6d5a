//! Server infrastructure module.
//!
//! This module provides:
//! - Application setup with OpenAPI documentation
//! - Health and readiness endpoints
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{ShutdownCoordinator, create_router, health_router, serve_until_shutdown};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes, &cors, "/rest")?
//!     .merge(health_router(app_info!()));
//!
//! let listener = TcpListener::bind(server_config.address()).await?;
//! serve_until_shutdown(listener, router, ShutdownCoordinator::default(), Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_router, serve_until_shutdown};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
