//! Application state management.
//!
//! The only shared runtime state is the store handle; descriptors in the
//! registry are immutable after startup.

use domain_users::{AvatarStore, UserSchema};
use resource_servlet::{DocumentStore, SchemaRegistry};
use std::sync::Arc;

/// Shared application state.
///
/// Cloned per router (inexpensive Arc clones).
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub registry: SchemaRegistry,
    /// MongoDB or in-memory, pooled internally by the backend
    pub store: Arc<dyn DocumentStore>,
    pub avatars: Arc<dyn AvatarStore>,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        store: Arc<dyn DocumentStore>,
        avatars: Arc<dyn AvatarStore>,
    ) -> Self {
        Self {
            config,
            registry: registry(),
            store,
            avatars,
        }
    }
}

/// Every resource kind served by this app
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new().register(UserSchema)
}
