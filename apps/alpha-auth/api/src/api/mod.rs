//! API routes module

pub mod health;

use axum::Router;
use axum_helpers::{AuthorizationGate, Chain, CredentialVerifier};
use domain_users::UsersState;
use std::sync::Arc;

use crate::state::AppState;

/// Steps every resource route runs before its handler
pub fn gated_chain(state: &AppState, verifier: Arc<dyn CredentialVerifier>) -> Chain {
    Chain::new().then(AuthorizationGate::new(
        verifier,
        state.config.auth.ownership,
    ))
}

/// Create all resource routes.
/// Note: These are nested under /rest by axum_helpers::create_router
pub fn routes(state: &AppState, gated: &Chain) -> eyre::Result<Router> {
    let users = UsersState::new(&state.registry, state.store.clone(), state.avatars.clone())?;
    Ok(Router::new().merge(domain_users::handlers::router(users, gated)))
}
