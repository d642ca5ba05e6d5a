//! Per-route middleware chains.
//!
//! A [`Chain`] is an ordered list of [`Step`]s run before a handler. Each step
//! may mutate the request (e.g. insert an identity) or short-circuit with a
//! response, in which case later steps and the handler never run.
//!
//! ```ignore
//! use axum::{Router, middleware, routing::post};
//! use axum_helpers::middleware::{Chain, run_chain};
//!
//! let chain = Chain::new().then(gate);
//! let router = Router::new().route(
//!     "/users",
//!     post(create_user).route_layer(middleware::from_fn_with_state(chain, run_chain)),
//! );
//! ```

mod chain;

pub use chain::{Chain, Step, run_chain};
