//! Alpha Auth API
//!
//! Users service: generic resource handlers over a document store, behind an
//! authorization gate.

pub mod api;
pub mod app;
pub mod config;
pub mod openapi;
pub mod state;

pub use app::{Application, RunningApplication};
pub use config::{Config, StoreConfig};
