//! Users Domain
//!
//! The `users` resource on top of the generic resource servlet.
//!
//! # Features
//!
//! - CRUD routes behind the authorization gate
//! - Unique `name` and `email` with user-facing conflict messages
//! - Avatar upload through the [`AvatarStore`] collaborator
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← HTTP endpoints, multipart avatar upload
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Servlet    │  ← generic handlers + translator, `user_failure` callback
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ DocumentStore│  ← MongoDB or in-memory
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{LocalAvatarStore, UserSchema, UsersState, handlers};
//! use resource_servlet::{InMemoryDocumentStore, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new().register(UserSchema);
//! let state = UsersState::new(
//!     &registry,
//!     Arc::new(InMemoryDocumentStore::new()),
//!     Arc::new(LocalAvatarStore::new("uploads")),
//! )?;
//! let router = handlers::router(state, &gated);
//! ```

pub mod avatar;
pub mod error;
pub mod failure;
pub mod handlers;
pub mod schema;

pub use avatar::{
    AvatarStore, LocalAvatarStore, StoredFile, UploadError, UploadedFile, UploadsConfig,
};
pub use error::{UserError, UserResult};
pub use failure::user_failure;
pub use handlers::{ApiDoc, AvatarResponse, UsersState};
pub use schema::{USERS, User, UserSchema};
