//! # Resource Servlet
//!
//! Generic CRUD over schemaless records.
//!
//! - **[`descriptor`]** / **[`registry`]**: resource descriptors and their registry
//! - **[`store`]**: the [`DocumentStore`] trait with MongoDB and in-memory backends
//! - **[`translator`]**: storage failures to client-facing [`DomainError`]s
//! - **[`handlers`]**: create, fetch-one, replace, partial-update, delete
//! - **[`routes`]**: binding handlers behind a step chain
//!
//! ```ignore
//! let outcome = handlers::create(store.as_ref(), descriptor.as_ref(), record, None).await?;
//! ```

pub mod descriptor;
pub mod error;
pub mod handlers;
pub mod payload;
pub mod record;
pub mod registry;
pub mod routes;
pub mod store;
pub mod translator;

pub use descriptor::{FieldKind, FieldSpec, ResourceDescriptor};
pub use error::{DomainError, DomainErrorKind, OnFailure, ServletError};
pub use handlers::Outcome;
pub use payload::RecordPayload;
pub use record::Record;
pub use registry::SchemaRegistry;
pub use routes::RouteBinder;
pub use store::{
    DocumentStore, InMemoryDocumentStore, MongoDocumentStore, StoreError, UniqueIndex,
};
pub use translator::translate;
