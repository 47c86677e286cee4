//! # activerow: model / service / provider mapping layer
//!
//! Active-record style object-relational mapping with three cooperating
//! layers: self-describing [`Model`]s own a field registry and per-field
//! accessors; a [`Service`] per model resolves heterogeneous id inputs
//! and converts rows back into models; [`Provider`]s execute the
//! concrete storage operations against an opaque [`Database`] boundary.
//! Wiring is explicit: an [`Orm`] registry built once at process start
//! maps short names to descriptors, extensions and provider factories.

pub mod backends;
pub mod database;
pub mod error;
pub mod inflect;
pub mod model;
pub mod provider;
pub mod registry;
pub mod service;


pub use backends::{DatabaseBackend, MemoryBackend};
pub use database::{
    Condition, Database, DatabaseBuilder, DatabaseConfig, DeleteQuery, Id, InsertQuery, Operator,
    ResultSet, Row, SelectQuery, UpdateQuery, DEFAULT_CONNECTION,
};
pub use error::{OrmError, OrmResult};
pub use model::{
    FieldDescriptor, FieldKind, Model, ModelDescriptor, ModelDescriptorBuilder,
    DEFAULT_PRIMARY_KEY, RESERVED_FIELDS,
};
pub use provider::{DatabaseProvider, Provider, ProviderDelete, ProviderRows, Saved};
pub use registry::{Orm, OrmBuilder, ProviderFactory};
pub use service::{
    Deletion, IdSpec, RowSelection, Selection, Service, ServiceExtension, DEFAULT_PROVIDER,
};
