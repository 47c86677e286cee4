//! Database backend abstraction
//!
//! Backends execute the plain statements produced by the query handles.
//! The trait is synchronous: every call blocks until the storage round
//! trip completes, and cancellation or timeout behavior is whatever the
//! concrete backend provides.

pub mod memory;

use crate::database::query::{
    DeleteStatement, Id, InsertStatement, Row, SelectStatement, UpdateStatement,
};
use crate::error::OrmResult;

pub use memory::MemoryBackend;

/// Storage backend contract
pub trait DatabaseBackend: Send + Sync {
    /// Execute a select and return the matching rows.
    fn select(&self, statement: &SelectStatement) -> OrmResult<Vec<Row>>;

    /// Execute an insert and return the generated row id.
    fn insert(&self, statement: &InsertStatement) -> OrmResult<Id>;

    /// Execute an update and return the affected-row count.
    fn update(&self, statement: &UpdateStatement) -> OrmResult<u64>;

    /// Execute a delete and return the affected-row count.
    fn delete(&self, statement: &DeleteStatement) -> OrmResult<u64>;
}
