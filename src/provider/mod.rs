//! Storage providers
//!
//! A provider executes one concrete storage operation for one model
//! type, using a template instance of that model for table and field
//! metadata. Providers are registered by name on the
//! [`Orm`](crate::registry::Orm) registry; `"database"` is the default.

pub mod database;

use crate::database::query::{DeleteQuery, Id, Row, SelectQuery};
use crate::error::OrmResult;
use crate::model::Model;

pub use database::DatabaseProvider;

/// Outcome of a provider select
pub enum ProviderRows {
    /// No ids were given; the caller gets the unexecuted query to
    /// compose further conditions on.
    Unbound(SelectQuery),
    /// Executed result rows.
    Rows(Vec<Row>),
}

/// Outcome of a provider delete
pub enum ProviderDelete {
    /// No ids were given; unexecuted delete handle.
    Unbound(DeleteQuery),
    /// Affected-row count of the executed delete.
    Affected(u64),
}

/// Outcome of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    /// Row was inserted; carries the generated id.
    Created(Id),
    /// Row was updated; carries the affected-row count.
    Updated(u64),
}

/// Contract every storage provider implements
pub trait Provider: Send + Sync {
    /// Select rows for the given ids, or hand back the unexecuted query
    /// when the id list is empty.
    fn select(&self, ids: &[Id]) -> OrmResult<ProviderRows>;

    /// Delete rows for the given ids, or hand back the unexecuted query
    /// when the id list is empty.
    fn delete(&self, ids: &[Id]) -> OrmResult<ProviderDelete>;

    /// Insert or update one model record.
    fn save(&self, model: &Model) -> OrmResult<Saved>;
}
