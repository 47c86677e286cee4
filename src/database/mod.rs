//! Opaque storage collaborator
//!
//! [`Database`] is the boundary the rest of the layer talks to: it owns a
//! set of named connections (each a [`DatabaseBackend`] trait object) and
//! hands out unexecuted query handles for select, insert, update and
//! delete. Everything above this module is backend-agnostic.

pub mod query;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::DatabaseBackend;
use crate::error::{OrmError, OrmResult};

pub use query::{
    Condition, DeleteQuery, DeleteStatement, Id, InsertQuery, InsertStatement, Operator, ResultSet,
    Row, SelectQuery, SelectStatement, UpdateQuery, UpdateStatement,
};

/// Name of the connection used when none is requested
pub const DEFAULT_CONNECTION: &str = "default";

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection consulted when an operation names no connection
    pub default_connection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            default_connection: DEFAULT_CONNECTION.to_string(),
        }
    }
}

/// Named-connection registry and query entry point
pub struct Database {
    connections: HashMap<String, Arc<dyn DatabaseBackend>>,
    default_connection: String,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Database")
            .field("connections", &names)
            .field("default_connection", &self.default_connection)
            .finish()
    }
}

impl Database {
    /// Single-connection database registered under the default name.
    pub fn single(backend: Arc<dyn DatabaseBackend>) -> Arc<Self> {
        Arc::new(Self {
            connections: HashMap::from([(DEFAULT_CONNECTION.to_string(), backend)]),
            default_connection: DEFAULT_CONNECTION.to_string(),
        })
    }

    /// Start building a multi-connection database.
    pub fn builder(config: DatabaseConfig) -> DatabaseBuilder {
        DatabaseBuilder {
            config,
            connections: HashMap::new(),
        }
    }

    /// Resolve a connection name to its backend.
    pub(crate) fn backend(&self, name: Option<&str>) -> OrmResult<&Arc<dyn DatabaseBackend>> {
        let name = name.unwrap_or(&self.default_connection);
        self.connections
            .get(name)
            .ok_or_else(|| OrmError::Connection(name.to_string()))
    }

    /// Begin a select of the given columns from a table.
    pub fn select(self: &Arc<Self>, columns: Vec<String>, table: &str) -> SelectQuery {
        SelectQuery::new(self.clone(), columns, table)
    }

    /// Begin an insert into a table with the given column list.
    pub fn insert(self: &Arc<Self>, table: &str, columns: Vec<String>) -> InsertQuery {
        InsertQuery::new(self.clone(), table, columns)
    }

    /// Begin an update of a table.
    pub fn update(self: &Arc<Self>, table: &str) -> UpdateQuery {
        UpdateQuery::new(self.clone(), table)
    }

    /// Begin a delete from a table.
    pub fn delete(self: &Arc<Self>, table: &str) -> DeleteQuery {
        DeleteQuery::new(self.clone(), table)
    }
}

/// Builder for a [`Database`] with named connections
pub struct DatabaseBuilder {
    config: DatabaseConfig,
    connections: HashMap<String, Arc<dyn DatabaseBackend>>,
}

impl DatabaseBuilder {
    /// Register a backend under a connection name.
    pub fn connection(mut self, name: &str, backend: Arc<dyn DatabaseBackend>) -> Self {
        self.connections.insert(name.to_string(), backend);
        self
    }

    /// Finish building; the configured default connection must exist.
    pub fn build(self) -> OrmResult<Arc<Database>> {
        if !self.connections.contains_key(&self.config.default_connection) {
            return Err(OrmError::Connection(self.config.default_connection));
        }
        tracing::debug!(
            connections = self.connections.len(),
            default = %self.config.default_connection,
            "database connections configured"
        );
        Ok(Arc::new(Database {
            connections: self.connections,
            default_connection: self.config.default_connection,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;

    #[test]
    fn unknown_connection_is_an_error() {
        let db = Database::single(Arc::new(MemoryBackend::new()));
        let result = db
            .select(vec!["id".into()], "users")
            .execute(Some("replica"));
        assert!(matches!(result, Err(OrmError::Connection(name)) if name == "replica"));
    }

    #[test]
    fn builder_rejects_missing_default() {
        let result = Database::builder(DatabaseConfig {
            default_connection: "primary".into(),
        })
        .connection("replica", Arc::new(MemoryBackend::new()))
        .build();
        assert!(matches!(result, Err(OrmError::Connection(name)) if name == "primary"));
    }

    #[test]
    fn named_connections_resolve_independently() {
        let db = Database::builder(DatabaseConfig::default())
            .connection(DEFAULT_CONNECTION, Arc::new(MemoryBackend::new()))
            .connection("replica", Arc::new(MemoryBackend::new()))
            .build()
            .unwrap();
        assert!(db
            .select(vec!["id".into()], "users")
            .execute(Some("replica"))
            .unwrap()
            .is_empty());
    }
}
