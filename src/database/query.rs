//! Query handles for the storage boundary
//!
//! Each handle pairs a plain statement (columns, table, conditions) with
//! the owning [`Database`], so `execute` can resolve a named connection
//! and dispatch to the backend. Handles build by value and chain, and an
//! unexecuted handle can be passed around freely: this is the escape
//! hatch services hand out when no ids are given.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::database::Database;
use crate::error::OrmResult;

/// Integer row identity used across the layer
pub type Id = i64;

/// A raw storage row: ordered column name to JSON value mapping
pub type Row = serde_json::Map<String, Value>;

/// Comparison operators accepted by the storage boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    Like,
    In,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equal => write!(f, "="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterThan => write!(f, ">"),
            Operator::LessThan => write!(f, "<"),
            Operator::Like => write!(f, "LIKE"),
            Operator::In => write!(f, "IN"),
        }
    }
}

/// Single where-clause condition
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// Plain select statement data handed to backends
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub columns: Vec<String>,
    pub table: String,
    pub conditions: Vec<Condition>,
}

/// Plain insert statement data handed to backends
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

/// Plain update statement data handed to backends
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    pub table: String,
    pub changes: Row,
    pub conditions: Vec<Condition>,
}

/// Plain delete statement data handed to backends
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    pub table: String,
    pub conditions: Vec<Condition>,
}

/// Rows returned by an executed select
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub(crate) fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Consume the result set as a sequence of row mappings.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Unexecuted select bound to a database
#[derive(Debug, Clone)]
pub struct SelectQuery {
    db: Arc<Database>,
    statement: SelectStatement,
}

impl SelectQuery {
    pub(crate) fn new(db: Arc<Database>, columns: Vec<String>, table: &str) -> Self {
        Self {
            db,
            statement: SelectStatement {
                columns,
                table: table.to_string(),
                conditions: Vec::new(),
            },
        }
    }

    /// Add a condition, consuming and returning the handle.
    pub fn filter(mut self, column: &str, operator: Operator, value: Value) -> Self {
        self.statement.conditions.push(Condition {
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    /// Execute against the named connection, or the default when `None`.
    pub fn execute(self, connection: Option<&str>) -> OrmResult<ResultSet> {
        let backend = self.db.backend(connection)?;
        Ok(ResultSet::new(backend.select(&self.statement)?))
    }
}

/// Unexecuted insert bound to a database
#[derive(Debug, Clone)]
pub struct InsertQuery {
    db: Arc<Database>,
    statement: InsertStatement,
}

impl InsertQuery {
    pub(crate) fn new(db: Arc<Database>, table: &str, columns: Vec<String>) -> Self {
        Self {
            db,
            statement: InsertStatement {
                table: table.to_string(),
                columns,
                values: Vec::new(),
            },
        }
    }

    /// Provide the value list, positionally matching the column list.
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.statement.values = values;
        self
    }

    pub fn statement(&self) -> &InsertStatement {
        &self.statement
    }

    /// Execute and return the generated insert id.
    pub fn execute(self, connection: Option<&str>) -> OrmResult<Id> {
        let backend = self.db.backend(connection)?;
        backend.insert(&self.statement)
    }
}

/// Unexecuted update bound to a database
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    db: Arc<Database>,
    statement: UpdateStatement,
}

impl UpdateQuery {
    pub(crate) fn new(db: Arc<Database>, table: &str) -> Self {
        Self {
            db,
            statement: UpdateStatement {
                table: table.to_string(),
                changes: Row::new(),
                conditions: Vec::new(),
            },
        }
    }

    /// Provide the column to value changes applied by the update.
    pub fn set(mut self, changes: Row) -> Self {
        self.statement.changes = changes;
        self
    }

    pub fn filter(mut self, column: &str, operator: Operator, value: Value) -> Self {
        self.statement.conditions.push(Condition {
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    pub fn statement(&self) -> &UpdateStatement {
        &self.statement
    }

    /// Execute and return the affected-row count.
    pub fn execute(self, connection: Option<&str>) -> OrmResult<u64> {
        let backend = self.db.backend(connection)?;
        backend.update(&self.statement)
    }
}

/// Unexecuted delete bound to a database
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    db: Arc<Database>,
    statement: DeleteStatement,
}

impl DeleteQuery {
    pub(crate) fn new(db: Arc<Database>, table: &str) -> Self {
        Self {
            db,
            statement: DeleteStatement {
                table: table.to_string(),
                conditions: Vec::new(),
            },
        }
    }

    pub fn filter(mut self, column: &str, operator: Operator, value: Value) -> Self {
        self.statement.conditions.push(Condition {
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    pub fn statement(&self) -> &DeleteStatement {
        &self.statement
    }

    /// Execute and return the affected-row count.
    pub fn execute(self, connection: Option<&str>) -> OrmResult<u64> {
        let backend = self.db.backend(connection)?;
        backend.delete(&self.statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_display_matches_sql() {
        assert_eq!(Operator::Equal.to_string(), "=");
        assert_eq!(Operator::In.to_string(), "IN");
        assert_eq!(Operator::Like.to_string(), "LIKE");
    }
}
