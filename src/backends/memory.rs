//! In-memory reference backend
//!
//! Tables live in a `RwLock`-guarded map; rows keep insertion order. The
//! `id` column auto-increments on insert when it is absent or null, which
//! mirrors what an autoincrement primary key column does in a relational
//! backend. Intended for tests and small embedded use.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::database::query::{
    Condition, DeleteStatement, Id, InsertStatement, Operator, Row, SelectStatement,
    UpdateStatement,
};
use crate::error::{OrmError, OrmResult};

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: Id,
    rows: Vec<Row>,
}

impl MemoryTable {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

/// In-memory [`DatabaseBackend`](crate::backends::DatabaseBackend)
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in a table.
    pub fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().expect("memory backend lock poisoned");
        tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }
}

fn matches(row: &Row, condition: &Condition) -> bool {
    let actual = row.get(&condition.column).unwrap_or(&Value::Null);
    match condition.operator {
        Operator::Equal => actual == &condition.value,
        Operator::NotEqual => actual != &condition.value,
        Operator::GreaterThan => compare_numbers(actual, &condition.value, |a, b| a > b),
        Operator::LessThan => compare_numbers(actual, &condition.value, |a, b| a < b),
        Operator::Like => match (actual, &condition.value) {
            (Value::String(a), Value::String(pattern)) => like_match(a, pattern),
            _ => false,
        },
        Operator::In => match &condition.value {
            Value::Array(candidates) => candidates.contains(actual),
            other => actual == other,
        },
    }
}

fn compare_numbers(a: &Value, b: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

// Supports only leading/trailing `%` wildcards.
fn like_match(value: &str, pattern: &str) -> bool {
    let stripped = pattern.trim_matches('%');
    match (pattern.starts_with('%'), pattern.ends_with('%')) {
        (true, true) => value.contains(stripped),
        (true, false) => value.ends_with(stripped),
        (false, true) => value.starts_with(stripped),
        (false, false) => value == pattern,
    }
}

fn matches_all(row: &Row, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(row, c))
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() {
        return row.clone();
    }
    let mut projected = Row::new();
    for column in columns {
        projected.insert(
            column.clone(),
            row.get(column).cloned().unwrap_or(Value::Null),
        );
    }
    projected
}

impl super::DatabaseBackend for MemoryBackend {
    fn select(&self, statement: &SelectStatement) -> OrmResult<Vec<Row>> {
        let tables = self.tables.read().expect("memory backend lock poisoned");
        let rows = match tables.get(&statement.table) {
            Some(table) => table
                .rows
                .iter()
                .filter(|row| matches_all(row, &statement.conditions))
                .map(|row| project(row, &statement.columns))
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }

    fn insert(&self, statement: &InsertStatement) -> OrmResult<Id> {
        if statement.columns.len() != statement.values.len() {
            return Err(OrmError::Database(format!(
                "insert into `{}`: {} columns but {} values",
                statement.table,
                statement.columns.len(),
                statement.values.len()
            )));
        }
        let mut tables = self.tables.write().expect("memory backend lock poisoned");
        let table = tables
            .entry(statement.table.clone())
            .or_insert_with(MemoryTable::new);

        let mut row = Row::new();
        for (column, value) in statement.columns.iter().zip(&statement.values) {
            row.insert(column.clone(), value.clone());
        }

        let id = match row.get("id").and_then(Value::as_i64) {
            Some(id) if id > 0 => {
                table.next_id = table.next_id.max(id + 1);
                id
            }
            _ => {
                let id = table.next_id;
                table.next_id += 1;
                row.insert("id".to_string(), Value::from(id));
                id
            }
        };
        table.rows.push(row);
        Ok(id)
    }

    fn update(&self, statement: &UpdateStatement) -> OrmResult<u64> {
        let mut tables = self.tables.write().expect("memory backend lock poisoned");
        let table = match tables.get_mut(&statement.table) {
            Some(table) => table,
            None => return Ok(0),
        };
        let mut affected = 0;
        for row in table
            .rows
            .iter_mut()
            .filter(|row| matches_all(row, &statement.conditions))
        {
            for (column, value) in &statement.changes {
                row.insert(column.clone(), value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    fn delete(&self, statement: &DeleteStatement) -> OrmResult<u64> {
        let mut tables = self.tables.write().expect("memory backend lock poisoned");
        let table = match tables.get_mut(&statement.table) {
            Some(table) => table,
            None => return Ok(0),
        };
        let before = table.rows.len();
        table
            .rows
            .retain(|row| !matches_all(row, &statement.conditions));
        Ok((before - table.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::DatabaseBackend;
    use serde_json::json;

    fn insert_user(backend: &MemoryBackend, name: &str) -> Id {
        backend
            .insert(&InsertStatement {
                table: "users".into(),
                columns: vec!["id".into(), "name".into()],
                values: vec![Value::Null, json!(name)],
            })
            .unwrap()
    }

    fn select_all(backend: &MemoryBackend, conditions: Vec<Condition>) -> Vec<Row> {
        backend
            .select(&SelectStatement {
                columns: vec!["id".into(), "name".into()],
                table: "users".into(),
                conditions,
            })
            .unwrap()
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let backend = MemoryBackend::new();
        assert_eq!(insert_user(&backend, "ada"), 1);
        assert_eq!(insert_user(&backend, "grace"), 2);
        assert_eq!(backend.row_count("users"), 2);
    }

    #[test]
    fn explicit_id_advances_the_sequence() {
        let backend = MemoryBackend::new();
        let id = backend
            .insert(&InsertStatement {
                table: "users".into(),
                columns: vec!["id".into(), "name".into()],
                values: vec![json!(10), json!("ada")],
            })
            .unwrap();
        assert_eq!(id, 10);
        assert_eq!(insert_user(&backend, "grace"), 11);
    }

    #[test]
    fn select_projects_and_filters() {
        let backend = MemoryBackend::new();
        insert_user(&backend, "ada");
        insert_user(&backend, "grace");

        let rows = select_all(
            &backend,
            vec![Condition {
                column: "id".into(),
                operator: Operator::In,
                value: json!([1, 2]),
            }],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), ["id", "name"]);

        let rows = select_all(
            &backend,
            vec![Condition {
                column: "name".into(),
                operator: Operator::Equal,
                value: json!("grace"),
            }],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(2));
    }

    #[test]
    fn select_on_missing_table_is_empty() {
        let backend = MemoryBackend::new();
        assert!(select_all(&backend, Vec::new()).is_empty());
    }

    #[test]
    fn update_counts_affected_rows() {
        let backend = MemoryBackend::new();
        insert_user(&backend, "ada");
        insert_user(&backend, "grace");

        let mut changes = Row::new();
        changes.insert("name".into(), json!("lovelace"));
        let affected = backend
            .update(&UpdateStatement {
                table: "users".into(),
                changes,
                conditions: vec![Condition {
                    column: "id".into(),
                    operator: Operator::Equal,
                    value: json!(1),
                }],
            })
            .unwrap();
        assert_eq!(affected, 1);

        let rows = select_all(&backend, Vec::new());
        assert_eq!(rows[0]["name"], json!("lovelace"));
        assert_eq!(rows[1]["name"], json!("grace"));
    }

    #[test]
    fn delete_removes_matching_rows() {
        let backend = MemoryBackend::new();
        insert_user(&backend, "ada");
        insert_user(&backend, "grace");

        let affected = backend
            .delete(&DeleteStatement {
                table: "users".into(),
                conditions: vec![Condition {
                    column: "id".into(),
                    operator: Operator::In,
                    value: json!([1, 2]),
                }],
            })
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(backend.row_count("users"), 0);
    }

    #[test]
    fn like_supports_edge_wildcards() {
        assert!(like_match("ada lovelace", "%love%"));
        assert!(like_match("ada lovelace", "ada%"));
        assert!(like_match("ada lovelace", "%lace"));
        assert!(!like_match("ada lovelace", "grace%"));
    }
}
