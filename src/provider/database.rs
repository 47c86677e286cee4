//! Relational database provider
//!
//! Default provider variant. Selects name the model's exact field list,
//! never `*`, so schema drift shows up as a query error instead of a
//! silently changed row shape. An optional named connection chosen at
//! construction applies to every executed operation.

use std::sync::Arc;

use serde_json::Value;

use crate::database::query::{Id, Operator};
use crate::database::Database;
use crate::error::OrmResult;
use crate::model::Model;
use crate::provider::{Provider, ProviderDelete, ProviderRows, Saved};
use crate::registry::Orm;

/// Provider executing against the relational storage boundary
pub struct DatabaseProvider {
    /// Empty template instance; consulted for metadata, never persisted.
    template: Model,
    database: Arc<Database>,
    connection: Option<String>,
}

impl DatabaseProvider {
    /// Build a provider for the named model on the default connection.
    pub fn new(orm: &Arc<Orm>, model: &str) -> OrmResult<Self> {
        Self::with_connection(orm, model, None)
    }

    /// Build a provider pinned to a named connection.
    pub fn with_connection(
        orm: &Arc<Orm>,
        model: &str,
        connection: Option<String>,
    ) -> OrmResult<Self> {
        Ok(Self {
            template: orm.model(model)?,
            database: orm.database().clone(),
            connection,
        })
    }

    fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    fn id_condition(ids: &[Id]) -> (Operator, Value) {
        if ids.len() == 1 {
            (Operator::Equal, Value::from(ids[0]))
        } else {
            (Operator::In, Value::from(ids.to_vec()))
        }
    }
}

impl Provider for DatabaseProvider {
    fn select(&self, ids: &[Id]) -> OrmResult<ProviderRows> {
        let table = self.template.table();
        let query = self
            .database
            .select(self.template.fields(), table);

        if ids.is_empty() {
            return Ok(ProviderRows::Unbound(query));
        }

        tracing::debug!(table, ids = ids.len(), "selecting rows");
        let (operator, value) = Self::id_condition(ids);
        let result = query
            .filter(self.template.descriptor().primary_key(), operator, value)
            .execute(self.connection())?;
        Ok(ProviderRows::Rows(result.into_rows()))
    }

    fn delete(&self, ids: &[Id]) -> OrmResult<ProviderDelete> {
        let table = self.template.table();
        let query = self.database.delete(table);

        if ids.is_empty() {
            return Ok(ProviderDelete::Unbound(query));
        }

        tracing::debug!(table, ids = ids.len(), "deleting rows");
        let (operator, value) = Self::id_condition(ids);
        let affected = query
            .filter(self.template.descriptor().primary_key(), operator, value)
            .execute(self.connection())?;
        Ok(ProviderDelete::Affected(affected))
    }

    fn save(&self, model: &Model) -> OrmResult<Saved> {
        let table = model.table();
        let primary_key = model.descriptor().primary_key();
        let id = model.primary_id();

        if id == 0 {
            let data = model.as_array(&[]);
            let (columns, values): (Vec<String>, Vec<Value>) = data.into_iter().unzip();
            tracing::debug!(table, "inserting row");
            let insert_id = self
                .database
                .insert(table, columns)
                .values(values)
                .execute(self.connection())?;
            Ok(Saved::Created(insert_id))
        } else {
            tracing::debug!(table, id, "updating row");
            let affected = self
                .database
                .update(table)
                .set(model.as_array(&[]))
                .filter(primary_key, Operator::Equal, Value::from(id))
                .execute(self.connection())?;
            Ok(Saved::Updated(affected))
        }
    }
}
