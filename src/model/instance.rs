//! Model instances
//!
//! An instance is a descriptor handle plus one value per registered
//! field, a `loaded` flag, and a lazily-resolved service. Values are only
//! touched through the field accessors; hydration goes through
//! [`Model::set_all`].

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::database::query::{Id, Row};
use crate::error::{OrmError, OrmResult};
use crate::model::descriptor::ModelDescriptor;
use crate::provider::Saved;
use crate::registry::Orm;
use crate::service::{Deletion, IdSpec, Service};

/// One record of a model type
#[derive(Clone)]
pub struct Model {
    orm: Arc<Orm>,
    descriptor: Arc<ModelDescriptor>,
    values: Vec<Value>,
    loaded: bool,
    service: OnceCell<Arc<Service>>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("model", &self.descriptor.name())
            .field("loaded", &self.loaded)
            .field("values", &self.as_array(&[]))
            .finish()
    }
}

impl Model {
    pub(crate) fn new(orm: Arc<Orm>, descriptor: Arc<ModelDescriptor>) -> Self {
        let values = descriptor
            .fields()
            .iter()
            .map(|f| f.default_value().clone())
            .collect();
        Self {
            orm,
            descriptor,
            values,
            loaded: false,
            service: OnceCell::new(),
        }
    }

    /// Model short name.
    pub fn model_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Storage relation this model maps to.
    pub fn table(&self) -> &str {
        self.descriptor.table()
    }

    /// Shared field registry.
    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> Vec<String> {
        self.descriptor.field_names()
    }

    /// Whether this instance has been populated from a storage row.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Primary-key value coerced to an integer; 0 when unset or
    /// non-numeric.
    pub fn primary_id(&self) -> Id {
        self.descriptor
            .index_of(self.descriptor.primary_key())
            .and_then(|i| self.values[i].as_i64())
            .unwrap_or(0)
    }

    /// Read one field.
    pub fn get(&self, field: &str) -> OrmResult<&Value> {
        let index = self.field_index(field)?;
        Ok(&self.values[index])
    }

    /// Write one field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> OrmResult<()> {
        let index = self.field_index(field)?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Hydrate from a raw row.
    ///
    /// Keys that are not registered fields are ignored. Marks the
    /// instance loaded; hydration from any source counts as a load.
    /// Returns the instance for chaining.
    pub fn set_all(&mut self, row: &Row) -> &mut Self {
        for (index, field) in self.descriptor.fields().iter().enumerate() {
            if let Some(value) = row.get(field.name()) {
                self.values[index] = value.clone();
            }
        }
        self.loaded = true;
        self
    }

    /// Render fields as an ordered field-to-value mapping.
    ///
    /// An empty selection means all fields in declaration order; a
    /// non-empty selection keeps its own order and silently drops names
    /// that are not registered fields.
    pub fn as_array(&self, fields: &[&str]) -> Row {
        let mut result = Row::new();
        if fields.is_empty() {
            for (index, field) in self.descriptor.fields().iter().enumerate() {
                result.insert(field.name().to_string(), self.values[index].clone());
            }
        } else {
            for name in fields {
                if let Some(index) = self.descriptor.index_of(name) {
                    result.insert((*name).to_string(), self.values[index].clone());
                }
            }
        }
        result
    }

    /// Render fields as a JSON object string; same selection rules as
    /// [`Model::as_array`].
    pub fn as_json(&self, fields: &[&str]) -> OrmResult<String> {
        Ok(serde_json::to_string(&self.as_array(fields))?)
    }

    /// Persist through the service: insert when the primary key is
    /// unset, update otherwise.
    pub fn save(&self) -> OrmResult<Saved> {
        self.service()?.save(self)
    }

    /// Delete through the service.
    ///
    /// Without a positive integer id there is nothing stored to remove,
    /// so this reports `true` without touching storage.
    pub fn delete(&self) -> OrmResult<bool> {
        let id = self.primary_id();
        if id <= 0 {
            return Ok(true);
        }
        match self.service()?.delete(IdSpec::One(id))? {
            Deletion::Removed(affected) => Ok(affected > 0),
            Deletion::Unbound(_) => Ok(false),
        }
    }

    /// Service for this model, created at most once per instance.
    pub fn service(&self) -> OrmResult<&Arc<Service>> {
        self.service.get_or_try_init(|| {
            Service::new(self.orm.clone(), self.descriptor.name(), None).map(Arc::new)
        })
    }

    fn field_index(&self, field: &str) -> OrmResult<usize> {
        self.descriptor
            .index_of(field)
            .ok_or_else(|| OrmError::FieldNotFound {
                model: self.descriptor.name().to_string(),
                field: field.to_string(),
            })
    }
}
