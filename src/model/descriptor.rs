//! Model descriptors: the per-type field registry
//!
//! A [`ModelDescriptor`] is built once at registration time and shared by
//! every instance of the model. Field order is declaration order and is
//! the order columns are sent to storage, so the builder never reorders.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::inflect::pluralize;

/// Field names that can never enter a field registry.
///
/// These are the layer's own bookkeeping attributes; a model declaring a
/// field by one of these names would collide with them in serialized
/// form, so the builder drops them.
pub const RESERVED_FIELDS: [&str; 7] = [
    "fields",
    "service",
    "model",
    "table",
    "ignored",
    "loaded",
    "primary_key",
];

/// Default primary key field name
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Semantic type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    Bool,
    Json,
}

/// One entry in a model's field registry
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    default: Value,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// Immutable description of a model type
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    name: String,
    table: String,
    primary_key: String,
    fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Start describing a model under its lowercase short name.
    pub fn builder(name: &str) -> ModelDescriptorBuilder {
        ModelDescriptorBuilder {
            name: name.to_lowercase(),
            table: None,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// Model short name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage relation the model maps to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Field acting as row identity.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Position of a field in the registry.
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.index_of(field).is_some()
    }
}

/// Builder for [`ModelDescriptor`]
pub struct ModelDescriptorBuilder {
    name: String,
    table: Option<String>,
    primary_key: String,
    fields: Vec<FieldDescriptor>,
    ignored: Vec<String>,
}

impl ModelDescriptorBuilder {
    /// Declare a field with a null default.
    pub fn field(self, name: &str, kind: FieldKind) -> Self {
        self.field_with_default(name, kind, Value::Null)
    }

    /// Declare a field with an explicit default value.
    pub fn field_with_default(mut self, name: &str, kind: FieldKind, default: Value) -> Self {
        let reserved = RESERVED_FIELDS.contains(&name);
        let ignored = self.ignored.iter().any(|i| i == name);
        let duplicate = self.fields.iter().any(|f| f.name == name);
        if !reserved && !ignored && !duplicate {
            self.fields.push(FieldDescriptor {
                name: name.to_string(),
                kind,
                default,
            });
        }
        self
    }

    /// Exclude a name from the registry even if declared later.
    pub fn ignore(mut self, name: &str) -> Self {
        self.ignored.push(name.to_string());
        self.fields.retain(|f| f.name != name);
        self
    }

    /// Override the derived primary key name.
    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key = name.to_string();
        self
    }

    /// Override the derived table name.
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    pub fn build(self) -> Arc<ModelDescriptor> {
        let table = self.table.unwrap_or_else(|| pluralize(&self.name));
        Arc::new(ModelDescriptor {
            name: self.name,
            table,
            primary_key: self.primary_key,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_table_and_primary_key() {
        let descriptor = ModelDescriptor::builder("User")
            .field("id", FieldKind::Integer)
            .field("name", FieldKind::Text)
            .build();
        assert_eq!(descriptor.name(), "user");
        assert_eq!(descriptor.table(), "users");
        assert_eq!(descriptor.primary_key(), "id");
    }

    #[test]
    fn preserves_declaration_order() {
        let descriptor = ModelDescriptor::builder("user")
            .field("id", FieldKind::Integer)
            .field("email", FieldKind::Text)
            .field("name", FieldKind::Text)
            .field("active", FieldKind::Bool)
            .build();
        assert_eq!(descriptor.field_names(), ["id", "email", "name", "active"]);
        assert_eq!(descriptor.index_of("name"), Some(2));
    }

    #[test]
    fn drops_reserved_ignored_and_duplicate_names() {
        let descriptor = ModelDescriptor::builder("user")
            .ignore("password_plain")
            .field("id", FieldKind::Integer)
            .field("loaded", FieldKind::Bool)
            .field("table", FieldKind::Text)
            .field("password_plain", FieldKind::Text)
            .field("id", FieldKind::Integer)
            .field("name", FieldKind::Text)
            .build();
        assert_eq!(descriptor.field_names(), ["id", "name"]);
    }

    #[test]
    fn ignore_removes_an_already_declared_field() {
        let descriptor = ModelDescriptor::builder("user")
            .field("id", FieldKind::Integer)
            .field("cached_total", FieldKind::Integer)
            .ignore("cached_total")
            .build();
        assert_eq!(descriptor.field_names(), ["id"]);
    }

    #[test]
    fn field_defaults_are_kept() {
        let descriptor = ModelDescriptor::builder("user")
            .field("id", FieldKind::Integer)
            .field_with_default("status", FieldKind::Text, json!("active"))
            .build();
        assert_eq!(descriptor.fields()[1].default_value(), &json!("active"));
        assert_eq!(descriptor.fields()[1].kind(), FieldKind::Text);
    }

    #[test]
    fn table_override_wins_over_pluralization() {
        let descriptor = ModelDescriptor::builder("person")
            .table("people")
            .field("id", FieldKind::Integer)
            .build();
        assert_eq!(descriptor.table(), "people");
    }
}
