//! Services: id resolution and result conversion
//!
//! One service per model type. It normalizes the accepted id shapes
//! (nothing, one id, many ids, one model, many models) into an id list,
//! delegates to the configured provider, and converts raw rows back into
//! model instances. Model-specific behavior lives in an optional
//! [`ServiceExtension`] looked up from the registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::database::query::{DeleteQuery, Id, Row, SelectQuery};
use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::provider::{Provider, ProviderDelete, ProviderRows, Saved};
use crate::registry::Orm;

/// Provider consulted when a service is built without an explicit one
pub const DEFAULT_PROVIDER: &str = "database";

/// Identifier input accepted by select and delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSpec {
    /// No ids: select/delete hand back the unexecuted query.
    None,
    /// A single id; a single-row result unwraps to one model.
    One(Id),
    /// A collection of ids; results stay a list.
    Many(Vec<Id>),
}

impl IdSpec {
    /// Flatten to the id list handed to providers.
    pub fn resolve(&self) -> Vec<Id> {
        match self {
            IdSpec::None => Vec::new(),
            IdSpec::One(id) => vec![*id],
            IdSpec::Many(ids) => ids.clone(),
        }
    }

    /// Whether the caller passed a collection shape.
    pub fn is_many(&self) -> bool {
        matches!(self, IdSpec::Many(_))
    }
}

impl From<Id> for IdSpec {
    fn from(id: Id) -> Self {
        IdSpec::One(id)
    }
}

impl From<Vec<Id>> for IdSpec {
    fn from(ids: Vec<Id>) -> Self {
        IdSpec::Many(ids)
    }
}

impl From<&Model> for IdSpec {
    fn from(model: &Model) -> Self {
        IdSpec::One(model.primary_id())
    }
}

impl From<&[Model]> for IdSpec {
    fn from(models: &[Model]) -> Self {
        IdSpec::Many(models.iter().map(Model::primary_id).collect())
    }
}

impl From<&Vec<Model>> for IdSpec {
    fn from(models: &Vec<Model>) -> Self {
        models.as_slice().into()
    }
}

/// Converted outcome of a service select
pub enum Selection {
    /// No ids were given; compose and execute the query yourself.
    Unbound(SelectQuery),
    /// Exactly one row matched a non-collection id spec.
    One(Model),
    /// Every other case, including a single-id miss (empty list).
    Many(Vec<Model>),
}

/// Raw-row outcome of a service select
pub enum RowSelection {
    Unbound(SelectQuery),
    One(Row),
    Many(Vec<Row>),
}

/// Outcome of a service delete
pub enum Deletion {
    /// No ids were given; compose and execute the delete yourself.
    Unbound(DeleteQuery),
    /// Affected-row count.
    Removed(u64),
}

/// Model-specific service behavior attached at registration time.
///
/// An extension receives every method call the generic service does not
/// define; it reports methods it does not know with
/// [`OrmError::MethodNotSupported`].
pub trait ServiceExtension: Send + Sync {
    fn call(&self, service: &Service, method: &str, args: &[Value]) -> OrmResult<Value>;
}

/// Orchestrator for one model type
pub struct Service {
    orm: Arc<Orm>,
    model: String,
    providers: HashMap<String, Box<dyn Provider>>,
    default_provider: String,
    extension: Option<Arc<dyn ServiceExtension>>,
}

impl Service {
    /// Build a service for a registered model.
    ///
    /// `default_provider` falls back to [`DEFAULT_PROVIDER`]. The model
    /// must be registered, and the provider name must map to a
    /// registered factory.
    pub fn new(orm: Arc<Orm>, model: &str, default_provider: Option<&str>) -> OrmResult<Self> {
        // Surfaces ModelNotFound before any provider work happens.
        let descriptor = orm.descriptor(model)?;
        let model = descriptor.name().to_string();

        let extension = orm.extension(&model);
        let provider_name = default_provider.unwrap_or(DEFAULT_PROVIDER).to_string();
        let provider = orm.build_provider(&provider_name, &model)?;

        let mut providers: HashMap<String, Box<dyn Provider>> = HashMap::new();
        providers.insert(provider_name.clone(), provider);

        Ok(Self {
            orm,
            model,
            providers,
            default_provider: provider_name,
            extension,
        })
    }

    /// Short name of the model this service orchestrates.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Select models by id spec.
    pub fn select(&self, spec: impl Into<IdSpec>) -> OrmResult<Selection> {
        let spec = spec.into();
        match self.select_rows(spec)? {
            RowSelection::Unbound(query) => Ok(Selection::Unbound(query)),
            RowSelection::One(row) => Ok(Selection::One(self.convert_row(&row)?)),
            RowSelection::Many(rows) => Ok(Selection::Many(self.convert_rows(rows)?)),
        }
    }

    /// Select raw rows by id spec, skipping model conversion.
    pub fn select_rows(&self, spec: impl Into<IdSpec>) -> OrmResult<RowSelection> {
        let spec = spec.into();
        let ids = spec.resolve();
        match self.provider().select(&ids)? {
            ProviderRows::Unbound(query) => Ok(RowSelection::Unbound(query)),
            ProviderRows::Rows(mut rows) => {
                if !spec.is_many() && rows.len() == 1 {
                    Ok(RowSelection::One(rows.remove(0)))
                } else {
                    Ok(RowSelection::Many(rows))
                }
            }
        }
    }

    /// Delete by id spec.
    pub fn delete(&self, spec: impl Into<IdSpec>) -> OrmResult<Deletion> {
        let ids = spec.into().resolve();
        match self.provider().delete(&ids)? {
            ProviderDelete::Unbound(query) => Ok(Deletion::Unbound(query)),
            ProviderDelete::Affected(affected) => Ok(Deletion::Removed(affected)),
        }
    }

    /// Save a model through the provider.
    ///
    /// Whatever the storage layer reports is collapsed into a uniform
    /// save failure with the cause chained underneath, so model
    /// consumers never see backend-specific error detail.
    pub fn save(&self, model: &Model) -> OrmResult<Saved> {
        self.provider().save(model).map_err(|err| {
            tracing::warn!(model = %self.model, error = %err, "save failed");
            OrmError::SaveFailed {
                source: Box::new(err),
            }
        })
    }

    /// Convert raw rows into loaded model instances.
    pub fn convert_rows(&self, rows: Vec<Row>) -> OrmResult<Vec<Model>> {
        rows.iter().map(|row| self.convert_row(row)).collect()
    }

    fn convert_row(&self, row: &Row) -> OrmResult<Model> {
        let mut model = self.orm.model(&self.model)?;
        model.set_all(row);
        Ok(model)
    }

    /// Invoke a model-specific method by name.
    ///
    /// Forwarded verbatim to the extension when one is registered;
    /// otherwise the method is not supported.
    pub fn call(&self, method: &str, args: &[Value]) -> OrmResult<Value> {
        match &self.extension {
            Some(extension) => extension.call(self, method, args),
            None => Err(OrmError::MethodNotSupported(method.to_string())),
        }
    }

    fn provider(&self) -> &dyn Provider {
        self.providers[&self.default_provider].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::database::Database;
    use crate::model::{FieldKind, ModelDescriptor};

    fn orm() -> Arc<Orm> {
        let database = Database::single(Arc::new(MemoryBackend::new()));
        Orm::builder(database)
            .model(
                ModelDescriptor::builder("user")
                    .field("id", FieldKind::Integer)
                    .field("name", FieldKind::Text)
                    .build(),
            )
            .build()
    }

    #[test]
    fn resolves_no_ids_to_empty_list() {
        assert!(IdSpec::None.resolve().is_empty());
        assert!(!IdSpec::None.is_many());
    }

    #[test]
    fn resolves_scalar_to_single_id() {
        let spec: IdSpec = 5.into();
        assert_eq!(spec.resolve(), [5]);
        assert!(!spec.is_many());
    }

    #[test]
    fn resolves_id_collection() {
        let spec: IdSpec = vec![3, 7].into();
        assert_eq!(spec.resolve(), [3, 7]);
        assert!(spec.is_many());
    }

    #[test]
    fn resolves_models_to_primary_key_values() {
        let orm = orm();
        let mut m1 = orm.model("user").unwrap();
        m1.set("id", 3).unwrap();
        let mut m2 = orm.model("user").unwrap();
        m2.set("id", 7).unwrap();

        let spec: IdSpec = (&m1).into();
        assert_eq!(spec.resolve(), [3]);

        let models = vec![m1, m2];
        let spec: IdSpec = (&models).into();
        assert_eq!(spec.resolve(), [3, 7]);
        assert!(spec.is_many());
    }

    #[test]
    fn model_without_id_resolves_to_zero() {
        let orm = orm();
        let model = orm.model("user").unwrap();
        let spec: IdSpec = (&model).into();
        assert_eq!(spec.resolve(), [0]);
    }

    #[test]
    fn unknown_model_is_rejected_at_construction() {
        let orm = orm();
        let result = Service::new(orm, "ghost", None);
        assert!(matches!(result, Err(OrmError::ModelNotFound(name)) if name == "ghost"));
    }

    #[test]
    fn unknown_provider_is_rejected_at_construction() {
        let orm = orm();
        let result = Service::new(orm, "user", Some("carrier-pigeon"));
        assert!(
            matches!(result, Err(OrmError::ProviderNotFound(name)) if name == "carrier-pigeon")
        );
    }

    #[test]
    fn call_without_extension_is_not_supported() {
        let orm = orm();
        let service = Service::new(orm, "user", None).unwrap();
        let result = service.call("verify_email", &[]);
        assert!(
            matches!(result, Err(OrmError::MethodNotSupported(name)) if name == "verify_email")
        );
    }
}
