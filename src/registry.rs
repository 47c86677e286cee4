//! Explicit registry wiring models, services and providers
//!
//! [`Orm`] replaces name-mangled class lookup with a registry populated
//! at process start: model descriptors, optional per-model service
//! extensions, and provider factories, all keyed by short name. The
//! registry is immutable after build and shared via `Arc`; each
//! model/service/provider graph hangs off it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::database::query::Id;
use crate::database::Database;
use crate::error::{OrmError, OrmResult};
use crate::model::{Model, ModelDescriptor};
use crate::provider::{DatabaseProvider, Provider};
use crate::service::{RowSelection, Service, ServiceExtension, DEFAULT_PROVIDER};

/// Factory producing a provider for a model short name
pub type ProviderFactory = dyn Fn(&Arc<Orm>, &str) -> OrmResult<Box<dyn Provider>> + Send + Sync;

/// Shared registry and entry point of the layer
pub struct Orm {
    database: Arc<Database>,
    models: HashMap<String, Arc<ModelDescriptor>>,
    extensions: HashMap<String, Arc<dyn ServiceExtension>>,
    providers: HashMap<String, Arc<ProviderFactory>>,
}

impl Orm {
    /// Start building a registry over a database.
    pub fn builder(database: Arc<Database>) -> OrmBuilder {
        let mut providers: HashMap<String, Arc<ProviderFactory>> = HashMap::new();
        providers.insert(
            DEFAULT_PROVIDER.to_string(),
            Arc::new(|orm: &Arc<Orm>, model: &str| {
                Ok(Box::new(DatabaseProvider::new(orm, model)?) as Box<dyn Provider>)
            }),
        );
        OrmBuilder {
            database,
            models: HashMap::new(),
            extensions: HashMap::new(),
            providers,
        }
    }

    /// Storage collaborator shared by every provider.
    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Descriptor of a registered model.
    pub fn descriptor(&self, model: &str) -> OrmResult<Arc<ModelDescriptor>> {
        self.models
            .get(model)
            .cloned()
            .ok_or_else(|| OrmError::ModelNotFound(model.to_string()))
    }

    /// Fresh, unloaded instance of a registered model.
    pub fn model(self: &Arc<Self>, model: &str) -> OrmResult<Model> {
        let descriptor = self.descriptor(model)?;
        Ok(Model::new(self.clone(), descriptor))
    }

    /// Construct a model and load it by id.
    ///
    /// A miss is not an error: the returned instance stays unloaded with
    /// every field at its declared default.
    pub fn load(self: &Arc<Self>, model: &str, id: Id) -> OrmResult<Model> {
        let mut instance = self.model(model)?;
        let service = instance.service()?.clone();
        if let RowSelection::One(row) = service.select_rows(id)? {
            instance.set_all(&row);
        }
        Ok(instance)
    }

    /// Service for a registered model, on the default provider.
    pub fn service(self: &Arc<Self>, model: &str) -> OrmResult<Service> {
        Service::new(self.clone(), model, None)
    }

    pub(crate) fn extension(&self, model: &str) -> Option<Arc<dyn ServiceExtension>> {
        self.extensions.get(model).cloned()
    }

    pub(crate) fn build_provider(
        self: &Arc<Self>,
        provider: &str,
        model: &str,
    ) -> OrmResult<Box<dyn Provider>> {
        let factory = self
            .providers
            .get(provider)
            .ok_or_else(|| OrmError::ProviderNotFound(provider.to_string()))?
            .clone();
        (factory.as_ref())(self, model)
    }
}

/// Builder for [`Orm`]
///
/// Registering the same model, extension or provider name twice keeps
/// the later registration.
pub struct OrmBuilder {
    database: Arc<Database>,
    models: HashMap<String, Arc<ModelDescriptor>>,
    extensions: HashMap<String, Arc<dyn ServiceExtension>>,
    providers: HashMap<String, Arc<ProviderFactory>>,
}

impl OrmBuilder {
    /// Register a model descriptor under its short name.
    pub fn model(mut self, descriptor: Arc<ModelDescriptor>) -> Self {
        self.models.insert(descriptor.name().to_string(), descriptor);
        self
    }

    /// Attach a service extension to a model short name.
    pub fn extension(mut self, model: &str, extension: Arc<dyn ServiceExtension>) -> Self {
        self.extensions.insert(model.to_string(), extension);
        self
    }

    /// Register a provider factory under a name.
    pub fn provider<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Arc<Orm>, &str) -> OrmResult<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.providers.insert(name.to_string(), Arc::new(factory));
        self
    }

    pub fn build(self) -> Arc<Orm> {
        tracing::debug!(
            models = self.models.len(),
            providers = self.providers.len(),
            "registry built"
        );
        Arc::new(Orm {
            database: self.database,
            models: self.models,
            extensions: self.extensions,
            providers: self.providers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::model::FieldKind;

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
    fn unknown_model_name_fails_lookup() {
        let orm = orm();
        assert!(matches!(
            orm.model("ghost"),
            Err(OrmError::ModelNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn fresh_model_is_unloaded_with_defaults() {
        let orm = orm();
        let model = orm.model("user").unwrap();
        assert!(!model.is_loaded());
        assert_eq!(model.primary_id(), 0);
        assert!(model.get("name").unwrap().is_null());
    }

    #[test]
    fn later_model_registration_wins() {
        let database = Database::single(Arc::new(MemoryBackend::new()));
        let orm = Orm::builder(database)
            .model(
                ModelDescriptor::builder("user")
                    .field("id", FieldKind::Integer)
                    .build(),
            )
            .model(
                ModelDescriptor::builder("user")
                    .field("id", FieldKind::Integer)
                    .field("email", FieldKind::Text)
                    .build(),
            )
            .build();
        let descriptor = orm.descriptor("user").unwrap();
        assert_eq!(descriptor.field_names(), ["id", "email"]);
    }
}
