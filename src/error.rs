//! Error types for the mapping layer
//!
//! One crate-wide taxonomy; failures surface immediately and are never
//! retried here. The save path is the single exception to transparent
//! propagation: whatever the storage layer reports is collapsed into
//! [`OrmError::SaveFailed`] with the cause chained underneath.

use thiserror::Error;

/// Result type alias for mapping-layer operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error type for model, service and provider operations
#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// Field name is not part of the model's field registry
    #[error("unknown field `{field}` on model `{model}`")]
    FieldNotFound { model: String, field: String },

    /// Operation is not defined on the service and no extension handles it
    #[error("method `{0}` is not supported by this service")]
    MethodNotSupported(String),

    /// No model registered under the given short name
    #[error("model `{0}` is not registered")]
    ModelNotFound(String),

    /// No provider factory registered under the given name
    #[error("provider `{0}` is not registered")]
    ProviderNotFound(String),

    /// Storage failure during save, cause attached
    #[error("unable to save the model")]
    SaveFailed {
        #[source]
        source: Box<OrmError>,
    },

    /// Failure reported by a database backend
    #[error("database error: {0}")]
    Database(String),

    /// Named connection is not configured on the database
    #[error("unknown connection `{0}`")]
    Connection(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        OrmError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn save_failed_chains_its_cause() {
        let err = OrmError::SaveFailed {
            source: Box::new(OrmError::Database("duplicate key".into())),
        };
        assert_eq!(err.to_string(), "unable to save the model");
        let source = err.source().expect("cause must be chained");
        assert_eq!(source.to_string(), "database error: duplicate key");
    }

    #[test]
    fn field_not_found_names_model_and_field() {
        let err = OrmError::FieldNotFound {
            model: "user".into(),
            field: "nickname".into(),
        };
        assert_eq!(err.to_string(), "unknown field `nickname` on model `user`");
    }
}
