use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl RegistryError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn client_in_use() -> Self { Self::Conflict("client has registered services".into()) }

    pub fn service_in_use() -> Self { Self::Conflict("some clients have this service registered".into()) }

    /// Message without the variant prefix, suitable for API responses.
    pub fn message(&self) -> String {
        match self {
            RegistryError::Validation(errors) => errors.to_string(),
            RegistryError::NotFound(msg) | RegistryError::Conflict(msg) | RegistryError::Db(msg) => msg.clone(),
        }
    }
}

impl From<FieldErrors> for RegistryError {
    fn from(errors: FieldErrors) -> Self { Self::Validation(errors) }
}
