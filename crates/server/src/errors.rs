use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use registry::validation::FieldErrors;
use registry::RegistryError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error body: `{"message": ..., "errors": {field: [..]}}`, `errors` only for validation failures.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self { status, message: message.into(), errors }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.errors {
            Some(errors) => json!({ "message": self.message, "errors": errors }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RegistryError> for JsonApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(errors) => {
                JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, errors.to_string(), Some(errors))
            }
            RegistryError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, msg, None),
            RegistryError::Conflict(msg) => JsonApiError::new(StatusCode::CONFLICT, msg, None),
            RegistryError::Db(msg) => {
                error!(err = %msg, "storage failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error", None)
            }
        }
    }
}

/// Unparseable or mistyped JSON bodies are validation failures.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text(), None)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
