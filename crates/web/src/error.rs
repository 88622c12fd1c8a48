use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::domain::validation::LOCKED_MESSAGE;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict(String),
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound => write!(f, "Resource not found"),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

fn validation_details(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                format!(
                    "{}: {}",
                    field,
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                )
            })
        })
        .collect()
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::Locked) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) | Self::Conflict(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(StorageError::Validation(errors)) | Self::Validation(errors) => {
                json!({
                    "error": "Validation failed",
                    "details": validation_details(errors)
                })
            }
            Self::Storage(StorageError::Locked) => {
                json!({
                    "error": LOCKED_MESSAGE
                })
            }
            Self::Storage(StorageError::Forbidden) | Self::Forbidden => {
                json!({
                    "error": "You do not have permission to perform this action"
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
            Self::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({
                    "error": "An internal error occurred"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (WebError::Storage(StorageError::NotFound), StatusCode::NOT_FOUND),
            (
                WebError::Storage(StorageError::ConstraintViolation("taken".into())),
                StatusCode::CONFLICT,
            ),
            (WebError::Storage(StorageError::Locked), StatusCode::BAD_REQUEST),
            (WebError::Storage(StorageError::Forbidden), StatusCode::FORBIDDEN),
            (WebError::Unauthorized, StatusCode::UNAUTHORIZED),
            (WebError::Conflict("busy".into()), StatusCode::CONFLICT),
            (
                WebError::InternalServerError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_validation_details_are_listed() {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("range");
        error.message = Some("A number between 1 and 5".into());
        errors.add("score", error);

        let response = WebError::Storage(StorageError::Validation(errors)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0], "score: A number between 1 and 5");
    }

    #[tokio::test]
    async fn test_locked_uses_lockdown_message() {
        let body = body_json(WebError::Storage(StorageError::Locked).into_response()).await;
        assert_eq!(body["error"], LOCKED_MESSAGE);
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let body = body_json(WebError::InternalServerError("db password wrong".into()).into_response()).await;
        assert_eq!(body["error"], "An internal error occurred");
    }
}
