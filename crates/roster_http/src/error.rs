//! Mapping of core errors onto HTTP responses.
//!
//! | error | status | body |
//! |---|---|---|
//! | `NotFound` | 404 | `{"detail": "Not found."}` |
//! | `Validation` | 400 | field -> messages map |
//! | `MalformedJson` | 400 | `{"detail": "JSON parse error - ..."}` |
//! | `Internal` | 500 | `{"detail": "Internal server error."}` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use roster_core::{RepoError, ServiceError, ValidationErrors};
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Validation(ValidationErrors),
    MalformedJson(String),
    /// Store or consistency failure; the message is logged, never sent.
    Internal(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::MalformedJson(reason) => write!(f, "JSON parse error - {reason}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::Validation(errors) => Self::Validation(errors),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
            }
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::MalformedJson(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": format!("JSON parse error - {reason}")})),
            )
                .into_response(),
            Self::Internal(message) => {
                error!("event=http_error module=http status=error error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "Internal server error."})),
                )
                    .into_response()
            }
        }
    }
}
