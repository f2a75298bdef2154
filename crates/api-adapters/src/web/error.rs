//! # ApiError
//!
//! Maps every failure a handler can produce onto the HTTP taxonomy:
//!
//! | Cause                          | Status |
//! |--------------------------------|--------|
//! | validation, malformed input    | 400    |
//! | duplicate email                | 400    |
//! | bad/expired token, bad login   | 401 + `WWW-Authenticate: Bearer` |
//! | role or ownership              | 403    |
//! | missing entity                 | 404    |
//! | infrastructure                 | 500, detail only in the log |

use std::collections::BTreeMap;

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use services::ServiceError;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Field-level validation failures.
    #[error("{detail}")]
    Invalid {
        detail: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Login or password re-check failed.
    #[error("incorrect email or password")]
    BadCredentials,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// One malformed input with no field breakdown (bad JSON, bad query).
    pub fn malformed(source: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let mut errors = BTreeMap::new();
        errors.insert(source.to_owned(), vec![detail.clone()]);
        ApiError::Invalid { detail, errors }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid { .. } | ApiError::Service(ServiceError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Conflict(_)) => StatusCode::BAD_REQUEST,
            ApiError::BadCredentials | ApiError::Service(ServiceError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            ApiError::Service(ServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::Invalid { detail, errors } => ErrorBody { detail, errors: Some(errors) },
            ApiError::Service(ServiceError::Validation { field, message }) => {
                let mut errors = BTreeMap::new();
                errors.insert(field, vec![message.clone()]);
                ErrorBody { detail: message, errors: Some(errors) }
            }
            ApiError::Service(ServiceError::Conflict(msg)) => ErrorBody { detail: msg, errors: None },
            ApiError::Service(ServiceError::Forbidden(msg)) => ErrorBody { detail: msg, errors: None },
            ApiError::Service(ServiceError::NotFound(what)) => ErrorBody {
                detail: format!("{what} not found"),
                errors: None,
            },
            ApiError::Service(ServiceError::Internal(_)) => ErrorBody {
                detail: "internal server error".into(),
                errors: None,
            },
            other @ (ApiError::BadCredentials | ApiError::Service(ServiceError::Unauthenticated)) => ErrorBody {
                detail: other.to_string(),
                errors: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Service(ServiceError::Internal(detail)) = &self {
            error!(%detail, "request failed");
        }

        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None => format!("failed {} check", e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Invalid { detail: "request validation failed".into(), errors }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed("body", rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::malformed("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::malformed("query", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::malformed("path", rejection.body_text())
    }
}
