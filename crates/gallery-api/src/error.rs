//! API error type and the JSON error envelope.
//!
//! Every failure a handler can produce ends up here: domain rule violations,
//! repository errors (classified through the Oracle error table), request
//! validation and extractor rejections. The rendered body is always an
//! [`ErrorResponse`]; the request-id middleware fills in `requestId` on the
//! way out.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use gallery_core::db::DbError;
use gallery_core::{classify, DomainError, OraClassification};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// API error type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Malformed request (bad JSON, bad path or query parameter).
    #[error("{0}")]
    BadRequest(String),

    /// Field-level validation failures.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Duplicate resource.
    #[error("{0}")]
    Conflict(String),

    /// The request is well-formed but breaks a gallery rule.
    #[error("{0}")]
    BusinessRule(String),

    /// The handler did not finish within the configured timeout.
    #[error("The request timed out")]
    Timeout,

    /// Database failure, classified by its Oracle error number.
    #[error("{}", .classification.message)]
    Database {
        classification: OraClassification,
        detail: String,
    },

    /// Anything else. The message is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub details: Option<String>,
    pub validation_errors: Vec<FieldError>,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Database { classification, .. } => {
                StatusCode::from_u16(classification.status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} with id {} was not found", entity, id))
    }

    /// Builds the envelope, without a request id.
    pub fn to_envelope(&self) -> ErrorResponse {
        let (message, details, validation_errors) = match self {
            ApiError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(format!("{} field(s) failed validation", errors.len())),
                errors.clone(),
            ),
            ApiError::Database { classification, .. } => (
                classification.message.clone(),
                Some(classification.ora_code()),
                Vec::new(),
            ),
            ApiError::Internal(_) => (
                "An unexpected error occurred".to_string(),
                None,
                Vec::new(),
            ),
            other => (other.to_string(), None, Vec::new()),
        };

        ErrorResponse {
            status_code: self.status_code().as_u16(),
            message,
            details,
            validation_errors,
            timestamp: Utc::now(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database {
                classification,
                detail,
            } => {
                if classification.status >= 500 {
                    error!(code = %classification.ora_code(), detail = %detail, "Database error");
                } else {
                    warn!(code = %classification.ora_code(), detail = %detail, "Database error");
                }
            }
            ApiError::Internal(msg) => error!(error = %msg, "Internal error"),
            _ => {}
        }

        let body = self.to_envelope();
        let mut response = (self.status_code(), Json(&body)).into_response();
        // Picked up by the request-id middleware to stamp `requestId`.
        response.extensions_mut().insert(body);
        response
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if let DbError::NotFound { entity, id } = &err {
            return ApiError::not_found(entity, id);
        }

        match err.ora_code() {
            Some(code) => ApiError::Database {
                classification: classify(code),
                detail: err.to_string(),
            },
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DomainError::Validation { field, message } => {
                ApiError::Validation(vec![FieldError::new(field, message)])
            }
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::BusinessRule(msg) => ApiError::BusinessRule(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<FieldError> = Vec::new();

        for (field_name, field_errors) in err.field_errors() {
            let field = camel_case(&field_name.to_string());
            for e in field_errors.iter() {
                let message = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code));
                errors.push(FieldError::new(field.clone(), message));
            }
        }
        errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));

        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `estimated_value` -> `estimatedValue`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
