// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::catalog::CatalogError;
use crate::query::QueryError;
use crate::sankhya::SankhyaError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),
    /// Token guard rejection, carries a machine readable reason
    AccessDenied {
        message: String,
        reason: &'static str,
        hint: &'static str,
        details: Option<Value>,
    },

    // 404 Not Found
    NotFound(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 501 Not Implemented
    NotImplemented(String),

    // 502 Bad Gateway (upstream ERP issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::AccessDenied { .. } => 403,
            ApiError::NotFound(_) => 404,
            ApiError::TooManyRequests(_) => 429,
            ApiError::InternalServerError(_) => 500,
            ApiError::NotImplemented(_) => 501,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::AccessDenied { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::NotImplemented(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::AccessDenied { message, reason, hint, details } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": self.error_code(),
                    "reason": reason,
                    "hint": hint,
                });

                if let Some(Value::Object(extra)) = details {
                    for (k, v) in extra {
                        response[k] = v.clone();
                    }
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::AccessDenied { .. } => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::NotImplemented(_) => "NOT_IMPLEMENTED",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn access_denied(message: impl Into<String>, reason: &'static str, hint: &'static str) -> Self {
        ApiError::AccessDenied {
            message: message.into(),
            reason,
            hint,
            details: None,
        }
    }

    pub fn with_details(self, extra: Value) -> Self {
        match self {
            ApiError::AccessDenied { message, reason, hint, .. } => ApiError::AccessDenied {
                message,
                reason,
                hint,
                details: Some(extra),
            },
            other => other,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        ApiError::NotImplemented(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<SankhyaError> for ApiError {
    fn from(err: SankhyaError) -> Self {
        match err {
            SankhyaError::InvalidQuery(msg) => ApiError::bad_request(msg),
            SankhyaError::InvalidTableName(name) => {
                ApiError::bad_request(format!("Invalid table name: {}", name))
            }
            SankhyaError::Authentication(msg) => ApiError::unauthorized(msg),
            SankhyaError::TokenUnavailable(msg) => ApiError::unauthorized(msg),
            SankhyaError::Token(e) => ApiError::unauthorized(e.to_string()),
            SankhyaError::Configuration(msg) => {
                tracing::error!("Sankhya client misconfigured: {}", msg);
                ApiError::internal_server_error("Sankhya client is not configured correctly")
            }
            SankhyaError::InvalidResponse(msg) => {
                tracing::error!("Unexpected Sankhya response: {}", msg);
                ApiError::bad_gateway(format!("Unexpected response from Sankhya API: {}", msg))
            }
            SankhyaError::Upstream(failure) => match failure.status {
                Some(401) => ApiError::unauthorized(failure.user_message),
                Some(403) => ApiError::forbidden(failure.user_message),
                Some(429) => ApiError::too_many_requests(failure.user_message),
                Some(status) if status < 500 => ApiError::bad_request(failure.full_message),
                Some(_) => ApiError::bad_gateway(failure.full_message),
                None => ApiError::service_unavailable(failure.full_message),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownTable(route) => {
                ApiError::not_found(format!("Unknown table resource: {}", route))
            }
            CatalogError::RecordNotFound { table, id } => {
                ApiError::not_found(format!("{} record {} not found", table, id))
            }
            CatalogError::Query(e) => e.into(),
            CatalogError::Sankhya(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
