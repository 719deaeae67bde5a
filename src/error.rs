// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::services::{LoginError, ReferenceError, RegistrationError};
use crate::validation::{ErrorKind, FieldError, FieldErrors, NON_FIELD_ERRORS};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        code: &'static str,
        field_errors: FieldErrors,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { code, .. } => *code,
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::ValidationError { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Field-keyed validation failure.
    pub fn validation(field_errors: FieldErrors) -> Self {
        ApiError::ValidationError {
            message: "Validation failed".to_string(),
            code: "VALIDATION_ERROR",
            field_errors,
        }
    }

    /// Failure not tied to one field, reported under `non_field_errors`
    /// with the kind's code at the top level too.
    pub fn non_field(error: FieldError) -> Self {
        ApiError::ValidationError {
            message: error.message.clone(),
            code: error.kind().code(),
            field_errors: FieldErrors::single(NON_FIELD_ERRORS, error),
        }
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

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::DuplicateIdentifier(_) => ApiError::validation(FieldErrors::single(
                "mobile_number",
                FieldError::duplicate_mobile_number(),
            )),
            StoreError::DuplicateReference { kind, name } => {
                ApiError::conflict(format!("A {} named '{}' already exists", kind, name))
            }
            StoreError::UnknownReference { kind, ids } => ApiError::validation(FieldErrors::single(
                kind.request_field(),
                FieldError::unknown_reference(&ids),
            )),
            StoreError::ReferenceInUse { kind, id } => {
                ApiError::conflict(format!("{} {} is still in use", kind, id))
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Invalid(errors) => ApiError::validation(errors),
            RegistrationError::Auth(e) => {
                tracing::error!("Credential hashing failed during registration: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            RegistrationError::Store(e) => e.into(),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Invalid(errors) => ApiError::validation(errors),
            LoginError::InvalidCredentials => ApiError::non_field(FieldError::new(
                ErrorKind::InvalidCredentials,
                LoginError::InvalidCredentials.to_string(),
            )),
            LoginError::AccountDisabled => ApiError::non_field(FieldError::new(
                ErrorKind::AccountDisabled,
                LoginError::AccountDisabled.to_string(),
            )),
            LoginError::InvalidToken => ApiError::unauthorized(LoginError::InvalidToken.to_string()),
            LoginError::Auth(e) => {
                tracing::error!("Authentication failure: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            LoginError::Store(e) => e.into(),
        }
    }
}

impl From<ReferenceError> for ApiError {
    fn from(err: ReferenceError) -> Self {
        match err {
            ReferenceError::InvalidName(e) => ApiError::validation(FieldErrors::single("name", e)),
            ReferenceError::Duplicate { .. } | ReferenceError::InUse { .. } => {
                ApiError::conflict(err.to_string())
            }
            ReferenceError::NotFound { .. } => ApiError::not_found(err.to_string()),
            ReferenceError::Store(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_carries_field_errors() {
        let err = ApiError::validation(FieldErrors::single("password", FieldError::required()));
        let body = err.to_json();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["password"][0]["code"], "REQUIRED");
    }

    #[test]
    fn credential_failures_are_non_field_errors() {
        let body = ApiError::from(LoginError::InvalidCredentials).to_json();
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
        assert_eq!(
            body["field_errors"][NON_FIELD_ERRORS][0]["code"],
            "INVALID_CREDENTIALS"
        );
    }

    #[test]
    fn plain_errors_omit_field_errors() {
        let body = ApiError::unauthorized("Missing Authorization header").to_json();
        assert!(body.get("field_errors").is_none());
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[test]
    fn unknown_reference_reads_the_same_from_store_and_service() {
        use crate::database::models::ReferenceKind;

        let from_store = ApiError::from(StoreError::UnknownReference {
            kind: ReferenceKind::Region,
            ids: vec![7, 9],
        })
        .to_json();
        let from_service = ApiError::from(RegistrationError::from(StoreError::UnknownReference {
            kind: ReferenceKind::Region,
            ids: vec![7, 9],
        }))
        .to_json();

        assert_eq!(from_store, from_service);
        assert_eq!(
            from_store["field_errors"]["areas"][0]["message"],
            FieldError::unknown_reference(&[7, 9]).message
        );
    }

    #[test]
    fn raw_storage_errors_are_masked() {
        let err = ApiError::from(StoreError::Sqlx(sqlx::Error::RowNotFound));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("RowNotFound"));
    }
}
