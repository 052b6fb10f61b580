/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; `ApiError` converts itself into
/// the right HTTP response. Domain errors from the service layer
/// ([`AuthFlowError`], [`PhaseError`]) are mapped to transport categories
/// in one place here — the kind decides the status, never the message
/// text.
///
/// # Example
///
/// ```
/// use phasetracker_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::auth::AuthFlowError;
use crate::services::phases::PhaseError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - domain-level bad input (invalid code, empty name)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate signup email
    Conflict(String),

    /// Unprocessable entity (422) - request shape validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but never expose detail to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already registered".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Kind→status mapping for the auth flows
///
/// The message strings here are the complete user-facing vocabulary of the
/// auth endpoints; anti-enumeration collapses (unified invalid-credentials,
/// single generic invalid-code) happen in the service layer before an error
/// ever reaches this table.
impl From<AuthFlowError> for ApiError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::EmailTaken => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthFlowError::AccountNotFound => {
                ApiError::BadRequest("Account not found".to_string())
            }
            AuthFlowError::AlreadyVerified => {
                ApiError::BadRequest("Account already verified".to_string())
            }
            AuthFlowError::InvalidCode => {
                ApiError::BadRequest("Invalid verification code".to_string())
            }
            AuthFlowError::ExpiredCode => {
                ApiError::BadRequest("Verification code expired".to_string())
            }
            AuthFlowError::CodeAlreadyUsed => {
                ApiError::BadRequest("Verification code already used".to_string())
            }
            AuthFlowError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthFlowError::AccountNotVerified => {
                ApiError::Forbidden("Account not verified".to_string())
            }
            AuthFlowError::Password(e) => ApiError::InternalError(e.to_string()),
            AuthFlowError::Jwt(e) => ApiError::InternalError(e.to_string()),
            AuthFlowError::Mail(e) => ApiError::InternalError(e.to_string()),
            AuthFlowError::Database(e) => ApiError::from(e),
        }
    }
}

/// Kind→status mapping for the phase lifecycle engine
impl From<PhaseError> for ApiError {
    fn from(err: PhaseError) -> Self {
        match err {
            PhaseError::Validation(msg) => ApiError::BadRequest(msg),
            PhaseError::NotFound => ApiError::NotFound("Phase not found".to_string()),
            PhaseError::NotInProject => {
                ApiError::Forbidden("Phase does not belong to this project".to_string())
            }
            PhaseError::Database(e) => ApiError::from(e),
        }
    }
}

/// Collects validator derive failures into a 422 response
pub fn validation_failed(errors: validator::ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Phase not found".to_string());
        assert_eq!(err.to_string(), "Not found: Phase not found");
    }

    #[test]
    fn test_auth_flow_mapping() {
        assert!(matches!(
            ApiError::from(AuthFlowError::EmailTaken),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(AuthFlowError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthFlowError::AccountNotVerified),
            ApiError::Forbidden(_)
        ));
        // every code-redemption failure is a 400, per the original contract
        for err in [
            AuthFlowError::AccountNotFound,
            AuthFlowError::AlreadyVerified,
            AuthFlowError::InvalidCode,
            AuthFlowError::ExpiredCode,
            AuthFlowError::CodeAlreadyUsed,
        ] {
            assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));
        }
    }

    #[test]
    fn test_phase_mapping() {
        assert!(matches!(
            ApiError::from(PhaseError::NotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(PhaseError::NotInProject),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(PhaseError::Validation("Phase name is required".to_string())),
            ApiError::BadRequest(_)
        ));
    }
}
