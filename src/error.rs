/// Unified error handling.
///
/// Every fallible operation in the crate returns an `AppError`. A single
/// `ResponseError` implementation translates errors into the uniform
/// `{"success": false, "message": ...}` body, so handlers never write
/// error responses themselves and cookies are only set on full success.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

use crate::validators::ValidationError;

/// Authentication failures. All of these map to 400, the same status as
/// validation failures, so the response status does not reveal which
/// check rejected the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No access token cookie on a protected route.
    MissingToken,
    /// Access token failed signature or expiry checks. This is the signal
    /// clients use to attempt a refresh instead of a re-login.
    InvalidToken,
    /// Token verified but no session entry exists for its user id.
    SessionExpired,
    /// Login with an unknown email or a wrong password.
    InvalidCredentials,
    /// Any failure inside the refresh flow. Deliberately uninformative.
    RefreshFailed,
    /// Supplied activation code does not match the code inside the token.
    InvalidActivationCode,
    /// Activation token failed signature or expiry checks.
    InvalidActivationToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Please login to access this resource"),
            AuthError::InvalidToken => write!(f, "Access token is not valid"),
            AuthError::SessionExpired => write!(f, "Session expired, please login again"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::RefreshFailed => write!(f, "Could not refresh token"),
            AuthError::InvalidActivationCode => write!(f, "Invalid activation code"),
            AuthError::InvalidActivationToken => write!(f, "Activation token is not valid"),
        }
    }
}

impl StdError for AuthError {}

/// Central error type all application errors map to.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    /// Role-based denial; carries the offending role name.
    Forbidden(String),
    NotFound(String),
    EmailExists,
    Database(String),
    Email(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden(role) => {
                write!(f, "Role {} is not allowed to access this resource", role)
            }
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::EmailExists => write!(f, "Email already exists"),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Email(msg) => write!(f, "Failed to send email: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record".to_string()),
            sqlx::Error::Database(e) if e.constraint().is_some() => AppError::EmailExists,
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Internal(format!("session cache: {}", err))
    }
}

/// The uniform error body every failure is rendered as.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl AppError {
    fn log(&self) {
        match self {
            AppError::Validation(e) => tracing::warn!(error = %e, "validation error"),
            AppError::Auth(e) => tracing::warn!(error = %e, "authentication error"),
            AppError::Forbidden(role) => tracing::warn!(role = %role, "role denied"),
            AppError::NotFound(what) => tracing::warn!(entity = %what, "not found"),
            AppError::EmailExists => tracing::warn!("duplicate email attempt"),
            AppError::Database(msg) => tracing::error!(error = %msg, "database error"),
            AppError::Email(msg) => tracing::error!(error = %msg, "email delivery error"),
            AppError::Internal(msg) => tracing::error!(error = %msg, "internal error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            // Same status as validation on purpose: the external status
            // code must not distinguish auth failures from malformed input.
            AppError::Auth(_) => StatusCode::BAD_REQUEST,
            AppError::EmailExists => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Email(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        let message = match self {
            // Store/signing/email internals are not leaked to callers.
            AppError::Database(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            AppError::Email(_) => "Could not send email".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::Validation(ValidationError::EmptyField("email"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_errors_share_the_validation_status() {
        for auth in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::SessionExpired,
            AuthError::InvalidCredentials,
            AuthError::RefreshFailed,
        ] {
            assert_eq!(AppError::Auth(auth).status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn forbidden_names_the_offending_role() {
        let err = AppError::Forbidden("user".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Role user is not allowed to access this resource"
        );
    }

    #[test]
    fn refresh_failures_share_one_message() {
        assert_eq!(
            AppError::Auth(AuthError::RefreshFailed).to_string(),
            "Could not refresh token"
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            AppError::NotFound("User".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::Database("connection reset by peer".to_string());
        let body = err.error_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_serializes_with_success_false() {
        let body = ErrorBody {
            success: false,
            message: "Email already exists".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Email already exists");
    }
}
