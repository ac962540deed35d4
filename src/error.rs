//! API error taxonomy and its uniform wire shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field was absent from the request body.
    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Email address already registered")]
    DuplicateAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// A store fault inside an atomic unit of work. No partial state
    /// survives, so the caller may retry the whole operation.
    #[error("transaction aborted: {0}")]
    TransactionAborted(#[source] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::DuplicateAccount | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TransactionAborted(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The unique index on `credentials.email` is the authoritative duplicate
/// guard, so a unique violation on create is the same condition as the
/// application-level existence check firing.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => return ApiError::DuplicateAccount,
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    return ApiError::Validation(format!("Invalid field value: {}", db_err))
                }
                _ => {}
            }
        }
        ApiError::TransactionAborted(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 500-class faults keep their detail in the logs only
        let message = match &self {
            ApiError::TransactionAborted(_) | ApiError::Internal(_) => {
                error!(error = %self, "internal server fault");
                "Server Error".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_wire_contract() {
        assert_eq!(
            ApiError::missing_input("Email address is required").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::DuplicateAccount.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("nope").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn error_body_is_uniform() {
        let resp = ApiError::DuplicateAccount.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(
            json["error"],
            serde_json::json!("Email address already registered")
        );
    }

    #[tokio::test]
    async fn internal_faults_are_not_leaked() {
        let resp = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = String::from_utf8(bytes.to_vec()).expect("utf8 body");
        assert!(!body.contains("secret detail"));
        assert!(body.contains("Server Error"));
    }

    #[test]
    fn row_not_found_maps_to_transaction_abort() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::TransactionAborted(_)));
    }
}
