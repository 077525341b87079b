use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use haiku_db::StoreError;
use haiku_types::api::{ErrorResponse, ErrorsResponse};

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed credentials")]
    MalformedCredentials,

    /// Covers both "no such author" and "wrong password".
    #[error("unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    /// Body-level failures, reported as a list under `errors`.
    #[error("invalid request body: {}", .0.join("; "))]
    InvalidBody(Vec<String>),

    #[error("{0}")]
    WeakCredential(String),

    #[error("{field} already taken!")]
    DuplicateKey { field: String },

    #[error("vote 'direction' must be -1 or 1")]
    InvalidDirection,

    #[error("{0}")]
    NotFound(String),

    #[error("haiku not found!")]
    ReferenceViolation,

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConstraintViolation { constraint } => Self::DuplicateKey { field: constraint },
            StoreError::ReferenceViolation => Self::ReferenceViolation,
            other => Self::StoreUnavailable(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Validation(_)
            | Self::InvalidBody(_)
            | Self::WeakCredential(_)
            | Self::DuplicateKey { .. }
            | Self::InvalidDirection => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::ReferenceViolation => StatusCode::NOT_FOUND,
            Self::HashingFailure(_) | Self::StoreUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::InvalidBody(errors) => (status, Json(ErrorsResponse { errors })).into_response(),
            other if status.is_server_error() => {
                // Detail stays in the log; callers get the generic message.
                error!("{}", other);
                (
                    status,
                    Json(ErrorResponse {
                        error: INTERNAL_MESSAGE.to_string(),
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_becomes_duplicate_key() {
        let err = ApiError::from(StoreError::ConstraintViolation {
            constraint: "username".into(),
        });
        assert_eq!(err.to_string(), "username already taken!");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn reference_violation_is_not_found() {
        let err = ApiError::from(StoreError::ReferenceViolation);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_failures_are_500() {
        assert_eq!(
            ApiError::from(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::HashingFailure("out of memory".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failures_are_401() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MalformedCredentials.status(), StatusCode::UNAUTHORIZED);
    }
}
