use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diner_types::domain::order::{LifecycleError, UnknownStatus};
use diner_types::ports::RepoError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// At least one dish id in a new order does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// The operation is not allowed in the order's current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::InvalidTransition { .. } => AppError::InvalidTransition(e.to_string()),
            LifecycleError::NotCancellable(_) => AppError::InvalidState(e.to_string()),
        }
    }
}

impl From<UnknownStatus> for AppError {
    fn from(e: UnknownStatus) -> Self {
        AppError::InvalidStatus(e.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(m) => AppError::Conflict(m),
            RepoError::DbError(m) => AppError::Internal(anyhow::anyhow!(m)),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::BadRequest(_) | AppError::InvalidReference(_) | AppError::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::InvalidTransition(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let msg = match self {
            AppError::Internal(_) => "internal error".to_string(),
            AppError::BadRequest(m)
            | AppError::NotFound(m)
            | AppError::InvalidReference(m)
            | AppError::InvalidStatus(m)
            | AppError::InvalidState(m)
            | AppError::InvalidTransition(m)
            | AppError::Conflict(m) => m,
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diner_types::domain::order::OrderStatus;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidReference("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidStatus("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidState("x".into()), StatusCode::CONFLICT),
            (AppError::InvalidTransition("x".into()), StatusCode::CONFLICT),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.into_response().status(), code);
        }
    }

    #[test]
    fn lifecycle_errors_map_to_distinct_kinds() {
        let skip = LifecycleError::InvalidTransition {
            from: OrderStatus::InProcessing,
            to: OrderStatus::Delivering,
        };
        assert!(matches!(AppError::from(skip), AppError::InvalidTransition(_)));

        let late = LifecycleError::NotCancellable(OrderStatus::Preparing);
        assert!(matches!(AppError::from(late), AppError::InvalidState(_)));

        let unknown = UnknownStatus("unknown".into());
        assert!(matches!(AppError::from(unknown), AppError::InvalidStatus(_)));
    }
}
