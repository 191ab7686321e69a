use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::state_machine::InvalidTransition};

/// Errors produced by the game core and the service layer.
///
/// Every variant is a synchronous rejection that leaves the game state
/// untouched; the core never partially applies a transition.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced player (or other resource) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The action is not permitted in the current game phase.
    #[error("invalid phase: {0}")]
    InvalidPhase(String),
    /// The actor lacks the required role for this action.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The player's wallet cannot cover the requested debit.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// Malformed or semantically invalid request payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A collaborator (question source, leaderboard store) is unreachable.
    #[error("collaborator unavailable")]
    Unavailable(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Missing(what) => ServiceError::NotFound(what),
            StorageError::InvalidPayload(message) => ServiceError::InvalidInput(message),
            err => ServiceError::Unavailable(err),
        }
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidPhase(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Actor lacks the required role (admin, answering player).
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with the current game phase.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Wallet balance too low for the requested debit.
    #[error("payment required: {0}")]
    PaymentRequired(String),
    /// Collaborator unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::InvalidPhase(message) => AppError::Conflict(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InsufficientFunds(message) => AppError::PaymentRequired(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_status_codes() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidPhase("x".into()), StatusCode::CONFLICT),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                ServiceError::InsufficientFunds("x".into()),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ServiceError::InvalidInput("x".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
