//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::SubmitError;

/// Structured error body returned by all endpoints on failure
#[derive(Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `COMPETITION_INACTIVE`,
    /// `ALREADY_SOLVED`, `NOT_FOUND`, `INTERNAL_ERROR`.
    pub code: &'static str,
    /// Human-readable error description
    pub message: String,
}

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    CompetitionInactive,
    AlreadySolved,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::CompetitionInactive => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "COMPETITION_INACTIVE",
                    message: "The competition is not active".into(),
                },
            ),
            AppError::AlreadySolved => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "ALREADY_SOLVED",
                    message: "This task is already solved by the team".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "INTERNAL_ERROR",
                    message: msg,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::CompetitionInactive => AppError::CompetitionInactive,
            SubmitError::AlreadySolved => AppError::AlreadySolved,
            SubmitError::UnknownTask(id) => AppError::NotFound(format!("Unknown task: {}", id)),
            SubmitError::UnknownTeam(id) => AppError::NotFound(format!("Unknown team: {}", id)),
        }
    }
}
