pub mod admin;
pub mod matches;

use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{PgMatchStore, PgUserStore};
use crate::matching::MatchEngine;
use crate::utils::Config;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<PgUserStore>,
    pub matches: Arc<PgMatchStore>,
    pub engine: Arc<MatchEngine>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ErrorResponse = (StatusCode, Json<ApiError>);

pub(crate) fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

pub(crate) fn unauthorized() -> ErrorResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError {
            error: "unauthorized".to_string(),
        }),
    )
}

pub(crate) fn not_found(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

pub(crate) fn conflict(message: impl Into<String>) -> ErrorResponse {
    (
        StatusCode::CONFLICT,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

pub(crate) fn internal_error() -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "internal error".to_string(),
        }),
    )
}
