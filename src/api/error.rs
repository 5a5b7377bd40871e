use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::aggregator::AggregateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidTarget(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidTarget(_) => "INVALID_TARGET",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AggregateError> for ApiError {
    fn from(value: AggregateError) -> Self {
        match value {
            AggregateError::InvalidTarget(err) => ApiError::InvalidTarget(err.to_string()),
        }
    }
}
