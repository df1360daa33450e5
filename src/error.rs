/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AxsrfError (発行失敗) を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::axsrf::AxsrfError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = ErrorResponseBody {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AxsrfError> for AppError {
    fn from(e: AxsrfError) -> Self {
        match e {
            // Caller supplied claims the issuer cannot sign
            AxsrfError::PayloadNotObject
            | AxsrfError::PayloadHasExp
            | AxsrfError::Payload(_)
            | AxsrfError::ExpiryOutOfRange => AppError::InvalidRequest(e.to_string()),

            // RNG / key / signing failures are server-side
            AxsrfError::Entropy(_) | AxsrfError::Key | AxsrfError::Sign(_) => {
                tracing::error!(error = %e, "credential issuance failed");
                AppError::Internal
            }
        }
    }
}
