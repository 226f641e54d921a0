use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Trading signal error: {0}")]
    Signal(String),

    #[error("Chain error: {0}")]
    Chain(String),
}

#[derive(Serialize)]
struct UnauthorizedResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized => {
                tracing::warn!(error_code = "UNAUTHORIZED", "Rejected request without valid bearer token");
                let body = Json(UnauthorizedResponse {
                    success: false,
                    message: self.to_string(),
                });
                return (StatusCode::UNAUTHORIZED, body).into_response();
            }
            AppError::InvalidParam(param) => {
                tracing::warn!(param = %param, error_code = "INVALID_PARAM", "Invalid parameter");
                (StatusCode::BAD_REQUEST, "INVALID_PARAM")
            }
            AppError::NotConfigured(what) => {
                tracing::warn!(component = %what, error_code = "NOT_CONFIGURED", "Component not configured");
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED")
            }
            AppError::Signal(msg) => {
                tracing::error!(message = %msg, error_code = "SIGNAL_ERROR", "Trading signal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "SIGNAL_ERROR")
            }
            AppError::Chain(msg) => {
                tracing::error!(message = %msg, error_code = "CHAIN_ERROR", "Chain error");
                (StatusCode::BAD_GATEWAY, "CHAIN_ERROR")
            }
        };

        // Signal failures report the bare upstream message
        let error = match &self {
            AppError::Signal(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
