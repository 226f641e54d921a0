//! Bearer token check for the cron-triggered routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::error::AppError;
use super::AppState;

/// Route layer guarding the cron routes with the configured secret.
///
/// Runs before any body extractor, so a rejected request never has its
/// body read.
pub async fn cron_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_bearer(request.headers(), state.cron_secret.as_deref())?;
    Ok(next.run(request).await)
}

/// Require `Authorization: Bearer <secret>`.
///
/// With no secret configured nothing is authorized.
pub fn require_bearer(headers: &HeaderMap, secret: Option<&str>) -> Result<(), AppError> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return Err(AppError::Unauthorized);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == secret => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}
