use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub const API_TOKEN_HEADER: &str = "x-api-key";

fn token_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

/// Gate for the control routes. Open when no `API_TOKEN` is configured.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response<Body>, Response<Body>> {
    let authorized = match &state.config.api_token {
        Some(expected) => token_matches(request.headers(), expected),
        None => true,
    };

    if authorized {
        return Ok(next.run(request).await);
    }

    Err((StatusCode::UNAUTHORIZED, "missing or invalid api token").into_response())
}
