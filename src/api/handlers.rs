//! HTTP request handlers

use super::types::{ErrorResponse, PingResponse};
use super::AppState;
use crate::interaction::{Interaction, RenderInstruction};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Header the chat transport echoes back from webhook registration
pub const SECRET_HEADER: &str = "x-bot-api-secret-token";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/interactions", post(post_interaction))
        .route("/ping", get(ping))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Interactions
// ============================================================

async fn post_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Interaction>, JsonRejection>,
) -> Result<Json<RenderInstruction>, AppError> {
    if let Some(expected) = state.secret_token.as_deref() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if !provided.is_some_and(|token| constant_time_eq(token, expected)) {
            tracing::warn!("Rejected interaction with missing or wrong secret token");
            return Err(AppError::Unauthorized);
        }
    }

    let Json(interaction) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(state.engine.respond(interaction).await))
}

/// Compare without exiting at the first differing byte
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

// ============================================================
// Health
// ============================================================

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

async fn get_version() -> &'static str {
    concat!("infinite-buttons ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
