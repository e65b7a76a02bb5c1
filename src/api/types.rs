//! API response types

use serde::Serialize;

/// Liveness reply
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
