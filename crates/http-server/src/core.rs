use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay::{Relay, RelayError};
use serde_json::json;
use thiserror::Error;

// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub config: AppConfig,
}

// The slice of configuration the HTTP layer itself needs.
#[derive(Clone)]
pub struct AppConfig {
    pub expose_error_trace: bool,
}

// Errors as the HTTP caller sees them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        trace: Option<Vec<String>>,
    },
}

impl ApiError {
    /// Maps a pipeline error, optionally keeping its full source chain.
    pub fn from_relay(err: RelayError, expose_trace: bool) -> Self {
        if err.is_validation() {
            return ApiError::Validation(err.to_string());
        }
        let trace = expose_trace.then(|| error_chain(&err));
        ApiError::Upstream {
            message: err.to_string(),
            trace,
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

// Convert `ApiError` into an HTTP response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Upstream {
                message,
                trace: None,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Upstream {
                message,
                trace: Some(trace),
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message, "trace": trace })),
            )
                .into_response(),
        }
    }
}
