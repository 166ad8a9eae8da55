use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("server configuration error: {0}")] Config(String),
    #[error("method not allowed")] MethodNotAllowed,
    #[error("bad request: {0}")] BadRequest(String),
    #[error("{message}")] Upstream { status: u16, message: String },
    #[error("transport error: {0}")] Transport(#[from] reqwest::Error),
    #[error("model returned invalid JSON: {0}")] Content(String),
    #[error("model returned an unexpected shape: {0}")] Shape(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn upstream(status: u16, provider: &str) -> Self {
        GatewayError::Upstream {
            status,
            message: format!("{provider} API Error: {status}"),
        }
    }

    /// HTTP status the caller sees. Upstream statuses are proxied as-is when valid.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Config(_)
            | GatewayError::Transport(_)
            | GatewayError::Content(_)
            | GatewayError::Shape(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            GatewayError::MethodNotAllowed => "Method not allowed".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
