//! HTTP surface for the generation gateway.
//!
//! `POST /api/generate` is the only endpoint that reaches the upstream model;
//! every other method on that path is answered with 405 without touching it.

use anyhow::Result;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::wire::{GenerateRequest, GenerationResult};

pub type ApiState = Arc<Gateway>;

pub fn router(gateway: ApiState) -> Router {
    Router::new()
        .route("/api/generate", post(generate).fallback(method_not_allowed))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

async fn generate(
    State(gateway): State<ApiState>,
    body: Bytes,
) -> Result<Json<GenerationResult>, GatewayError> {
    // Missing key wins over any body problem.
    gateway.check_key().map_err(|e| {
        error!("rejecting request: {e}");
        e
    })?;
    let req: GenerateRequest =
        serde_json::from_slice(&body).map_err(|e| GatewayError::BadRequest(e.to_string()))?;

    match gateway.generate(&req).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            if e.status().is_server_error() {
                error!(mode = %req.mode, "generation failed: {e}");
            }
            Err(e)
        }
    }
}

async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

async fn health_check(State(gateway): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ideazen",
        "model": gateway.settings().model,
    }))
}

pub struct ApiServer {
    addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(addr: String, gateway: Gateway) -> Self {
        Self { addr, state: Arc::new(gateway) }
    }

    pub async fn start(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("IdeaZen API listening on http://{}/api/generate", listener.local_addr()?);
        axum::serve(listener, router(self.state.clone()))
            .await
            .map_err(|e| anyhow::anyhow!("API server stopped: {e}"))
    }
}
