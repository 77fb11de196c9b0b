use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    dispatcher::ExecutionService,
    error::Error,
    types::{ExecutionRequest, ExecutionResult},
};

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub language: String,
    pub code: &'static str,
}

pub fn router(service: Arc<ExecutionService>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/execute", post(execute))
        .route("/seed/{language}", get(seed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// Always 200: the dispatcher converts every failure into the result contract.
async fn execute(
    State(service): State<Arc<ExecutionService>>,
    Json(request): Json<ExecutionRequest>,
) -> Json<ExecutionResult> {
    Json(service.execute(&request.language, &request.code).await)
}

async fn seed(
    State(service): State<Arc<ExecutionService>>,
    Path(language): Path<String>,
) -> Json<SeedResponse> {
    let code = service.initial_code(&language);
    Json(SeedResponse { language, code })
}

pub async fn serve(service: Arc<ExecutionService>, addr: SocketAddr) -> Result<(), Error> {
    let app = router(service);
    info!("starting snippet execution server on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
