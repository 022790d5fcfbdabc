use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app::dispatch_use_case::DispatchUseCase;
use crate::observability;
use crate::pipeline::ingestion::EventBatch;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "csv-gate",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Receives one bucket notification batch and runs it to completion.
async fn events(Extension(dispatcher): Extension<Arc<DispatchUseCase>>, body: String) -> impl IntoResponse {
    match EventBatch::from_json(&body) {
        Ok(batch) => {
            let ack = dispatcher.handle(&batch).await;
            (StatusCode::OK, Json(ack)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rejected notification batch");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn metrics_text() -> impl IntoResponse {
    observability::render()
}

pub fn create_server(dispatcher: Arc<DispatchUseCase>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(events))
        .route("/metrics", get(metrics_text))
        .layer(Extension(dispatcher))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Start the HTTP receiver on the specified port
pub async fn start_server(dispatcher: Arc<DispatchUseCase>, port: u16) -> anyhow::Result<()> {
    let app = create_server(dispatcher);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Listening for bucket notifications on POST /events");
    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
