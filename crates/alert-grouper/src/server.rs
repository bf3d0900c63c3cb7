//! HTTP server for Alertmanager webhooks.

use anyhow::Result;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::GroupingEngine;
use crate::event::WebhookPayload;
use crate::tracker::TicketTracker;

/// Build the webhook router.
pub fn build_router<T>(engine: Arc<GroupingEngine<T>>) -> Router
where
    T: TicketTracker + 'static,
{
    Router::new()
        .route("/alert", post(alert_handler::<T>))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server<T>(engine: Arc<GroupingEngine<T>>, addr: &str) -> Result<()>
where
    T: TicketTracker + 'static,
{
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Alert grouper listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Response for the alert webhook.
#[derive(Debug, Serialize)]
struct AlertResponse {
    message: &'static str,
    results: Vec<String>,
}

/// Alertmanager webhook handler. Alerts are processed one after another;
/// per-alert failures show up in `results`.
async fn alert_handler<T>(
    State(engine): State<Arc<GroupingEngine<T>>>,
    Json(payload): Json<WebhookPayload>,
) -> Json<AlertResponse>
where
    T: TicketTracker + 'static,
{
    info!(
        alerts = payload.alerts.len(),
        receiver = payload.receiver.as_deref().unwrap_or(""),
        "Received alert webhook"
    );

    let results = engine.process_batch(&payload).await;

    Json(AlertResponse {
        message: "ok",
        results,
    })
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
