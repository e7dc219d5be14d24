//! AgentForge API server.
//!
//! A thin axum HTTP + WebSocket shell demonstrating how an external
//! caller drives the validator (`agentforge-registry`) and consumes the
//! execution event stream (`agentforge-events`). Transport, persistence,
//! auth, and the real agent execution runtime are all out of scope of
//! the core this binary fronts (§1) — this crate exists only so the
//! workspace ships a runnable entrypoint, the same way the teacher's
//! workspace does.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod agents;
mod driver;
mod error;
mod executions;
mod state;
mod workflows;
mod ws;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,agentforge_api=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new();

    let app = Router::new()
        .route("/api/workflows", get(workflows::list_workflows).post(workflows::create_workflow))
        .route(
            "/api/workflows/{id}",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route("/api/workflows/{id}/validate", post(workflows::validate_workflow))
        .route("/api/workflows/{id}/execute", post(executions::execute_workflow))
        .route("/api/executions", get(executions::list_executions))
        .route("/api/executions/{id}", get(executions::get_execution))
        .route("/api/executions/{id}/cancel", post(executions::cancel_execution))
        .route("/api/agents", get(agents::list_agents).post(agents::register_agent))
        .route("/api/agents/{id}", axum::routing::delete(agents::unregister_agent))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;
    tracing::info!("starting agentforge-api on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
