//! Agent registry endpoints. A thin REST front for the in-memory
//! `AgentRegistry` the semantic validator (M1, M2) reads from — the
//! counterpart to the teacher's server-registry endpoints (`/api/servers`),
//! generalized from scheduling targets to agent definitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use agentforge_core::{AgentDefinition, AgentId};
use agentforge_protocol::ApiResponse;

use crate::state::AppState;

pub async fn list_agents(State(state): State<AppState>) -> Json<ApiResponse<Vec<AgentDefinition>>> {
    let registry = state.registry.read().await;
    Json(ApiResponse::success(registry.definitions().cloned().collect()))
}

pub async fn register_agent(
    State(state): State<AppState>,
    Json(definition): Json<AgentDefinition>,
) -> (StatusCode, Json<ApiResponse<AgentDefinition>>) {
    let mut registry = state.registry.write().await;
    registry.register(definition.clone());
    (StatusCode::CREATED, Json(ApiResponse::success(definition)))
}

pub async fn unregister_agent(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let mut registry = state.registry.write().await;
    if registry.unregister(&AgentId::from(id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
