//! Execution endpoints: trigger a validated workflow, inspect or list
//! executions, and cancel an in-flight one. Triggering hands off to the
//! simulated driver (`crate::driver`) rather than any real agent runtime
//! (out of scope, §1); this module's job is validation gating, Execution
//! bookkeeping, and wiring the cancellation flag the driver polls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use agentforge_core::{Execution, ExecutionId, ValidationOutcome, WorkflowId};
use agentforge_protocol::{ApiResponse, PaginatedResponse, ValidationErrorWire};

use crate::error::ApiError;
use crate::state::AppState;
use crate::workflows::PaginationParams;

#[derive(Debug, Serialize)]
pub struct ExecutionStarted {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub status: String,
}

/// Validate the workflow and, if valid, start a simulated execution of
/// it. Returns `422` with the validator's errors if the workflow does
/// not pass (invariant 8: only a validated snapshot may be executed).
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<ExecutionStarted>>), ApiError> {
    let workflow_id = WorkflowId::from(id);

    let workflow = {
        let workflows = state.workflows.read().await;
        workflows
            .get(&workflow_id)
            .cloned()
            .ok_or_else(|| ApiError::WorkflowNotFound(workflow_id.to_string()))?
    };

    let registry = state.registry.read().await;
    let outcome = agentforge_registry::validate(&workflow, Some(&*registry));
    drop(registry);

    let execution_order = match outcome {
        ValidationOutcome::Valid { execution_order } => execution_order,
        ValidationOutcome::Invalid { errors } => {
            let wire: Vec<ValidationErrorWire> = errors.iter().map(ValidationErrorWire::from).collect();
            let body = ApiResponse::<ExecutionStarted>::error(
                "VALIDATION_FAILED",
                &format!("workflow failed validation with {} error(s)", wire.len()),
            );
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)));
        }
    };

    let execution = Execution::new(&workflow, "api", serde_json::json!({}));
    let execution_id = execution.id.clone();

    state.executions.write().await.insert(execution_id.clone(), execution);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    state.cancel_flags.write().await.insert(execution_id.clone(), cancel_flag.clone());

    tokio::spawn(crate::driver::run(state.clone(), execution_id.clone(), execution_order, cancel_flag));

    let body = ExecutionStarted {
        execution_id: execution_id.clone(),
        workflow_id: workflow.id,
        status: "running".into(),
    };
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(body))))
}

pub async fn list_executions(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Json<ApiResponse<PaginatedResponse<Execution>>> {
    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).max(1);

    let executions = state.executions.read().await;
    let mut items: Vec<Execution> = executions.values().cloned().collect();
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    let total = items.len() as u64;

    let start = (page as usize) * (page_size as usize);
    let page_items = items.into_iter().skip(start).take(page_size as usize).collect();

    Json(ApiResponse::success(PaginatedResponse::new(page_items, total, page, page_size)))
}

pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Execution>>, ApiError> {
    let id = ExecutionId::from(id);
    let executions = state.executions.read().await;
    let execution = executions.get(&id).ok_or_else(|| ApiError::ExecutionNotFound(id.to_string()))?;
    Ok(Json(ApiResponse::success(execution.clone())))
}

/// Signal the driver to stop. Per §5, cancellation is an out-of-band
/// request: the only contract is that the event stream eventually
/// terminates with `EXECUTION_CANCELLED` and no `NODE_RUNNING` is
/// followed by `NODE_COMPLETED` after the flag is observed.
pub async fn cancel_execution(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let id = ExecutionId::from(id);
    let flags = state.cancel_flags.read().await;
    match flags.get(&id) {
        Some(flag) => {
            flag.store(true, Ordering::SeqCst);
            StatusCode::ACCEPTED
        }
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::{Node, NodeConfig, Position, PortType, Workflow, WorkflowMeta, WorkflowStatus};
    use axum::extract::{Path, State};
    use axum::Json;
    use chrono::Utc;

    fn single_input_node_workflow() -> Workflow {
        Workflow {
            id: WorkflowId::from("wf-1"),
            status: WorkflowStatus::Draft,
            meta: WorkflowMeta {
                name: "wf".into(),
                description: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                owner_id: "owner".into(),
                version: 1,
            },
            nodes: vec![Node {
                id: agentforge_core::NodeId::from("in"),
                label: "in".into(),
                position: Position::default(),
                config: NodeConfig::Input { data_type: PortType::String },
            }],
            edges: vec![],
        }
    }

    #[tokio::test]
    async fn executing_a_valid_workflow_starts_a_running_execution() {
        let state = AppState::new();
        let workflow = single_input_node_workflow();
        state.workflows.write().await.insert(workflow.id.clone(), workflow);

        let (status, body) = execute_workflow(State(state), Path("wf-1".to_string())).await.unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body.0.data.unwrap().status, "running");
    }

    #[tokio::test]
    async fn executing_an_empty_workflow_reports_no_entry_node() {
        let state = AppState::new();
        let mut workflow = single_input_node_workflow();
        workflow.nodes.clear();
        state.workflows.write().await.insert(workflow.id.clone(), workflow);

        let (status, _) = execute_workflow(State(state), Path("wf-1".to_string())).await.unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn cancel_unknown_execution_is_not_found() {
        let state = AppState::new();
        let status = cancel_execution(State(state), Path("nope".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
