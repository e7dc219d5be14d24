//! Workflow CRUD and the `/validate` endpoint: a thin persistence shell
//! (an in-memory `HashMap` standing in for the "persistence layer" §1
//! names as an external collaborator) plus the one call into the real
//! core of this crate, `agentforge_registry::validate`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use agentforge_core::{Workflow, WorkflowId, WorkflowStatus};
use agentforge_protocol::{ApiResponse, PaginatedResponse, ValidationResultWire};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

const DEFAULT_PAGE_SIZE: u32 = 20;

pub async fn list_workflows(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Json<ApiResponse<PaginatedResponse<Workflow>>> {
    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let workflows = state.workflows.read().await;
    let mut items: Vec<Workflow> = workflows.values().cloned().collect();
    items.sort_by(|a, b| a.meta.created_at.cmp(&b.meta.created_at));
    let total = items.len() as u64;

    let start = (page as usize) * (page_size as usize);
    let page_items = items.into_iter().skip(start).take(page_size as usize).collect();

    Json(ApiResponse::success(PaginatedResponse::new(page_items, total, page, page_size)))
}

pub async fn create_workflow(
    State(state): State<AppState>,
    Json(mut workflow): Json<Workflow>,
) -> (StatusCode, Json<ApiResponse<Workflow>>) {
    workflow.meta.version = 1;
    workflow.meta.created_at = Utc::now();
    workflow.meta.updated_at = workflow.meta.created_at;
    workflow.status = WorkflowStatus::Draft;

    let mut workflows = state.workflows.write().await;
    workflows.insert(workflow.id.clone(), workflow.clone());

    (StatusCode::CREATED, Json(ApiResponse::success(workflow)))
}

pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Workflow>>, ApiError> {
    let id = WorkflowId::from(id);
    let workflows = state.workflows.read().await;
    let workflow = workflows.get(&id).ok_or_else(|| ApiError::WorkflowNotFound(id.to_string()))?;
    Ok(Json(ApiResponse::success(workflow.clone())))
}

/// Update a workflow. The incoming body's `meta.version` must match the
/// stored version (optimistic concurrency, §6); on success the stored
/// version is bumped and the workflow is reset to `draft` status,
/// matching the invariant documented on [`agentforge_core::WorkflowMeta::version`].
pub async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut body): Json<Workflow>,
) -> Result<Json<ApiResponse<Workflow>>, ApiError> {
    let id = WorkflowId::from(id);
    let mut workflows = state.workflows.write().await;
    let existing = workflows.get(&id).ok_or_else(|| ApiError::WorkflowNotFound(id.to_string()))?;

    if body.meta.version != existing.meta.version {
        return Err(ApiError::VersionConflict {
            expected: existing.meta.version,
            actual: body.meta.version,
        });
    }

    body.id = id.clone();
    body.meta.version += 1;
    body.meta.created_at = existing.meta.created_at;
    body.meta.updated_at = Utc::now();
    body.status = WorkflowStatus::Draft;
    workflows.insert(id, body.clone());

    Ok(Json(ApiResponse::success(body)))
}

pub async fn delete_workflow(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let id = WorkflowId::from(id);
    let mut workflows = state.workflows.write().await;
    match workflows.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// Run the validation orchestrator (C6) over the stored workflow and
/// persist the resulting status, returning the wire-form result (§6).
pub async fn validate_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ValidationResultWire>, ApiError> {
    let id = WorkflowId::from(id);
    let registry = state.registry.read().await;
    let mut workflows = state.workflows.write().await;
    let workflow = workflows.get_mut(&id).ok_or_else(|| ApiError::WorkflowNotFound(id.to_string()))?;

    let outcome = agentforge_registry::validate(workflow, Some(&*registry));
    workflow.status = if outcome.is_valid() { WorkflowStatus::Valid } else { WorkflowStatus::Invalid };

    Ok(Json(ValidationResultWire::from(&outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentforge_core::WorkflowMeta;
    use axum::extract::{Path, Query, State};
    use axum::Json;

    fn workflow(id: &str) -> Workflow {
        Workflow {
            id: WorkflowId::from(id),
            status: WorkflowStatus::Draft,
            meta: WorkflowMeta {
                name: id.to_string(),
                description: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                owner_id: "owner".into(),
                version: 1,
            },
            nodes: vec![],
            edges: vec![],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let state = AppState::new();
        let (_, created) = create_workflow(State(state.clone()), Json(workflow("wf-1"))).await;
        assert_eq!(created.0.data.as_ref().unwrap().meta.version, 1);

        let fetched = get_workflow(State(state), Path("wf-1".to_string())).await.unwrap();
        assert_eq!(fetched.0.data.unwrap().id, WorkflowId::from("wf-1"));
    }

    #[tokio::test]
    async fn update_with_stale_version_is_rejected() {
        let state = AppState::new();
        create_workflow(State(state.clone()), Json(workflow("wf-1"))).await;

        let mut stale = workflow("wf-1");
        stale.meta.version = 0;
        let result = update_workflow(State(state), Path("wf-1".to_string()), Json(stale)).await;
        assert!(matches!(result, Err(ApiError::VersionConflict { expected: 1, actual: 0 })));
    }

    #[tokio::test]
    async fn get_missing_workflow_is_not_found() {
        let state = AppState::new();
        let result = get_workflow(State(state), Path("missing".to_string())).await;
        assert!(matches!(result, Err(ApiError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn list_workflows_paginates() {
        let state = AppState::new();
        create_workflow(State(state.clone()), Json(workflow("wf-1"))).await;
        create_workflow(State(state.clone()), Json(workflow("wf-2"))).await;

        let page = list_workflows(
            State(state),
            Query(PaginationParams { page: Some(0), page_size: Some(1) }),
        )
        .await;
        let body = page.0.data.unwrap();
        assert_eq!(body.total, 2);
        assert_eq!(body.items.len(), 1);
        assert!(body.has_more);
    }
}
