//! Simulated execution driver.
//!
//! The actual agent execution runtime is explicitly out of scope (§1);
//! this demonstration shell still needs something to drive the event
//! stream so a caller can watch an execution's events arrive in the
//! order the contract describes. It walks the planner's execution order
//! and synthesizes the same `NODE_*`/`EXECUTION_*` events a real runtime
//! would report, pacing each step so a subscriber has something to
//! observe, rather than invoking any agent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentforge_core::{ExecutionId, ExecutionStatus, NodeExecStatus, NodeId};
use agentforge_events::{ExecutionEvent, LogLevel};
use chrono::Utc;

use crate::state::AppState;

const STEP_DELAY: Duration = Duration::from_millis(30);

pub async fn run(state: AppState, execution_id: ExecutionId, execution_order: Vec<NodeId>, cancel: Arc<AtomicBool>) {
    state
        .hub
        .publish(ExecutionEvent::ExecutionStarted {
            execution_id: execution_id.clone(),
            timestamp: Utc::now(),
        })
        .await;
    set_execution_status(&state, &execution_id, ExecutionStatus::Running).await;

    for (position, node_id) in execution_order.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            cancel_from(&state, &execution_id, &execution_order[position..]).await;
            return;
        }

        state
            .hub
            .publish(ExecutionEvent::NodeQueued {
                execution_id: execution_id.clone(),
                node_id: node_id.clone(),
                timestamp: Utc::now(),
            })
            .await;
        set_node_status(&state, &execution_id, node_id, NodeExecStatus::Queued).await;
        tokio::time::sleep(STEP_DELAY).await;

        if cancel.load(Ordering::SeqCst) {
            cancel_from(&state, &execution_id, &execution_order[position..]).await;
            return;
        }

        state
            .hub
            .publish(ExecutionEvent::NodeRunning {
                execution_id: execution_id.clone(),
                node_id: node_id.clone(),
                retry_count: 0,
                timestamp: Utc::now(),
            })
            .await;
        set_node_status(&state, &execution_id, node_id, NodeExecStatus::Running).await;
        state
            .hub
            .publish(ExecutionEvent::LogEmitted {
                execution_id: execution_id.clone(),
                node_id: node_id.clone(),
                level: LogLevel::Info,
                message: format!("node {node_id} running"),
                timestamp: Utc::now(),
            })
            .await;
        tokio::time::sleep(STEP_DELAY).await;

        state
            .hub
            .publish(ExecutionEvent::NodeCompleted {
                execution_id: execution_id.clone(),
                node_id: node_id.clone(),
                timestamp: Utc::now(),
            })
            .await;
        set_node_status(&state, &execution_id, node_id, NodeExecStatus::Completed).await;
    }

    state
        .hub
        .publish(ExecutionEvent::ExecutionCompleted {
            execution_id: execution_id.clone(),
            timestamp: Utc::now(),
        })
        .await;
    set_execution_status(&state, &execution_id, ExecutionStatus::Completed).await;
}

async fn cancel_from(state: &AppState, execution_id: &ExecutionId, remaining: &[NodeId]) {
    for node_id in remaining {
        state
            .hub
            .publish(ExecutionEvent::NodeSkipped {
                execution_id: execution_id.clone(),
                node_id: node_id.clone(),
                reason: "execution cancelled".into(),
                timestamp: Utc::now(),
            })
            .await;
        set_node_status(state, execution_id, node_id, NodeExecStatus::Skipped).await;
    }
    state
        .hub
        .publish(ExecutionEvent::ExecutionCancelled {
            execution_id: execution_id.clone(),
            timestamp: Utc::now(),
        })
        .await;
    set_execution_status(state, execution_id, ExecutionStatus::Cancelled).await;
}

async fn set_execution_status(state: &AppState, execution_id: &ExecutionId, status: ExecutionStatus) {
    let mut executions = state.executions.write().await;
    if let Some(execution) = executions.get_mut(execution_id) {
        execution.status = status;
        match status {
            ExecutionStatus::Running => execution.started_at = Some(Utc::now()),
            s if s.is_terminal() => execution.completed_at = Some(Utc::now()),
            _ => {}
        }
    }
}

async fn set_node_status(state: &AppState, execution_id: &ExecutionId, node_id: &NodeId, status: NodeExecStatus) {
    let mut executions = state.executions.write().await;
    if let Some(execution) = executions.get_mut(execution_id) {
        if let Some(node_state) = execution.node_state_mut(node_id) {
            node_state.status = status;
            match status {
                NodeExecStatus::Running => node_state.started_at = Some(Utc::now()),
                s if s.is_terminal() => node_state.completed_at = Some(Utc::now()),
                _ => {}
            }
        }
    }
}
