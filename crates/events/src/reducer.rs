//! Client-side reducer: folds a stream of [`ExecutionEvent`]s into a
//! point-in-time view of an execution's state.
//!
//! The reducer is total (it never panics or rejects an event, including
//! one that arrives out of the expected order) and idempotent on
//! duplicate terminal events — applying the same `NODE_FAILED` twice, or
//! an `EXECUTION_COMPLETED` after the execution is already `Failed`, is a
//! no-op rather than an error. Per §5, the client is expected to run one
//! reducer per execution id, single-threaded.

use std::collections::{HashMap, VecDeque};

use agentforge_core::{ExecutionId, ExecutionStatus, NodeExecStatus, NodeExecutionState, NodeId};
use chrono::{DateTime, Utc};

use crate::event::{ExecutionEvent, LogLevel};

/// Maximum number of log lines the ring buffer retains; the oldest line
/// is evicted once a new one arrives past this capacity (§4.6: "logs
/// (ring buffer, most recent N)").
pub const LOG_BUFFER_CAPACITY: usize = 200;

/// One retained `LOG_EMITTED` line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub node_id: NodeId,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A running (or finished) execution's state, as observed purely through
/// its event stream.
#[derive(Debug, Clone)]
pub struct ExecutionView {
    pub execution_id: Option<ExecutionId>,
    pub status: Option<ExecutionStatus>,
    pub node_states: HashMap<NodeId, NodeExecutionState>,
    logs: VecDeque<LogLine>,
}

impl Default for ExecutionView {
    fn default() -> Self {
        Self {
            execution_id: None,
            status: None,
            node_states: HashMap::new(),
            logs: VecDeque::new(),
        }
    }
}

impl ExecutionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_status(&self, node_id: &NodeId) -> NodeExecStatus {
        self.node_states.get(node_id).map(|s| s.status).unwrap_or_default()
    }

    pub fn node_state(&self, node_id: &NodeId) -> Option<&NodeExecutionState> {
        self.node_states.get(node_id)
    }

    /// Log lines currently retained, oldest first.
    pub fn logs(&self) -> impl Iterator<Item = &LogLine> {
        self.logs.iter()
    }

    /// Fold one event into the view. Events for a different execution id
    /// than the one already observed are ignored rather than panicking —
    /// a caller multiplexing several reducers by id should route before
    /// calling `apply`, but a misrouted event here is a bug to log, not a
    /// reason to crash the reducer.
    pub fn apply(&mut self, event: &ExecutionEvent) {
        use ExecutionEvent::*;

        if let Some(id) = event.execution_id() {
            match &self.execution_id {
                Some(existing) if existing != id => return,
                _ => self.execution_id.get_or_insert_with(|| id.clone()),
            };
        }

        let timestamp = event.timestamp();
        match event {
            ExecutionStarted { .. } => self.set_status(ExecutionStatus::Running),
            ExecutionCompleted { .. } => self.set_status(ExecutionStatus::Completed),
            ExecutionFailed { .. } => self.set_status(ExecutionStatus::Failed),
            ExecutionCancelled { .. } => self.set_status(ExecutionStatus::Cancelled),
            NodeQueued { node_id, .. } => self.transition_node(node_id, NodeExecStatus::Queued, timestamp, None),
            NodeRunning { node_id, retry_count, .. } => {
                self.transition_node(node_id, NodeExecStatus::Running, timestamp, None);
                if let Some(state) = self.node_states.get_mut(node_id) {
                    state.retry_count = *retry_count;
                }
            }
            NodeCompleted { node_id, .. } | NodeCacheHit { node_id, .. } | NodeOutputReused { node_id, .. } => {
                self.transition_node(node_id, NodeExecStatus::Completed, timestamp, None)
            }
            NodeFailed { node_id, error, .. } => {
                self.transition_node(node_id, NodeExecStatus::Failed, timestamp, Some(error.clone()))
            }
            NodeSkipped { node_id, .. } => self.transition_node(node_id, NodeExecStatus::Skipped, timestamp, None),
            LogEmitted { node_id, level, message, .. } => {
                self.push_log(LogLine {
                    node_id: node_id.clone(),
                    level: *level,
                    message: message.clone(),
                    timestamp,
                });
            }
            Connected { .. } | ResumeStart { .. } | ResumeComplete { .. } | Ack { .. } | Error { .. } => {}
        }
    }

    fn set_status(&mut self, to: ExecutionStatus) {
        if let Some(current) = self.status {
            if current.is_terminal() {
                return;
            }
        }
        self.status = Some(to);
    }

    /// Apply a transition to a node's state, stamping `started_at`/
    /// `completed_at` exactly as §4.6 specifies: `RUNNING` sets
    /// `started_at` only if it was absent, any terminal status sets
    /// `completed_at`. A node already in a terminal status is left
    /// untouched (idempotent on duplicate or out-of-order terminals).
    fn transition_node(&mut self, node_id: &NodeId, to: NodeExecStatus, timestamp: DateTime<Utc>, error: Option<String>) {
        let state = self
            .node_states
            .entry(node_id.clone())
            .or_insert_with(|| NodeExecutionState::pending(node_id.clone()));

        if state.status.is_terminal() {
            return;
        }

        state.status = to;
        if to == NodeExecStatus::Running && state.started_at.is_none() {
            state.started_at = Some(timestamp);
        }
        if to.is_terminal() {
            state.completed_at = Some(timestamp);
        }
        if error.is_some() {
            state.error = error;
        }
    }

    fn push_log(&mut self, line: LogLine) {
        self.logs.push_back(line);
        while self.logs.len() > LOG_BUFFER_CAPACITY {
            self.logs.pop_front();
        }
    }
}
