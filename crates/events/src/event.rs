//! The execution event contract (C7): every event a running execution
//! can emit, tagged on `event` so the wire form is a flat object with an
//! `event` discriminant plus whichever fields that kind carries — no
//! separate nested `payload` object, since an internally-tagged enum
//! already produces exactly that shape.
//!
//! Modeled directly on the teacher's `Event` enum: one tagged enum per
//! kind, each variant carrying only the fields relevant to it, plus
//! small accessor methods (`execution_id`, `node_id`, `timestamp`) for
//! code that wants to handle events generically without matching on
//! every variant.

use agentforge_core::{ExecutionId, ExecutionStatus, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a [`ExecutionEvent::LogEmitted`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Closed taxonomy of protocol-level (as opposed to validation-level)
/// failures (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorCode {
    Overflow,
    Unauthorized,
    UnknownExecution,
    Malformed,
}

/// One event on the execution event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ExecutionEvent {
    /// Fired once per channel, not scoped to any one execution.
    Connected {
        connection_id: String,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        tenant_id: Option<String>,
        role: String,
        timestamp: DateTime<Utc>,
    },
    ExecutionStarted {
        execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    ExecutionCompleted {
        execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    ExecutionFailed {
        execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    ExecutionCancelled {
        execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    NodeQueued {
        execution_id: ExecutionId,
        node_id: NodeId,
        timestamp: DateTime<Utc>,
    },
    NodeRunning {
        execution_id: ExecutionId,
        node_id: NodeId,
        retry_count: u32,
        timestamp: DateTime<Utc>,
    },
    NodeCompleted {
        execution_id: ExecutionId,
        node_id: NodeId,
        timestamp: DateTime<Utc>,
    },
    NodeFailed {
        execution_id: ExecutionId,
        node_id: NodeId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    NodeSkipped {
        execution_id: ExecutionId,
        node_id: NodeId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    NodeCacheHit {
        execution_id: ExecutionId,
        node_id: NodeId,
        timestamp: DateTime<Utc>,
    },
    LogEmitted {
        execution_id: ExecutionId,
        node_id: NodeId,
        level: LogLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
    ResumeStart {
        execution_id: ExecutionId,
        parent_execution_id: ExecutionId,
        resumed_from_node_id: NodeId,
        skipped_count: u32,
        rerun_count: u32,
        timestamp: DateTime<Utc>,
    },
    NodeOutputReused {
        execution_id: ExecutionId,
        node_id: NodeId,
        source_execution_id: ExecutionId,
        timestamp: DateTime<Utc>,
    },
    ResumeComplete {
        execution_id: ExecutionId,
        status: ExecutionStatus,
        timestamp: DateTime<Utc>,
    },
    Ack {
        #[serde(default)]
        execution_id: Option<ExecutionId>,
        request_id: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        #[serde(default)]
        execution_id: Option<ExecutionId>,
        code: ProtocolErrorCode,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ExecutionEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Connected { timestamp, .. }
            | Self::ExecutionStarted { timestamp, .. }
            | Self::ExecutionCompleted { timestamp, .. }
            | Self::ExecutionFailed { timestamp, .. }
            | Self::ExecutionCancelled { timestamp, .. }
            | Self::NodeQueued { timestamp, .. }
            | Self::NodeRunning { timestamp, .. }
            | Self::NodeCompleted { timestamp, .. }
            | Self::NodeFailed { timestamp, .. }
            | Self::NodeSkipped { timestamp, .. }
            | Self::NodeCacheHit { timestamp, .. }
            | Self::LogEmitted { timestamp, .. }
            | Self::ResumeStart { timestamp, .. }
            | Self::NodeOutputReused { timestamp, .. }
            | Self::ResumeComplete { timestamp, .. }
            | Self::Ack { timestamp, .. }
            | Self::Error { timestamp, .. } => *timestamp,
        }
    }

    /// The execution this event belongs to, if any. `Connected` is
    /// channel-scoped rather than execution-scoped; `Ack`/`Error` may be
    /// either, depending on what they're responding to.
    pub fn execution_id(&self) -> Option<&ExecutionId> {
        match self {
            Self::Connected { .. } => None,
            Self::ExecutionStarted { execution_id, .. }
            | Self::ExecutionCompleted { execution_id, .. }
            | Self::ExecutionFailed { execution_id, .. }
            | Self::ExecutionCancelled { execution_id, .. }
            | Self::NodeQueued { execution_id, .. }
            | Self::NodeRunning { execution_id, .. }
            | Self::NodeCompleted { execution_id, .. }
            | Self::NodeFailed { execution_id, .. }
            | Self::NodeSkipped { execution_id, .. }
            | Self::NodeCacheHit { execution_id, .. }
            | Self::LogEmitted { execution_id, .. }
            | Self::ResumeStart { execution_id, .. }
            | Self::NodeOutputReused { execution_id, .. }
            | Self::ResumeComplete { execution_id, .. } => Some(execution_id),
            Self::Ack { execution_id, .. } | Self::Error { execution_id, .. } => execution_id.as_ref(),
        }
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeQueued { node_id, .. }
            | Self::NodeRunning { node_id, .. }
            | Self::NodeCompleted { node_id, .. }
            | Self::NodeFailed { node_id, .. }
            | Self::NodeSkipped { node_id, .. }
            | Self::NodeCacheHit { node_id, .. }
            | Self::LogEmitted { node_id, .. }
            | Self::NodeOutputReused { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Whether this is one of the (exactly one, per invariant) terminal
    /// events for an execution as a whole.
    pub fn is_execution_terminal(&self) -> bool {
        matches!(
            self,
            Self::ExecutionCompleted { .. } | Self::ExecutionFailed { .. } | Self::ExecutionCancelled { .. }
        )
    }

    /// Droppable under backpressure: everything except `LOG_EMITTED` must
    /// reach the subscriber, since log lines are the only kind with no
    /// bearing on the node/execution state machine (§5).
    pub fn is_droppable(&self) -> bool {
        matches!(self, Self::LogEmitted { .. })
    }
}

/// Sequenced wrapper around an [`ExecutionEvent`], used by the hub to
/// hand out a stable, gap-detectable ordering to subscribers — mirrors
/// the teacher's `EventEnvelope` (there, wrapping a WAL-persisted event;
/// here, wrapping one fanned out to live subscribers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub sequence: u64,
    pub event: ExecutionEvent,
}

impl EventEnvelope {
    pub fn new(sequence: u64, event: ExecutionEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            event,
        }
    }
}
