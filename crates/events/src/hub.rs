//! Server-side hub-and-spoke event producer (§5): one producer per
//! execution id, many subscribers, each with its own bounded outbox.
//!
//! Backpressure policy on a full outbox: `LOG_EMITTED` is dropped
//! silently (it has no bearing on the node/execution state machine);
//! every other kind is never dropped — instead the hub pushes a best-
//! effort `ERROR{code: overflow}` and leaves the event itself unsent,
//! since a client that can't keep up needs to know its view may be
//! stale far more than it needs any individual state transition.

use std::collections::HashMap;
use std::sync::Arc;

use agentforge_core::ExecutionId;
use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::event::{ExecutionEvent, ProtocolErrorCode};

/// Default bounded capacity for a subscriber's outbox.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

struct Subscriber {
    id: Uuid,
    sender: mpsc::Sender<ExecutionEvent>,
}

/// Fans out execution events to whichever subscribers are currently
/// registered for that execution id. Cheaply cloneable; every clone
/// shares the same subscriber table.
#[derive(Clone)]
pub struct ExecutionHub {
    subscribers: Arc<RwLock<HashMap<ExecutionId, Vec<Subscriber>>>>,
}

impl ExecutionHub {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new subscriber for `execution_id`, returning its id
    /// (for later `unsubscribe`) and the receiving half of its outbox.
    pub async fn subscribe(&self, execution_id: ExecutionId) -> (Uuid, mpsc::Receiver<ExecutionEvent>) {
        self.subscribe_with_capacity(execution_id, DEFAULT_OUTBOX_CAPACITY).await
    }

    pub async fn subscribe_with_capacity(
        &self,
        execution_id: ExecutionId,
        capacity: usize,
    ) -> (Uuid, mpsc::Receiver<ExecutionEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let id = Uuid::new_v4();
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(execution_id)
            .or_default()
            .push(Subscriber { id, sender: tx });
        (id, rx)
    }

    /// Idempotent: unsubscribing a subscriber id that isn't registered
    /// (already dropped, already removed) is a no-op.
    pub async fn unsubscribe(&self, execution_id: &ExecutionId, subscriber_id: Uuid) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(handles) = subscribers.get_mut(execution_id) {
            handles.retain(|s| s.id != subscriber_id);
            if handles.is_empty() {
                subscribers.remove(execution_id);
            }
        }
    }

    pub async fn subscriber_count(&self, execution_id: &ExecutionId) -> usize {
        self.subscribers
            .read()
            .await
            .get(execution_id)
            .map_or(0, Vec::len)
    }

    /// Fan `event` out to every subscriber of its execution id. Events
    /// with no execution id (`CONNECTED`) are not routed through this
    /// hub at all — they're answered directly on the connection that
    /// asked for them.
    pub async fn publish(&self, event: ExecutionEvent) {
        let Some(execution_id) = event.execution_id().cloned() else {
            return;
        };

        let subscribers = self.subscribers.read().await;
        let Some(handles) = subscribers.get(&execution_id) else {
            return;
        };

        for handle in handles {
            if let Err(err) = handle.sender.try_send(event.clone()) {
                if event.is_droppable() {
                    tracing::debug!(execution_id = %execution_id, "dropping log event: subscriber outbox full");
                    continue;
                }
                tracing::warn!(execution_id = %execution_id, error = %err, "subscriber outbox full, sending overflow error");
                let _ = handle.sender.try_send(ExecutionEvent::Error {
                    execution_id: Some(execution_id.clone()),
                    code: ProtocolErrorCode::Overflow,
                    message: "subscriber outbox full".into(),
                    timestamp: Utc::now(),
                });
            }
        }
    }
}

impl Default for ExecutionHub {
    fn default() -> Self {
        Self::new()
    }
}
