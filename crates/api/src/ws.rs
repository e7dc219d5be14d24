//! WebSocket endpoint for the execution event stream (§5, §6): a client
//! sends `{action: "subscribe"|"unsubscribe", executionId}` text frames
//! and receives `ExecutionEvent` records back, one per frame, fanned out
//! from the [`agentforge_events::ExecutionHub`] this connection's
//! subscriptions are registered against.
//!
//! One task owns the socket's write half and drains an internal channel;
//! the read loop and every per-subscription forwarding task send into
//! that channel rather than writing to the socket directly, since axum's
//! `SplitSink` can't be shared across tasks without one.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use agentforge_core::ExecutionId;
use agentforge_events::{ExecutionEvent, ProtocolErrorCode};
use agentforge_protocol::SubscriptionRequest;

use crate::state::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

struct ActiveSubscription {
    subscriber_id: Uuid,
    forward_task: JoinHandle<()>,
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4().to_string();
    let _ = send_event(
        &out_tx,
        &ExecutionEvent::Connected {
            connection_id: connection_id.clone(),
            user_id: None,
            tenant_id: None,
            role: "viewer".into(),
            timestamp: Utc::now(),
        },
    );

    let mut subscriptions: HashMap<ExecutionId, ActiveSubscription> = HashMap::new();

    while let Some(Ok(message)) = stream.next().await {
        let Message::Text(text) = message else {
            continue;
        };

        let request: SubscriptionRequest = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(err) => {
                if send_event(
                    &out_tx,
                    &ExecutionEvent::Error {
                        execution_id: None,
                        code: ProtocolErrorCode::Malformed,
                        message: err.to_string(),
                        timestamp: Utc::now(),
                    },
                )
                .is_err()
                {
                    break;
                }
                continue;
            }
        };

        match request {
            SubscriptionRequest::Subscribe { execution_id } => {
                if let std::collections::hash_map::Entry::Vacant(slot) = subscriptions.entry(execution_id.clone()) {
                    let (subscriber_id, mut rx) = state.hub.subscribe(execution_id.clone()).await;
                    let forward_tx = out_tx.clone();
                    let forward_task = tokio::spawn(async move {
                        while let Some(event) = rx.recv().await {
                            if send_event(&forward_tx, &event).is_err() {
                                break;
                            }
                        }
                    });
                    slot.insert(ActiveSubscription { subscriber_id, forward_task });
                }

                if send_event(
                    &out_tx,
                    &ExecutionEvent::Ack {
                        execution_id: Some(execution_id),
                        request_id: connection_id.clone(),
                        timestamp: Utc::now(),
                    },
                )
                .is_err()
                {
                    break;
                }
            }
            SubscriptionRequest::Unsubscribe { execution_id } => {
                if let Some(active) = subscriptions.remove(&execution_id) {
                    active.forward_task.abort();
                    state.hub.unsubscribe(&execution_id, active.subscriber_id).await;
                }

                if send_event(
                    &out_tx,
                    &ExecutionEvent::Ack {
                        execution_id: Some(execution_id),
                        request_id: connection_id.clone(),
                        timestamp: Utc::now(),
                    },
                )
                .is_err()
                {
                    break;
                }
            }
        }
    }

    for (execution_id, active) in subscriptions {
        active.forward_task.abort();
        state.hub.unsubscribe(&execution_id, active.subscriber_id).await;
    }
    writer_task.abort();
}

fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &ExecutionEvent) -> Result<(), ()> {
    let text = serde_json::to_string(event).map_err(|_| ())?;
    tx.send(Message::Text(text.into())).map_err(|_| ())
}
