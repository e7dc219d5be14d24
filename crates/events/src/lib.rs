//! Execution event contract (C7): the event envelope types, the
//! node/execution state machine (reusing `agentforge_core`'s), the
//! hub-and-spoke server-side producer, and the client-side reducer.
//!
//! The wire-level subscribe/unsubscribe message type lives in
//! `agentforge-protocol` instead of here, since it carries no behavior of
//! its own beyond being a message shape — `ExecutionHub::subscribe` and
//! `::unsubscribe` take a plain `ExecutionId`, and it's the API layer's
//! job to parse a wire message into one before calling them.

pub mod event;
pub mod hub;
pub mod reducer;

pub use event::{EventEnvelope, ExecutionEvent, LogLevel, ProtocolErrorCode};
pub use hub::{ExecutionHub, DEFAULT_OUTBOX_CAPACITY};
pub use reducer::{ExecutionView, LogLine, LOG_BUFFER_CAPACITY};
