//! Client→server subscription messages (§6):
//! `{action: "subscribe"|"unsubscribe", executionId}`. Both are
//! idempotent at the hub, so this type carries no request id of its own.

use agentforge_core::ExecutionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SubscriptionRequest {
    Subscribe { execution_id: ExecutionId },
    Unsubscribe { execution_id: ExecutionId },
}

impl SubscriptionRequest {
    pub fn execution_id(&self) -> &ExecutionId {
        match self {
            Self::Subscribe { execution_id } | Self::Unsubscribe { execution_id } => execution_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_message_round_trips() {
        let msg = SubscriptionRequest::Subscribe {
            execution_id: ExecutionId::from("exec-1"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["action"], "subscribe");
        assert_eq!(json["executionId"], "exec-1");

        let parsed: SubscriptionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn unsubscribe_message_round_trips() {
        let msg = SubscriptionRequest::Unsubscribe {
            execution_id: ExecutionId::from("exec-1"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: SubscriptionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.execution_id(), &ExecutionId::from("exec-1"));
    }
}
