//! AgentForge wire protocol: the validator's external interface (§6), the
//! subscription message shapes, and generic API response wrappers for the
//! demonstration API. Event wire records are `agentforge_events::ExecutionEvent`
//! directly — its `Serialize` impl already produces the `event`/camelCase-field
//! shape §6 describes, so no separate DTO is needed for it here.

pub mod api_response;
pub mod subscription;
pub mod validation;

pub use agentforge_events::ExecutionEvent;
pub use api_response::{ApiError, ApiResponse, PaginatedResponse};
pub use subscription::SubscriptionRequest;
pub use validation::{ValidationErrorWire, ValidationResultWire};
