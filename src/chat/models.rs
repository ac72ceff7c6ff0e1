//! Chat Domain Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    Agent,
}

/// Where a message is in its round trip to the chat backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Shown locally, not yet acknowledged
    Pending,
    /// Stored by the backend under `server_id`
    Confirmed,
    /// Rejected; may be retried
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Idempotency id chosen by the sender
    pub client_id: Uuid,
    pub server_id: Option<Uuid>,
    pub sender_type: SenderType,
    pub content: String,
    pub state: DeliveryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Chat API Models
// =============================================================================

/// Input for `POST /chat/:conversation_id/messages`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    /// Generated server-side when absent
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub content: String,
}

/// Input for `POST /chat/:conversation_id/messages/:client_id/confirm`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMessageInput {
    pub server_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for `POST /chat/:conversation_id/messages/:client_id/fail`
#[derive(Debug, Deserialize)]
pub struct FailMessageInput {
    pub reason: String,
}

/// A message pushed by the backend's real-time feed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub server_id: Uuid,
    /// Present when the message originated from this outbox
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub sender_type: SenderType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
