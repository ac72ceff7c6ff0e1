//! REST API handlers for the chat outbox

use super::{
    models::{ChatMessage, ConfirmMessageInput, FailMessageInput, IncomingMessage, SendMessageInput},
    outbox::{OutboxError, Reconciled},
};
use crate::{error::ApiError, state::SharedState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/chat/:conversation_id", get(list_messages))
        .route("/chat/:conversation_id/messages", post(send_message))
        .route(
            "/chat/:conversation_id/messages/:client_id/confirm",
            post(confirm_message),
        )
        .route(
            "/chat/:conversation_id/messages/:client_id/fail",
            post(fail_message),
        )
        .route(
            "/chat/:conversation_id/messages/:client_id/retry",
            post(retry_message),
        )
        .route("/chat/:conversation_id/incoming", post(receive_message))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse {
    conversation_id: Uuid,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ReceiveResponse {
    result: Reconciled,
}

/// Endpoint: GET /chat/:conversation_id
async fn list_messages(
    State(state): State<SharedState>,
    Path(conversation_id): Path<Uuid>,
) -> Json<ConversationResponse> {
    let messages = state
        .chats
        .get(&conversation_id)
        .map(|outbox| outbox.messages().to_vec())
        .unwrap_or_default();
    Json(ConversationResponse {
        conversation_id,
        messages,
    })
}

/// Endpoint: POST /chat/:conversation_id/messages
async fn send_message(
    State(state): State<SharedState>,
    Path(conversation_id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> Result<Json<ChatMessage>, ApiError> {
    let client_id = input.client_id.unwrap_or_else(Uuid::new_v4);
    let mut outbox = state.chats.entry(conversation_id).or_default();
    let message = outbox.enqueue(client_id, &input.content, Utc::now())?.clone();

    debug!(%conversation_id, %client_id, "queued chat message");
    Ok(Json(message))
}

/// Endpoint: POST /chat/:conversation_id/messages/:client_id/confirm
async fn confirm_message(
    State(state): State<SharedState>,
    Path((conversation_id, client_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<ConfirmMessageInput>,
) -> Result<Json<ChatMessage>, ApiError> {
    let mut outbox = state
        .chats
        .get_mut(&conversation_id)
        .ok_or(OutboxError::UnknownMessage(client_id))?;
    let message = outbox.confirm(client_id, input.server_id, input.created_at)?;
    Ok(Json(message.clone()))
}

/// Endpoint: POST /chat/:conversation_id/messages/:client_id/fail
async fn fail_message(
    State(state): State<SharedState>,
    Path((conversation_id, client_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<FailMessageInput>,
) -> Result<Json<ChatMessage>, ApiError> {
    let mut outbox = state
        .chats
        .get_mut(&conversation_id)
        .ok_or(OutboxError::UnknownMessage(client_id))?;
    let message = outbox.fail(client_id, &input.reason)?;
    Ok(Json(message.clone()))
}

/// Endpoint: POST /chat/:conversation_id/messages/:client_id/retry
async fn retry_message(
    State(state): State<SharedState>,
    Path((conversation_id, client_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ChatMessage>, ApiError> {
    let mut outbox = state
        .chats
        .get_mut(&conversation_id)
        .ok_or(OutboxError::UnknownMessage(client_id))?;
    let message = outbox.retry(client_id)?;
    Ok(Json(message.clone()))
}

/// Endpoint: POST /chat/:conversation_id/incoming
/// Feeds a message from the real-time channel through reconciliation.
async fn receive_message(
    State(state): State<SharedState>,
    Path(conversation_id): Path<Uuid>,
    Json(incoming): Json<IncomingMessage>,
) -> Json<ReceiveResponse> {
    let server_id = incoming.server_id;
    let result = state
        .chats
        .entry(conversation_id)
        .or_default()
        .receive(incoming);

    debug!(%conversation_id, %server_id, ?result, "reconciled incoming chat message");
    Json(ReceiveResponse { result })
}
