//! Chat outbox
//!
//! Outgoing messages are queued under a client-generated id and move
//! `pending → confirmed` or `pending → failed → pending` (retry). Messages
//! arriving from the real-time feed are reconciled against that id and the
//! server id, so an echo of our own message never shows up twice.

use super::models::{ChatMessage, DeliveryState, IncomingMessage, SenderType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutboxError {
    #[error("Message content cannot be empty")]
    EmptyMessage,

    #[error("unknown message: {0}")]
    UnknownMessage(Uuid),

    #[error("message {0} is already confirmed")]
    AlreadyConfirmed(Uuid),

    #[error("message {0} has not failed")]
    NotFailed(Uuid),
}

/// What [`ChatOutbox::receive`] did with an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciled {
    /// Acknowledged one of our pending messages
    Confirmed,
    /// A new message from the other side
    Appended,
    /// Already present; dropped
    Duplicate,
}

#[derive(Debug, Clone, Default)]
pub struct ChatOutbox {
    messages: Vec<ChatMessage>,
}

impl ChatOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.state == DeliveryState::Pending)
    }

    fn position(&self, client_id: Uuid) -> Result<usize, OutboxError> {
        self.messages
            .iter()
            .position(|m| m.client_id == client_id)
            .ok_or(OutboxError::UnknownMessage(client_id))
    }

    /// Queues a user message. Re-sending an id returns the queued message.
    pub fn enqueue(
        &mut self,
        client_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<&ChatMessage, OutboxError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(OutboxError::EmptyMessage);
        }
        if let Ok(i) = self.position(client_id) {
            return Ok(&self.messages[i]);
        }

        self.messages.push(ChatMessage {
            client_id,
            server_id: None,
            sender_type: SenderType::User,
            content: content.to_string(),
            state: DeliveryState::Pending,
            error: None,
            created_at: now,
        });
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Marks a message as stored by the backend.
    ///
    /// The real-time echo of the stored row can arrive first, without our
    /// client id; it was appended as someone else's message and is dropped
    /// here in favour of the queued entry.
    pub fn confirm(
        &mut self,
        client_id: Uuid,
        server_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<&ChatMessage, OutboxError> {
        self.position(client_id)?;
        self.messages
            .retain(|m| m.client_id == client_id || m.server_id != Some(server_id));

        let i = self.position(client_id)?;
        let message = &mut self.messages[i];
        message.server_id = Some(server_id);
        message.created_at = created_at;
        message.state = DeliveryState::Confirmed;
        message.error = None;
        Ok(message)
    }

    pub fn fail(&mut self, client_id: Uuid, reason: &str) -> Result<&ChatMessage, OutboxError> {
        let i = self.position(client_id)?;
        let message = &mut self.messages[i];
        if message.state == DeliveryState::Confirmed {
            return Err(OutboxError::AlreadyConfirmed(client_id));
        }
        message.state = DeliveryState::Failed;
        message.error = Some(reason.to_string());
        Ok(message)
    }

    /// Puts a failed message back in the queue under the same id
    pub fn retry(&mut self, client_id: Uuid) -> Result<&ChatMessage, OutboxError> {
        let i = self.position(client_id)?;
        let message = &mut self.messages[i];
        if message.state != DeliveryState::Failed {
            return Err(OutboxError::NotFailed(client_id));
        }
        message.state = DeliveryState::Pending;
        message.error = None;
        Ok(message)
    }

    /// Merges a message from the real-time feed
    pub fn receive(&mut self, incoming: IncomingMessage) -> Reconciled {
        if self
            .messages
            .iter()
            .any(|m| m.server_id == Some(incoming.server_id))
        {
            return Reconciled::Duplicate;
        }

        if let Some(client_id) = incoming.client_id {
            if let Ok(i) = self.position(client_id) {
                let message = &mut self.messages[i];
                message.server_id = Some(incoming.server_id);
                message.created_at = incoming.created_at;
                message.state = DeliveryState::Confirmed;
                message.error = None;
                return Reconciled::Confirmed;
            }
        }

        self.messages.push(ChatMessage {
            client_id: incoming.client_id.unwrap_or(incoming.server_id),
            server_id: Some(incoming.server_id),
            sender_type: incoming.sender_type,
            content: incoming.content,
            state: DeliveryState::Confirmed,
            error: None,
            created_at: incoming.created_at,
        });
        Reconciled::Appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(server_id: Uuid, client_id: Option<Uuid>, sender: SenderType) -> IncomingMessage {
        IncomingMessage {
            server_id,
            client_id,
            sender_type: sender,
            content: "hello".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn echo_of_own_message_confirms_instead_of_duplicating() {
        let mut outbox = ChatOutbox::new();
        let client_id = Uuid::new_v4();
        outbox.enqueue(client_id, "Do you iron sarees?", Utc::now()).unwrap();
        assert_eq!(outbox.pending().count(), 1);

        let server_id = Uuid::new_v4();
        let echo = incoming(server_id, Some(client_id), SenderType::User);
        assert_eq!(outbox.receive(echo.clone()), Reconciled::Confirmed);
        assert_eq!(outbox.receive(echo), Reconciled::Duplicate);

        assert_eq!(outbox.messages().len(), 1);
        assert_eq!(outbox.messages()[0].state, DeliveryState::Confirmed);
        assert_eq!(outbox.messages()[0].server_id, Some(server_id));
    }

    #[test]
    fn echo_arriving_before_confirm_is_merged() {
        let mut outbox = ChatOutbox::new();
        let client_id = Uuid::new_v4();
        let server_id = Uuid::new_v4();
        outbox.enqueue(client_id, "Pickup tomorrow?", Utc::now()).unwrap();

        // The stored row carries no client id
        let echo = incoming(server_id, None, SenderType::User);
        assert_eq!(outbox.receive(echo.clone()), Reconciled::Appended);

        let confirmed = outbox.confirm(client_id, server_id, Utc::now()).unwrap();
        assert_eq!(confirmed.client_id, client_id);
        assert_eq!(confirmed.content, "Pickup tomorrow?");

        assert_eq!(outbox.messages().len(), 1);
        assert_eq!(outbox.messages()[0].state, DeliveryState::Confirmed);
        assert_eq!(outbox.receive(echo), Reconciled::Duplicate);
        assert_eq!(outbox.messages().len(), 1);
    }

    #[test]
    fn agent_replies_are_appended_once() {
        let mut outbox = ChatOutbox::new();
        let reply = incoming(Uuid::new_v4(), None, SenderType::Agent);
        assert_eq!(outbox.receive(reply.clone()), Reconciled::Appended);
        assert_eq!(outbox.receive(reply), Reconciled::Duplicate);
        assert_eq!(outbox.messages().len(), 1);
    }

    #[test]
    fn failed_messages_can_be_retried() {
        let mut outbox = ChatOutbox::new();
        let id = Uuid::new_v4();
        outbox.enqueue(id, "hi", Utc::now()).unwrap();

        assert_eq!(outbox.retry(id), Err(OutboxError::NotFailed(id)));
        let failed = outbox.fail(id, "offline").unwrap();
        assert_eq!(failed.error.as_deref(), Some("offline"));

        let retried = outbox.retry(id).unwrap();
        assert_eq!(retried.state, DeliveryState::Pending);
        assert!(retried.error.is_none());

        outbox.confirm(id, Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(outbox.fail(id, "late"), Err(OutboxError::AlreadyConfirmed(id)));
    }

    #[test]
    fn enqueue_is_idempotent_and_rejects_blank_text() {
        let mut outbox = ChatOutbox::new();
        let id = Uuid::new_v4();
        outbox.enqueue(id, " first ", Utc::now()).unwrap();
        let again = outbox.enqueue(id, "second", Utc::now()).unwrap();
        assert_eq!(again.content, "first");
        assert_eq!(outbox.messages().len(), 1);

        assert_eq!(
            outbox.enqueue(Uuid::new_v4(), "   ", Utc::now()),
            Err(OutboxError::EmptyMessage)
        );
        let stranger = Uuid::new_v4();
        assert_eq!(
            outbox.confirm(stranger, Uuid::new_v4(), Utc::now()),
            Err(OutboxError::UnknownMessage(stranger))
        );
    }
}
