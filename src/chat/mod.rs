//! Live Chat Module
//!
//! - Message models and API inputs
//! - The outbox: pending/confirmed/failed messages reconciled by idempotency id
//! - REST API handlers
//!
//! Delivery to the chat backend happens elsewhere; this module only tracks
//! message state.

pub mod handlers;
pub mod models;
pub mod outbox;

pub use handlers::routes;
pub use outbox::{ChatOutbox, OutboxError, Reconciled};
