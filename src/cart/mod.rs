//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (Cart, inputs, responses)
//! - Business logic helpers (cart ids, formatting)
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{Cart, CartError};
