//! Quote Pricing Module
//!
//! Canonical pricing rules used by the calculator, the quote page and the
//! payment page:
//! - Pricing configuration and results (models)
//! - The pure pricing engine
//! - Tip menu and tip computation
//! - Currency rounding helpers
//! - REST API handler for quotes

pub mod engine;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod tip;

pub use engine::price;
pub use handlers::routes;
pub use models::{PricingConfig, PricingError, PricingResult};
pub use tip::{compute_tip, TipPercentage};
