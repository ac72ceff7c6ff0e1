//! Checkout Module
//!
//! - Order lifecycle, final amount and order record (models)
//! - The aggregator that fixes the charged amount
//! - Checkout sessions and their state machine
//! - Payment processor and order storage interfaces
//! - Orchestration service and REST API handlers

pub mod aggregator;
pub mod handlers;
pub mod models;
pub mod orders;
pub mod payment;
pub mod service;
pub mod session;

pub use aggregator::finalize;
pub use handlers::routes;
pub use models::{CheckoutError, FinalCheckoutAmount, OrderRecord, OrderStatus};
pub use orders::{InMemoryOrderStore, OrderStore};
pub use payment::{PaymentGateway, SandboxGateway};
pub use service::CheckoutService;
pub use session::{CheckoutSession, CheckoutView, PricingContext};
