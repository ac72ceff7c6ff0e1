//! Ironing Checkout Library
//!
//! Pricing core and checkout service for a pickup & delivery ironing
//! business: catalog, carts, quotes, coupons, tips, checkout and live chat.

// Domain modules
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod coupon;
pub mod pricing;

// Infrastructure
pub mod collaborator;
pub mod config;
pub mod error;
pub mod router;
pub mod state;
pub mod telemetry;
