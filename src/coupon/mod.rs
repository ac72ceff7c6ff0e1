//! Coupon Adjustment Module
//!
//! - Coupon records and applications (models)
//! - Validation rules and discount computation
//! - Coupon storage interface and in-memory store

pub mod models;
pub mod store;
pub mod validate;

pub use models::{Coupon, CouponApplication, CouponType, UsageOutcome};
pub use store::{CouponStore, InMemoryCouponStore};
pub use validate::{check_coupon, compute_discount, validate, CouponError};
