//! Coupon storage
//!
//! The coupon table lives in the hosted backend; this module defines the
//! interface the checkout needs from it plus an in-memory implementation.

use super::models::{normalize_code, Coupon, UsageOutcome};
use crate::collaborator::{SourceError, StoreError};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Looks a coupon up by its normalized (upper-case) code
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    /// Increments `used_count` on behalf of `order_id`.
    ///
    /// Implementations must count each order at most once and never count
    /// past `usage_limit`.
    async fn record_usage(&self, coupon_id: Uuid, order_id: Uuid)
        -> Result<UsageOutcome, StoreError>;
}

/// Coupons keyed by code, with a redemption ledger keyed by order
#[derive(Default)]
pub struct InMemoryCouponStore {
    coupons: DashMap<String, Coupon>,
    redemptions: DashMap<Uuid, Uuid>,
}

impl InMemoryCouponStore {
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let store = Self::default();
        for mut coupon in coupons {
            coupon.code = normalize_code(&coupon.code);
            store.coupons.insert(coupon.code.clone(), coupon);
        }
        store
    }

    /// Seeds the store from a JSON array of coupon rows
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let coupons: Vec<Coupon> = serde_json::from_str(&raw)?;
        info!(coupons = coupons.len(), path = %path.as_ref().display(), "seeded coupon store");
        Ok(Self::new(coupons))
    }

    /// Current state of a coupon, for inspection
    pub fn get(&self, code: &str) -> Option<Coupon> {
        self.coupons.get(&normalize_code(code)).map(|c| c.clone())
    }
}

#[async_trait]
impl CouponStore for InMemoryCouponStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        Ok(self.get(code))
    }

    async fn record_usage(
        &self,
        coupon_id: Uuid,
        order_id: Uuid,
    ) -> Result<UsageOutcome, StoreError> {
        // Holding the ledger entry serialises concurrent confirmations of one order.
        let slot = match self.redemptions.entry(order_id) {
            Entry::Occupied(_) => return Ok(UsageOutcome::AlreadyRecorded),
            Entry::Vacant(slot) => slot,
        };

        let mut coupon = self
            .coupons
            .iter_mut()
            .find(|c| c.id == coupon_id)
            .ok_or_else(|| StoreError::NotFound(format!("coupon {}", coupon_id)))?;
        if coupon.is_exhausted() {
            return Ok(UsageOutcome::LimitReached);
        }
        coupon.used_count = coupon.used_count.saturating_add(1);
        slot.insert(coupon_id);

        Ok(UsageOutcome::Recorded)
    }
}
