//! Order storage

use super::models::OrderRecord;
use crate::collaborator::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts or updates the record with `record.id`, returning its order number.
    ///
    /// An order keeps the number assigned on first save.
    async fn save_order(&self, record: &OrderRecord) -> Result<String, StoreError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<Uuid, OrderRecord>,
    sequence: AtomicU64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn next_number(&self) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("IR-{:06}", n)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_order(&self, record: &OrderRecord) -> Result<String, StoreError> {
        let mut entry = self.orders.entry(record.id).or_insert_with(|| record.clone());
        let number = match entry.order_number.clone() {
            Some(number) => number,
            None => self.next_number(),
        };

        *entry = OrderRecord {
            order_number: Some(number.clone()),
            ..record.clone()
        };
        debug!(order_id = %record.id, order_number = %number, status = %record.status, "saved order");
        Ok(number)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.orders.get(&id).map(|r| r.clone()))
    }
}
