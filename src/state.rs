//! Application State
//!
//! Everything the handlers share: the catalog loaded at start-up, the pricing
//! rules, carts, checkout sessions, chat outboxes and the injected
//! collaborators.

use crate::{
    cart::models::Cart,
    catalog::{load_catalog, CatalogLoad, CatalogSource, FileCatalogSource, Catalog},
    chat::ChatOutbox,
    checkout::{
        CheckoutError, CheckoutService, CheckoutSession, InMemoryOrderStore, PaymentGateway,
        PricingContext, SandboxGateway,
    },
    collaborator::{Collaborator, SourceError},
    config::{AppConfig, PaymentMode},
    coupon::{Coupon, CouponStore, InMemoryCouponStore},
    pricing::PricingConfig,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// A checkout session behind the lock that serialises its operations
pub type SessionHandle = Arc<Mutex<CheckoutSession>>;

pub struct AppState {
    pub catalog: Catalog,

    /// Soft warning shown while the fallback price list is in use
    pub catalog_warning: Option<String>,

    pub pricing: PricingConfig,

    /// Carts keyed by cart id.
    /// DashMap allows concurrent access without external Mutexes.
    pub carts: DashMap<String, Cart>,

    pub sessions: DashMap<Uuid, SessionHandle>,

    /// Paid or ended sessions are evicted this long after closing
    pub session_retention: Duration,

    /// Chat outboxes keyed by conversation id
    pub chats: DashMap<Uuid, ChatOutbox>,

    pub checkout: CheckoutService,
}

impl AppState {
    pub fn new(catalog: CatalogLoad, pricing: PricingConfig, checkout: CheckoutService) -> Self {
        Self {
            catalog: catalog.catalog,
            catalog_warning: catalog.warning,
            pricing,
            carts: DashMap::new(),
            sessions: DashMap::new(),
            session_retention: Duration::minutes(15),
            chats: DashMap::new(),
            checkout,
        }
    }

    /// Wires collaborators as described by `config`
    pub async fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let source: Collaborator<dyn CatalogSource> = match &config.catalog_path {
            Some(path) => Collaborator::configured(Arc::new(FileCatalogSource::new(path.clone()))),
            None => Collaborator::Unconfigured,
        };
        let catalog = load_catalog(&source).await;

        let coupons: Collaborator<dyn CouponStore> = match &config.coupons_path {
            Some(path) => {
                Collaborator::configured(Arc::new(InMemoryCouponStore::from_json_file(path).await?))
            }
            None => {
                info!("COUPONS_PATH not set, coupon codes will be rejected as unavailable");
                Collaborator::Unconfigured
            }
        };

        let payments: Collaborator<dyn PaymentGateway> = match config.payment_mode {
            PaymentMode::Sandbox => Collaborator::configured(Arc::new(SandboxGateway::new())),
            PaymentMode::Disabled => {
                info!("payments disabled");
                Collaborator::Unconfigured
            }
        };

        let checkout = CheckoutService::new(payments, Arc::new(InMemoryOrderStore::new()), coupons);
        let retention = i64::try_from(config.session_retention_secs).unwrap_or(i64::MAX);
        Ok(Self {
            session_retention: Duration::try_seconds(retention).unwrap_or(Duration::MAX),
            ..Self::new(catalog, config.pricing.clone(), checkout)
        })
    }

    /// Fully in-memory state over the built-in price list
    pub fn in_memory(coupons: Vec<Coupon>) -> Self {
        let catalog = CatalogLoad {
            catalog: Catalog::new(crate::catalog::fallback::fallback_items()),
            warning: None,
        };
        let checkout = CheckoutService::new(
            Collaborator::configured(Arc::new(SandboxGateway::new())),
            Arc::new(InMemoryOrderStore::new()),
            Collaborator::configured(Arc::new(InMemoryCouponStore::new(coupons))),
        );
        Self::new(catalog, PricingConfig::default(), checkout)
    }

    pub fn pricing_context(&self) -> PricingContext<'_> {
        PricingContext {
            catalog: &self.catalog,
            config: &self.pricing,
        }
    }

    /// Snapshot of a cart; unknown ids read as empty
    pub fn cart_snapshot(&self, cart_id: &str) -> Cart {
        self.carts
            .get(cart_id)
            .map(|cart| cart.clone())
            .unwrap_or_default()
    }

    pub fn session(&self, id: Uuid) -> Result<SessionHandle, CheckoutError> {
        self.sessions
            .get(&id)
            .map(|handle| Arc::clone(&handle))
            .ok_or(CheckoutError::SessionNotFound(id))
    }

    /// Drops sessions closed for longer than the retention window.
    /// Sessions locked by a request in flight are left for the next sweep.
    pub fn evict_closed_sessions(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session
                .closed_at()
                .is_some_and(|closed| now - closed >= self.session_retention),
            Err(_) => true,
        });

        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.sessions.len(), "evicted closed checkout sessions");
        }
        evicted
    }
}
