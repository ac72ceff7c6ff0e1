//! Catalog loading
//!
//! The live catalog comes from a [`CatalogSource`]. When the source is not
//! configured, errors, or returns nothing usable, the built-in price list is
//! substituted and a soft warning is reported instead of an error.

use super::{
    fallback::fallback_items,
    models::{Catalog, CatalogItem},
};
use crate::collaborator::{Collaborator, SourceError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

/// Message surfaced to the client while the fallback price list is active
pub const FALLBACK_WARNING: &str = "Using default pricing - live pricing is unavailable";

/// Provider of the live item list
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<CatalogItem>, SourceError>;
}

/// Reads the item list from a JSON array on disk
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_items(&self) -> Result<Vec<CatalogItem>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Serves a fixed list; useful for tests and demos
pub struct StaticCatalogSource {
    items: Vec<CatalogItem>,
}

impl StaticCatalogSource {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_items(&self) -> Result<Vec<CatalogItem>, SourceError> {
        Ok(self.items.clone())
    }
}

/// Outcome of loading the catalog at start-up
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: Catalog,

    /// Set when the fallback list was substituted
    pub warning: Option<String>,
}

impl CatalogLoad {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Loads the live catalog, falling back to the built-in list.
///
/// Never fails: catalog unavailability is recovered locally.
pub async fn load_catalog(source: &Collaborator<dyn CatalogSource>) -> CatalogLoad {
    let fetched = match source.get("catalog source") {
        Ok(source) => source.fetch_items().await,
        Err(unavailable) => {
            warn!(%unavailable, "catalog source missing, using fallback items");
            return fallback();
        }
    };

    match fetched {
        Ok(items) => {
            let catalog = Catalog::new(items);
            if catalog.is_empty() {
                warn!("catalog source returned no active items, using fallback items");
                return fallback();
            }
            info!(items = catalog.len(), "loaded live catalog");
            CatalogLoad {
                catalog,
                warning: None,
            }
        }
        Err(error) => {
            warn!(%error, "catalog source failed, using fallback items");
            fallback()
        }
    }
}

fn fallback() -> CatalogLoad {
    CatalogLoad {
        catalog: Catalog::new(fallback_items()),
        warning: Some(FALLBACK_WARNING.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::Category;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct BrokenSource;

    #[async_trait]
    impl CatalogSource for BrokenSource {
        async fn fetch_items(&self) -> Result<Vec<CatalogItem>, SourceError> {
            Err(SourceError::Backend("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn live_items_are_used_when_available() {
        let source: Arc<dyn CatalogSource> = Arc::new(StaticCatalogSource::new(vec![
            CatalogItem::new("x-1", "Ties", Category::MenFormalWear, dec!(2.25)),
        ]));
        let load = load_catalog(&Collaborator::configured(source)).await;

        assert!(!load.is_fallback());
        assert_eq!(load.catalog.len(), 1);
        assert_eq!(load.catalog.get("x-1").unwrap().base_price, dec!(2.25));
    }

    #[tokio::test]
    async fn failures_and_missing_sources_fall_back() {
        let broken: Arc<dyn CatalogSource> = Arc::new(BrokenSource);
        let load = load_catalog(&Collaborator::configured(broken)).await;
        assert!(load.is_fallback());
        assert!(load.catalog.contains("m-f-1"));

        let load = load_catalog(&Collaborator::Unconfigured).await;
        assert_eq!(load.warning.as_deref(), Some(FALLBACK_WARNING));
    }

    #[tokio::test]
    async fn empty_live_catalog_falls_back() {
        let empty: Arc<dyn CatalogSource> = Arc::new(StaticCatalogSource::new(Vec::new()));
        let load = load_catalog(&Collaborator::configured(empty)).await;
        assert!(load.is_fallback());
    }

    #[tokio::test]
    async fn file_source_reads_backend_rows() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"[{"id":"a","name":"Hoodies","category":"men_outerwear","base_price":5.5},
                {"id":"b","name":"Gone","category":"men_outerwear","base_price":"1.00","is_active":false}]"#,
        )
        .await
        .unwrap();

        let items = FileCatalogSource::new(&path).fetch_items().await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(items.len(), 2);
        assert_eq!(Catalog::new(items).len(), 1);
    }
}
