//! Garment Catalog Module
//!
//! This module owns the list of items customers can send for ironing:
//! - Domain models (CatalogItem, Category taxonomy, indexed Catalog)
//! - The built-in fallback price list
//! - Loading from a live source with fallback
//! - REST API handlers

pub mod fallback;
pub mod handlers;
pub mod models;
pub mod source;

pub use handlers::routes;
pub use models::{Catalog, CatalogItem, Category, MainCategory};
pub use source::{load_catalog, CatalogLoad, CatalogSource, FileCatalogSource, StaticCatalogSource};
