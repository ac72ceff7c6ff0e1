//! Catalog Domain Models
//!
//! Garment and household items that can be priced, and the fixed category
//! taxonomy they are grouped under.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Category Taxonomy
// =============================================================================

/// Top-level grouping shown as tabs in the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainCategory {
    Men,
    Women,
    Household,
}

/// Sub-category of a catalog item, stored by the backend as a snake_case tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MenFormalWear,
    MenCasualWear,
    MenEthnicCulturalWear,
    MenOuterwear,
    MenSeasonalLayering,
    WomenTopsBlouses,
    WomenBottoms,
    WomenDresses,
    WomenEthnicCulturalWear,
    WomenOuterwear,
    WomenOtherItems,
    HouseholdBedding,
    HouseholdTableLinens,
    HouseholdWindowTreatments,
    HouseholdBathLinens,
    HouseholdMiscellaneous,
}

impl Category {
    pub fn main(self) -> MainCategory {
        use Category::*;
        match self {
            MenFormalWear | MenCasualWear | MenEthnicCulturalWear | MenOuterwear
            | MenSeasonalLayering => MainCategory::Men,
            WomenTopsBlouses | WomenBottoms | WomenDresses | WomenEthnicCulturalWear
            | WomenOuterwear | WomenOtherItems => MainCategory::Women,
            HouseholdBedding | HouseholdTableLinens | HouseholdWindowTreatments
            | HouseholdBathLinens | HouseholdMiscellaneous => MainCategory::Household,
        }
    }

    /// Display label used under the main category tab
    pub fn label(self) -> &'static str {
        use Category::*;
        match self {
            MenFormalWear => "Formal Wear",
            MenCasualWear => "Casual Wear",
            MenEthnicCulturalWear | WomenEthnicCulturalWear => "Ethnic / Cultural Wear",
            MenOuterwear | WomenOuterwear => "Outerwear",
            MenSeasonalLayering => "Seasonal / Layering Items",
            WomenTopsBlouses => "Tops & Blouses",
            WomenBottoms => "Bottoms",
            WomenDresses => "Dresses",
            WomenOtherItems => "Other Items",
            HouseholdBedding => "Bedding",
            HouseholdTableLinens => "Table Linens",
            HouseholdWindowTreatments => "Window Treatments",
            HouseholdBathLinens => "Bath Linens",
            HouseholdMiscellaneous => "Miscellaneous",
        }
    }
}

// =============================================================================
// Catalog Items
// =============================================================================

fn default_active() -> bool {
    true
}

/// A single orderable item with its base unit price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Stable identifier, unique within the catalog
    pub id: String,

    /// Display name (e.g. "Dress shirts (short or long sleeve)")
    pub name: String,

    pub category: Category,

    /// Price per piece before any express surcharge
    pub base_price: Decimal,

    /// Inactive items are dropped when the catalog is built
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        base_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            base_price,
            is_active: true,
        }
    }
}

/// Immutable, indexed set of active catalog items.
///
/// Built once per process from whichever source answered (live or fallback);
/// both produce the same shape so the pricing engine cannot tell them apart.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog keeping only active items with a non-negative price.
    /// A repeated id keeps its first occurrence.
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut catalog = Self::default();
        for item in items {
            if !item.is_active || item.base_price.is_sign_negative() {
                continue;
            }
            if catalog.index.contains_key(&item.id) {
                continue;
            }
            catalog.index.insert(item.id.clone(), catalog.items.len());
            catalog.items.push(item);
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items grouped by sub-category, in taxonomy order
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        let mut groups: BTreeMap<Category, Vec<CatalogItem>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.category).or_default().push(item.clone());
        }
        groups
            .into_iter()
            .map(|(category, items)| CategoryGroup {
                category,
                main_category: category.main(),
                label: category.label(),
                items,
            })
            .collect()
    }
}

// =============================================================================
// Catalog API Models
// =============================================================================

/// Items of one sub-category, in catalog order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: Category,
    pub main_category: MainCategory,
    pub label: &'static str,
    pub items: Vec<CatalogItem>,
}

/// Response for `GET /catalog`
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub groups: Vec<CategoryGroup>,

    /// Soft warning when the fallback price list is in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
