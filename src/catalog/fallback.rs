//! Built-in price list used when the live catalog cannot be reached.

use super::models::{CatalogItem, Category};
use rust_decimal::Decimal;

fn item(id: &str, name: &str, category: Category, cents: i64) -> CatalogItem {
    CatalogItem::new(id, name, category, Decimal::new(cents, 2))
}

/// Returns the default catalog, mirroring the live table's shape and ids.
pub fn fallback_items() -> Vec<CatalogItem> {
    use Category::*;
    vec![
        item("m-f-1", "Dress shirts (short or long sleeve)", MenFormalWear, 350),
        item("m-f-2", "Dress pants / trousers", MenFormalWear, 400),
        item("m-f-3", "Blazers / suit jackets", MenFormalWear, 800),
        item("m-f-4", "Ties", MenFormalWear, 200),
        item("m-f-5", "Waistcoats (vests)", MenFormalWear, 600),
        item("m-c-1", "T-shirts", MenCasualWear, 250),
        item("m-c-2", "Casual button-up shirts", MenCasualWear, 300),
        item("m-c-3", "Jeans", MenCasualWear, 400),
        item("m-c-4", "Chinos / khakis", MenCasualWear, 350),
        item("m-c-5", "Casual shorts", MenCasualWear, 300),
        item("m-e-1", "Kurta Tops", MenEthnicCulturalWear, 700),
        item("m-e-2", "Kurta pants", MenEthnicCulturalWear, 500),
        item("m-o-1", "Sweaters", MenOuterwear, 500),
        item("m-o-2", "Hoodies", MenOuterwear, 500),
        item("m-s-1", "Flannel shirts", MenSeasonalLayering, 350),
        item("w-tb-1", "T-shirts", WomenTopsBlouses, 250),
        item("w-tb-2", "Blouses", WomenTopsBlouses, 400),
        item("w-tb-3", "Dress shirts", WomenTopsBlouses, 350),
        item("w-tb-4", "Long-sleeve tops", WomenTopsBlouses, 350),
        item("w-tb-5", "Button-up shirts", WomenTopsBlouses, 350),
        item("w-b-1", "Pants / trousers", WomenBottoms, 400),
        item("w-b-2", "Jeans", WomenBottoms, 400),
        item("w-b-3", "Skirts (mini, midi, maxi)", WomenBottoms, 450),
        item("w-b-4", "Shorts", WomenBottoms, 300),
        item("w-d-1", "Casual dresses", WomenDresses, 700),
        item("w-d-2", "Formal dresses", WomenDresses, 1000),
        item("w-d-3", "Office/work dresses", WomenDresses, 800),
        item("w-e-1", "Sarees (2 Piece - blouse and saree piece)", WomenEthnicCulturalWear, 1500),
        item("w-e-2", "Salwar kameez (top)", WomenEthnicCulturalWear, 700),
        item("w-e-3", "Salwar kameez (bottom)", WomenEthnicCulturalWear, 500),
        item("w-e-4", "Salwar kameez (dupatta)", WomenEthnicCulturalWear, 300),
        item("w-e-5", "Kurta Tops", WomenEthnicCulturalWear, 700),
        item("w-e-6", "Kurta pants", WomenEthnicCulturalWear, 500),
        item("w-e-7", "Abayas", WomenEthnicCulturalWear, 800),
        item("w-e-8", "Sarongs/Lungi", WomenEthnicCulturalWear, 400),
        item("w-e-9", "Hijabs or shawls", WomenEthnicCulturalWear, 300),
        item("w-o-1", "Cardigans", WomenOuterwear, 500),
        item("w-o-2", "Blazers", WomenOuterwear, 800),
        item("w-oi-1", "Nightgowns / sleepwear", WomenOtherItems, 400),
        item("w-oi-2", "Aprons (clothing)", WomenOtherItems, 300),
        item("h-b-1", "Single Bedsheet", HouseholdBedding, 800),
        item("h-b-2", "Double Bedsheet", HouseholdBedding, 1000),
        item("h-b-3", "Queen Bedsheet", HouseholdBedding, 1200),
        item("h-b-4", "King Bedsheet", HouseholdBedding, 1500),
        item("h-b-5", "Pillowcase", HouseholdBedding, 300),
        item("h-tl-1", "Small Tablecloth", HouseholdTableLinens, 800),
        item("h-tl-2", "Medium Tablecloth", HouseholdTableLinens, 1200),
        item("h-tl-3", "Large Tablecloth", HouseholdTableLinens, 1600),
        item("h-wt-1", "Small Curtain Panel", HouseholdWindowTreatments, 1000),
        item("h-wt-2", "Medium Curtain Panel", HouseholdWindowTreatments, 1500),
        item("h-wt-3", "Large Curtain Panel", HouseholdWindowTreatments, 2000),
        item("h-bl-1", "Bath Towel", HouseholdBathLinens, 500),
        item("h-bl-2", "Hand Towel", HouseholdBathLinens, 300),
        item("h-m-1", "Throw Blanket", HouseholdMiscellaneous, 1200),
        item("h-m-2", "Comforter/Duvet", HouseholdMiscellaneous, 2500),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::Catalog;
    use rust_decimal_macros::dec;

    #[test]
    fn fallback_ids_are_unique_and_priced() {
        let items = fallback_items();
        let catalog = Catalog::new(items.clone());
        assert_eq!(catalog.len(), items.len());
        assert_eq!(catalog.get("m-f-1").unwrap().base_price, dec!(3.50));
        assert_eq!(catalog.get("h-m-2").unwrap().base_price, dec!(25.00));
    }
}
