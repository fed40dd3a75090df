//! Deterministic synthetic catalog for the simulated backend.

use chrono::Utc;
use lager_core::{Product, StockStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Home & Garden",
    "Sports",
    "Automotive",
    "Books",
    "Toys",
    "Food & Beverage",
];

const SUPPLIERS: [&str; 6] = [
    "TechCorp",
    "GlobalSupply",
    "FastShip",
    "QualityFirst",
    "BulkMart",
    "PremiumGoods",
];

const LOCATIONS: [&str; 5] = [
    "Warehouse A",
    "Warehouse B",
    "Warehouse C",
    "Distribution Center 1",
    "Distribution Center 2",
];

const NAMES: [&str; 10] = [
    "Widget Pro",
    "Super Device",
    "Premium Item",
    "Basic Model",
    "Deluxe Edition",
    "Standard Pack",
    "Value Bundle",
    "Elite Series",
    "Compact Unit",
    "Advanced System",
];

/// Generate `n` products from a fixed seed, aging `last_updated` stamps
/// back from the current time.
pub fn generate(n: usize, seed: u64) -> Vec<Product> {
    generate_at(n, seed, Utc::now().timestamp())
}

/// Same `(n, seed, now)` always yields the same catalog; ids are dense
/// ("prod-1".."prod-N") so every record is addressable in tests.
pub fn generate_at(n: usize, seed: u64, now: i64) -> Vec<Product> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let quantity: u32 = rng.gen_range(0..500);
            let price = (rng.gen_range(1.0_f64..1000.0) * 100.0).round() / 100.0;
            let age_secs: i64 = rng.gen_range(0..30 * 24 * 60 * 60);
            Product {
                id: format!("prod-{}", i + 1),
                sku: format!("SKU-{:06}", i + 1),
                name: format!("{} {}", NAMES[i % NAMES.len()], i / 10 + 1),
                category: CATEGORIES[i % CATEGORIES.len()].to_string(),
                price,
                quantity,
                status: StockStatus::from_quantity(quantity),
                supplier: SUPPLIERS[i % SUPPLIERS.len()].to_string(),
                location: LOCATIONS[i % LOCATIONS.len()].to_string(),
                last_updated: now - age_secs,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_catalog() {
        let a = generate_at(100, 7, 1_700_000_000);
        let b = generate_at(100, 7, 1_700_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_diverges() {
        let a = generate_at(100, 7, 1_700_000_000);
        let b = generate_at(100, 8, 1_700_000_000);
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_dense_and_status_matches_quantity() {
        let items = generate(50, 1);
        for (i, p) in items.iter().enumerate() {
            assert_eq!(p.id, format!("prod-{}", i + 1));
            assert_eq!(p.sku, format!("SKU-{:06}", i + 1));
            assert_eq!(p.status, StockStatus::from_quantity(p.quantity));
            assert!(p.price >= 1.0 && p.price < 1000.0);
        }
    }

    #[test]
    fn pools_cycle_by_index() {
        let items = generate(20, 3);
        assert_eq!(items[0].category, "Electronics");
        assert_eq!(items[8].category, "Electronics");
        assert_eq!(items[0].name, "Widget Pro 1");
        assert_eq!(items[10].name, "Widget Pro 2");
        assert_eq!(items[6].supplier, "TechCorp");
    }
}
