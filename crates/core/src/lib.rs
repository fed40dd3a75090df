//! Lager core types: product records and the derived stock status rule.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod columns;

/// Stable product identifier (e.g. "prod-42").
pub type ProductId = String;

/// Quantity below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Status is a pure function of quantity; never accepted from input.
    pub fn from_quantity(quantity: u32) -> Self {
        match quantity {
            0 => StockStatus::OutOfStock,
            q if q < LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(StockStatus::InStock),
            "low_stock" => Some(StockStatus::LowStock),
            "out_of_stock" => Some(StockStatus::OutOfStock),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
    pub status: StockStatus,
    pub supplier: String,
    pub location: String,
    /// Epoch seconds of the last write through the mutation layer.
    pub last_updated: i64,
}

/// Partial update merged into an existing record by `update_one`.
/// Status is intentionally absent: it is recomputed from quantity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.sku.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.supplier.is_none()
            && self.location.is_none()
    }

    /// Merge into `p`. Does not touch status or last_updated; the store does.
    pub fn apply_to(&self, p: &mut Product) {
        if let Some(v) = &self.sku {
            p.sku = v.clone();
        }
        if let Some(v) = &self.name {
            p.name = v.clone();
        }
        if let Some(v) = &self.category {
            p.category = v.clone();
        }
        if let Some(v) = self.price {
            p.price = v;
        }
        if let Some(v) = self.quantity {
            p.quantity = v;
        }
        if let Some(v) = &self.supplier {
            p.supplier = v.clone();
        }
        if let Some(v) = &self.location {
            p.location = v.clone();
        }
    }
}

/// Immutable view of the store at a given epoch, rows in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventorySnapshot {
    pub epoch: u64,
    pub items: Vec<Product>,
}

/// Aggregates over the unfiltered record set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryStats {
    pub total_products: usize,
    /// Sum of price * quantity.
    pub total_value: f64,
    /// Sum of quantities.
    pub total_items: u64,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

pub mod prelude {
    pub use super::{InventorySnapshot, InventoryStats, Product, ProductId, ProductPatch, StockStatus};
}
