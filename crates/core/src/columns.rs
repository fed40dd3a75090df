//! Table columns and sortable fields for the inventory grid.
//!
//! Frontends build their tables from these plain specs; the engine only
//! names fields, labels and widths.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::Product;

/// A sortable (and displayable) field of a product record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Sku,
    Name,
    Category,
    Price,
    Quantity,
    Status,
    Supplier,
    Location,
    LastUpdated,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sku" => Some(SortField::Sku),
            "name" => Some(SortField::Name),
            "category" => Some(SortField::Category),
            "price" => Some(SortField::Price),
            "quantity" => Some(SortField::Quantity),
            "status" => Some(SortField::Status),
            "supplier" => Some(SortField::Supplier),
            "location" => Some(SortField::Location),
            "last_updated" => Some(SortField::LastUpdated),
            _ => None,
        }
    }
}

/// A field rendered for comparison. Mismatched kinds compare as equal
/// instead of erroring, so an odd pairing never aborts a sort.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    /// Case-insensitive for text (no locale tables in this stack),
    /// partial_cmp for numbers with NaN collapsing to equal.
    pub fn compare(a: FieldValue<'_>, b: FieldValue<'_>) -> std::cmp::Ordering {
        match (a, b) {
            (FieldValue::Text(x), FieldValue::Text(y)) => {
                x.to_lowercase().cmp(&y.to_lowercase())
            }
            (FieldValue::Number(x), FieldValue::Number(y)) => {
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            }
            _ => std::cmp::Ordering::Equal,
        }
    }
}

/// Project one field of a record for sorting.
pub fn field_value(p: &Product, field: SortField) -> FieldValue<'_> {
    match field {
        SortField::Sku => FieldValue::Text(&p.sku),
        SortField::Name => FieldValue::Text(&p.name),
        SortField::Category => FieldValue::Text(&p.category),
        SortField::Price => FieldValue::Number(p.price),
        SortField::Quantity => FieldValue::Number(p.quantity as f64),
        SortField::Status => FieldValue::Text(p.status.as_str()),
        SortField::Supplier => FieldValue::Text(&p.supplier),
        SortField::Location => FieldValue::Text(&p.location),
        SortField::LastUpdated => FieldValue::Number(p.last_updated as f64),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub field: SortField,
    pub label: &'static str,
    pub width: f32,
    pub sortable: bool,
}

fn col(field: SortField, label: &'static str, width: f32) -> ColumnSpec {
    ColumnSpec { field, label, width, sortable: true }
}

/// Full column set for the inventory grid, in display order.
pub fn inventory_columns() -> Vec<ColumnSpec> {
    vec![
        col(SortField::Sku, "SKU", 120.0),
        col(SortField::Name, "Product Name", 240.0),
        col(SortField::Category, "Category", 140.0),
        col(SortField::Price, "Price", 100.0),
        col(SortField::Quantity, "Quantity", 100.0),
        col(SortField::Status, "Status", 120.0),
        col(SortField::Supplier, "Supplier", 130.0),
        col(SortField::Location, "Location", 160.0),
        col(SortField::LastUpdated, "Updated", 110.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_kinds_compare_equal() {
        let ord = FieldValue::compare(FieldValue::Text("abc"), FieldValue::Number(1.0));
        assert_eq!(ord, std::cmp::Ordering::Equal);
    }

    #[test]
    fn text_compare_ignores_case() {
        let ord = FieldValue::compare(FieldValue::Text("Widget"), FieldValue::Text("widget"));
        assert_eq!(ord, std::cmp::Ordering::Equal);
    }

    #[test]
    fn grid_columns_cover_every_field_in_display_order() {
        let cols = inventory_columns();
        let fields: Vec<SortField> = cols.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![
                SortField::Sku,
                SortField::Name,
                SortField::Category,
                SortField::Price,
                SortField::Quantity,
                SortField::Status,
                SortField::Supplier,
                SortField::Location,
                SortField::LastUpdated,
            ]
        );
        let labels: Vec<&str> = cols.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec![
                "SKU",
                "Product Name",
                "Category",
                "Price",
                "Quantity",
                "Status",
                "Supplier",
                "Location",
                "Updated",
            ]
        );
        assert!(cols.iter().all(|c| c.sortable && c.width > 0.0));
    }

    #[test]
    fn sort_field_round_trips_names() {
        for f in [
            SortField::Sku,
            SortField::Name,
            SortField::Category,
            SortField::Price,
            SortField::Quantity,
            SortField::Status,
            SortField::Supplier,
            SortField::Location,
            SortField::LastUpdated,
        ] {
            let s = serde_json::to_string(&f).unwrap();
            let name = s.trim_matches('"');
            assert_eq!(SortField::parse(name), Some(f));
        }
    }
}
