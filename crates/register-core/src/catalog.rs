//! # Catalog Items
//!
//! The immutable lookup record behind every scan: a UPC, what it is, what it
//! costs, which tax category it falls in, and whether it earns a spot on the
//! quick-pick grid.
//!
//! Catalog items are owned by the catalog store; the transaction only ever
//! holds copies frozen at scan time, so a price change mid-checkout never
//! reprices a basket.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::{normalize_category, validate_description, validate_price_cents, validate_upc};

/// An item available for sale.
///
/// ## Invariants
/// - `upc` and `description` are non-empty
/// - `price` is non-negative
/// - `category` is uppercase, never empty (`OTHER` when unspecified)
///
/// Fields are private; there are no setters. Construction is the only place
/// the invariants need checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    upc: String,
    description: String,
    price: Money,
    category: String,
    popular: bool,
}

impl CatalogItem {
    /// Creates a catalog item, validating every field.
    ///
    /// ## Errors
    /// Returns a `ValidationError` (wrapped in `CoreError`) for an empty UPC
    /// or description, or a negative price. This is the rejection path for
    /// bad price book rows.
    pub fn new(
        upc: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        category: &str,
        popular: bool,
    ) -> CoreResult<Self> {
        let upc = validate_upc(&upc.into())?;
        let description = validate_description(&description.into())?;
        validate_price_cents(price.cents())?;

        Ok(CatalogItem {
            upc,
            description,
            price,
            category: normalize_category(category),
            popular,
        })
    }

    /// The unique catalog key.
    #[inline]
    pub fn upc(&self) -> &str {
        &self.upc
    }

    /// Display name shown to the cashier and on the receipt.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unit price.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Tax category tag (uppercase, `OTHER` by default).
    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the item is on the quick-pick grid.
    #[inline]
    pub fn popular(&self) -> bool {
        self.popular
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_fields() {
        let item = CatalogItem::new("4011", "Bananas", Money::from_cents(59), "other", false)
            .expect("valid item");
        assert_eq!(item.upc(), "4011");
        assert_eq!(item.description(), "Bananas");
        assert_eq!(item.price().cents(), 59);
        assert_eq!(item.category(), "OTHER");
        assert!(!item.popular());
    }

    #[test]
    fn test_new_rejects_bad_fields() {
        assert!(CatalogItem::new("", "Bananas", Money::from_cents(59), "OTHER", false).is_err());
        assert!(CatalogItem::new("4011", "  ", Money::from_cents(59), "OTHER", false).is_err());
        assert!(CatalogItem::new("4011", "Bananas", Money::from_cents(-1), "OTHER", false).is_err());
    }

    #[test]
    fn test_blank_category_defaults_to_other() {
        let item =
            CatalogItem::new("4011", "Bananas", Money::from_cents(59), "", false).expect("valid");
        assert_eq!(item.category(), "OTHER");
    }

    #[test]
    fn test_display() {
        let item = CatalogItem::new("4011", "Bananas", Money::from_cents(59), "OTHER", false)
            .expect("valid");
        assert_eq!(item.to_string(), "Bananas ($0.59)");
    }
}
