//! # Category Tax Engine
//!
//! Groups line totals by catalog category and applies a per-category rate
//! table.
//!
//! ## Rate Table
//! ```text
//! ┌──────────────┬────────┬──────────────────────────────┐
//! │ Category     │  Rate  │ Basis points                 │
//! ├──────────────┼────────┼──────────────────────────────┤
//! │ TOBACCO      │  20%   │ 2000                         │
//! │ ALCOHOL      │  15%   │ 1500                         │
//! │ (all others) │   7%   │  700  (default rate)         │
//! └──────────────┴────────┴──────────────────────────────┘
//! ```
//!
//! ## Recompute, Never Cache
//! The breakdown is derived fresh from the current line items on every call.
//! There is no incremental update path, so a void or quantity edit can never
//! leave a stale per-category subtotal behind.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::transaction::LineItem;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 700 bps = 7%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Formats the rate the way receipts print it: "20%".
    pub fn formatted(&self) -> String {
        if self.0 % 100 == 0 {
            format!("{}%", self.0 / 100)
        } else {
            format!("{:.2}%", self.percentage())
        }
    }
}

// =============================================================================
// Rate Table
// =============================================================================

/// 20% on tobacco.
pub const TAX_RATE_TOBACCO: TaxRate = TaxRate::from_bps(2000);
/// 15% on alcohol.
pub const TAX_RATE_ALCOHOL: TaxRate = TaxRate::from_bps(1500);
/// 7% on everything else.
pub const TAX_RATE_DEFAULT: TaxRate = TaxRate::from_bps(700);

/// Looks up the rate for a category tag.
///
/// Categories are stored uppercase (see `validation::normalize_category`);
/// anything outside the table gets the default rate.
pub fn rate_for_category(category: &str) -> TaxRate {
    match category {
        "TOBACCO" => TAX_RATE_TOBACCO,
        "ALCOHOL" => TAX_RATE_ALCOHOL,
        _ => TAX_RATE_DEFAULT,
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// Tax computed for one category present in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTax {
    category: String,
    subtotal: Money,
    rate: TaxRate,
    tax: Money,
}

impl CategoryTax {
    fn new(category: String, subtotal: Money, rate: TaxRate) -> Self {
        let tax = subtotal.calculate_tax(rate);
        CategoryTax {
            category,
            subtotal,
            rate,
            tax,
        }
    }

    /// The category tag.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Sum of line totals in this category.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// The rate applied.
    pub fn rate(&self) -> TaxRate {
        self.rate
    }

    /// Tax owed on this category's subtotal.
    pub fn tax(&self) -> Money {
        self.tax
    }
}

/// Per-category tax rows plus the grand tax total.
///
/// Derived, never persisted on its own: a breakdown is always recomputed from
/// the line items it was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    categories: Vec<CategoryTax>,
    total_tax: Money,
}

impl TaxBreakdown {
    /// Computes the breakdown for a set of line items.
    ///
    /// ## Algorithm
    /// 1. Partition line totals by category, summing per category
    /// 2. Apply each category's rate to its subtotal
    /// 3. Sum per-category tax for the grand total
    ///
    /// Rows come out in sorted category order so display and tests are
    /// deterministic.
    pub fn for_lines(lines: &[LineItem]) -> Self {
        use std::collections::BTreeMap;

        let mut by_category: BTreeMap<&str, Money> = BTreeMap::new();
        for line in lines {
            let entry = by_category.entry(line.category()).or_insert_with(Money::zero);
            *entry += line.line_total();
        }

        let categories: Vec<CategoryTax> = by_category
            .into_iter()
            .map(|(category, subtotal)| {
                CategoryTax::new(category.to_string(), subtotal, rate_for_category(category))
            })
            .collect();

        let total_tax = categories
            .iter()
            .fold(Money::zero(), |acc, c| acc + c.tax());

        TaxBreakdown {
            categories,
            total_tax,
        }
    }

    /// Per-category rows, sorted by category tag.
    pub fn categories(&self) -> &[CategoryTax] {
        &self.categories
    }

    /// Grand tax total across all categories.
    pub fn total_tax(&self) -> Money {
        self.total_tax
    }

    /// Whether the display should render a per-category breakdown.
    ///
    /// True when more than one category is present, or when any present
    /// category is taxed at a non-default rate. Purely a display hint; it
    /// has no effect on the numeric total.
    pub fn has_multiple_rates(&self) -> bool {
        self.categories.len() > 1
            || self
                .categories
                .iter()
                .any(|c| c.rate() != TAX_RATE_DEFAULT)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
