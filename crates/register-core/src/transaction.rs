//! # Transaction Aggregate
//!
//! The live checkout: an ordered set of line items unique by UPC, a two-state
//! machine, and the attached payment once tendering completes.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            add_item / remove_item / change_quantity                     │
//! │                        ┌────────┐                                       │
//! │                        ▼        │                                       │
//! │                   ┌──────────┐──┘     start_tendering()                 │
//! │   (initial) ────► │ SHOPPING │ ─────────────────────────► ┌───────────┐ │
//! │                   └──────────┘   (requires >= 1 line)     │ TENDERING │ │
//! │                        ▲                                  └─────┬─────┘ │
//! │                        │                                        │       │
//! │                        └──────────── clear() ◄──────────────────┘       │
//! │                         (also runs after payment completes)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line item per UPC: adding a known UPC increments its
//!   quantity instead of inserting a second line
//! - Every line quantity is >= 1
//! - `total == subtotal + tax` for every reachable state
//! - Totals are derived on demand, never cached across mutations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogItem;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::Payment;
use crate::tax::TaxBreakdown;
use crate::validation::validate_quantity;

// =============================================================================
// Transaction State
// =============================================================================

/// The phase a transaction is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Items are being added; the basket is open.
    Shopping,
    /// Items are locked; payment is being collected. The only exit is clear.
    Tendering,
}

impl TransactionState {
    /// Wire/storage name. This string is a persistence contract: suspension
    /// snapshots record it and restore parses it back.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Shopping => "SHOPPING",
            TransactionState::Tendering => "TENDERING",
        }
    }

    /// Operator-facing label.
    pub fn display_name(&self) -> &'static str {
        match self {
            TransactionState::Shopping => "Shopping - Add Items",
            TransactionState::Tendering => "Tendering - Process Payment",
        }
    }
}

impl FromStr for TransactionState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHOPPING" => Ok(TransactionState::Shopping),
            "TENDERING" => Ok(TransactionState::Tendering),
            other => Err(CoreError::Serialization {
                reason: format!("unknown transaction state: {other}"),
            }),
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One row in a transaction: a frozen catalog item plus a quantity.
///
/// ## Invariant
/// Quantity never drops below 1. Voiding the line is the only way to
/// eliminate it; there is no zeroing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    item: CatalogItem,
    quantity: i64,
}

impl LineItem {
    /// Creates a line with quantity 1.
    fn new(item: CatalogItem) -> Self {
        LineItem { item, quantity: 1 }
    }

    /// The frozen catalog item behind this line.
    #[inline]
    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    /// Units on this line (always >= 1).
    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The item's UPC (convenience accessor).
    #[inline]
    pub fn upc(&self) -> &str {
        self.item.upc()
    }

    /// The item's description (convenience accessor).
    #[inline]
    pub fn description(&self) -> &str {
        self.item.description()
    }

    /// The item's unit price (convenience accessor).
    #[inline]
    pub fn unit_price(&self) -> Money {
        self.item.price()
    }

    /// The item's tax category (convenience accessor).
    #[inline]
    pub fn category(&self) -> &str {
        self.item.category()
    }

    /// The line total (unit price x quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.item.price().multiply_quantity(self.quantity)
    }

    /// Increases quantity by 1.
    fn increment(&mut self) {
        self.quantity += 1;
    }

    /// Sets a specific quantity. Rejects anything below 1 without mutating.
    fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x {} @ {} = {}",
            self.quantity,
            self.item.description(),
            self.item.price(),
            self.line_total()
        )
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The transaction aggregate.
///
/// Created at checkout start, mutated by scan/void/quantity-change/tender
/// operations, and logically reset by clear, suspend, or completion.
///
/// State enforcement note: `add_item` itself does not check the state; the
/// orchestration layer rejects scans during TENDERING before the item ever
/// reaches the aggregate. This mirrors where the enforcement has to live
/// anyway (the scanner is disabled at the input layer), and it is what lets
/// snapshot restore rebuild a TENDERING basket by replaying adds first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    items: Vec<LineItem>,
    state: TransactionState,
    payment: Option<Payment>,
}

impl Default for Transaction {
    fn default() -> Self {
        Transaction::new()
    }
}

impl Transaction {
    /// Creates an empty transaction in the SHOPPING state.
    pub fn new() -> Self {
        Transaction {
            items: Vec::new(),
            state: TransactionState::Shopping,
            payment: None,
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a catalog item to the transaction.
    ///
    /// If a line with the same UPC already exists its quantity is incremented
    /// by 1; otherwise a new line with quantity 1 is appended. Line order is
    /// scan order.
    pub fn add_item(&mut self, item: CatalogItem) {
        if let Some(line) = self.items.iter_mut().find(|l| l.upc() == item.upc()) {
            line.increment();
        } else {
            self.items.push(LineItem::new(item));
        }
    }

    /// Removes (voids) the line at the given position, returning it.
    ///
    /// ## Errors
    /// `LineOutOfRange` with no mutation when the index is invalid.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::LineOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Sets the quantity of the line at the given position.
    ///
    /// ## Errors
    /// - `LineOutOfRange` when the index is invalid
    /// - `Validation` when `quantity < 1`; the line is unchanged
    pub fn change_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        let len = self.items.len();
        let line = self
            .items
            .get_mut(index)
            .ok_or(CoreError::LineOutOfRange { index, len })?;
        line.set_quantity(quantity)
    }

    /// Transitions SHOPPING -> TENDERING, locking the basket for payment.
    ///
    /// One-way: the only exit from TENDERING is `clear`.
    ///
    /// ## Errors
    /// `InvalidState` on an empty transaction, with no transition.
    pub fn start_tendering(&mut self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::invalid_state(
                "cannot start tendering on an empty transaction",
            ));
        }
        self.state = TransactionState::Tendering;
        Ok(())
    }

    /// Attaches a completed payment.
    ///
    /// Does not transition state or validate sufficiency; callers verify the
    /// tendered amount against the total before constructing a cash payment.
    pub fn set_payment(&mut self, payment: Payment) {
        self.payment = Some(payment);
    }

    /// Resets to a fresh SHOPPING transaction: empties the lines, discards
    /// the payment. Used both for "start fresh" and after completion.
    pub fn clear(&mut self) {
        self.items.clear();
        self.payment = None;
        self.state = TransactionState::Shopping;
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// True while items may be added.
    pub fn is_shopping(&self) -> bool {
        self.state() == TransactionState::Shopping
    }

    /// True while payment is being collected.
    pub fn is_tendering(&self) -> bool {
        self.state() == TransactionState::Tendering
    }

    /// All lines, in scan order.
    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    /// The line at a position, if any.
    pub fn line(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// The attached payment, once tendering completes.
    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    /// True when no lines are present.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|l| l.quantity()).sum()
    }

    /// Sum of line totals, before tax.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Category tax breakdown, recomputed from the current lines.
    pub fn tax_breakdown(&self) -> TaxBreakdown {
        TaxBreakdown::for_lines(&self.items)
    }

    /// Total tax across all categories.
    pub fn tax_amount(&self) -> Money {
        self.tax_breakdown().total_tax()
    }

    /// Grand total: subtotal + tax.
    pub fn total(&self) -> Money {
        self.subtotal() + self.tax_amount()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction{{lines={}, items={}, total={}}}",
            self.line_count(),
            self.item_count(),
            self.total()
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::CardType;

    fn item(upc: &str, cents: i64, category: &str) -> CatalogItem {
        CatalogItem::new(upc, format!("Item {upc}"), Money::from_cents(cents), category, false)
            .expect("valid test item")
    }

    #[test]
    fn test_new_transaction_is_empty_shopping() {
        let tx = Transaction::new();
        assert!(tx.is_empty());
        assert!(tx.is_shopping());
        assert_eq!(tx.line_count(), 0);
        assert_eq!(tx.item_count(), 0);
        assert_eq!(tx.subtotal(), Money::zero());
        assert_eq!(tx.total(), Money::zero());
        assert!(tx.payment().is_none());
    }

    #[test]
    fn test_duplicate_upc_increments_instead_of_inserting() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("A", 100, "OTHER"));

        assert_eq!(tx.line_count(), 1);
        assert_eq!(tx.item_count(), 2);
        assert_eq!(tx.line(0).expect("line").quantity(), 2);
        assert_eq!(tx.line(0).expect("line").line_total().cents(), 200);
    }

    #[test]
    fn test_lines_keep_scan_order() {
        let mut tx = Transaction::new();
        tx.add_item(item("B", 500, "TOBACCO"));
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("B", 500, "TOBACCO"));

        assert_eq!(tx.line(0).expect("line").upc(), "B");
        assert_eq!(tx.line(1).expect("line").upc(), "A");
        assert_eq!(tx.line_count(), 2);
    }

    #[test]
    fn test_remove_item() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("B", 500, "TOBACCO"));

        let removed = tx.remove_item(0).expect("in range");
        assert_eq!(removed.upc(), "A");
        assert_eq!(tx.line_count(), 1);
        assert_eq!(tx.line(0).expect("line").upc(), "B");
    }

    #[test]
    fn test_remove_item_out_of_range() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));

        let err = tx.remove_item(5).expect_err("out of range");
        assert!(matches!(err, CoreError::LineOutOfRange { index: 5, len: 1 }));
        assert_eq!(tx.line_count(), 1);
    }

    #[test]
    fn test_change_quantity() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));

        tx.change_quantity(0, 5).expect("valid quantity");
        assert_eq!(tx.line(0).expect("line").quantity(), 5);
        assert_eq!(tx.subtotal().cents(), 500);
    }

    #[test]
    fn test_change_quantity_rejects_below_one() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.change_quantity(0, 3).expect("valid quantity");

        assert!(tx.change_quantity(0, 0).is_err());
        assert!(tx.change_quantity(0, -1).is_err());
        // Rejections leave the line untouched
        assert_eq!(tx.line(0).expect("line").quantity(), 3);
    }

    #[test]
    fn test_start_tendering_requires_items() {
        let mut tx = Transaction::new();
        let err = tx.start_tendering().expect_err("empty transaction");
        assert!(matches!(err, CoreError::InvalidState { .. }));
        assert!(tx.is_shopping());

        tx.add_item(item("A", 100, "OTHER"));
        tx.start_tendering().expect("has items");
        assert!(tx.is_tendering());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.start_tendering().expect("has items");
        tx.set_payment(Payment::card(
            CardType::Visa,
            tx.total(),
            "2024-01-15T10:30:00Z".parse().expect("timestamp"),
        ));

        tx.clear();
        assert!(tx.is_empty());
        assert!(tx.is_shopping());
        assert!(tx.payment().is_none());
    }

    #[test]
    fn test_total_is_subtotal_plus_tax_everywhere() {
        let mut tx = Transaction::new();
        assert_eq!(tx.total(), tx.subtotal() + tx.tax_amount());

        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("B", 500, "TOBACCO"));
        assert_eq!(tx.total(), tx.subtotal() + tx.tax_amount());

        tx.start_tendering().expect("has items");
        assert_eq!(tx.total(), tx.subtotal() + tx.tax_amount());
    }

    #[test]
    fn test_mixed_basket_concrete_totals() {
        // A: $1.00 OTHER x2, B: $5.00 TOBACCO x1
        // subtotal $7.00, tax $1.14, total $8.14
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("B", 500, "TOBACCO"));

        assert_eq!(tx.subtotal().cents(), 700);
        assert_eq!(tx.tax_amount().cents(), 114);
        assert_eq!(tx.total().cents(), 814);
        assert!(tx.tax_breakdown().has_multiple_rates());
    }

    #[test]
    fn test_state_names_round_trip() {
        assert_eq!(TransactionState::Shopping.as_str(), "SHOPPING");
        assert_eq!(TransactionState::Tendering.as_str(), "TENDERING");
        assert_eq!(
            "SHOPPING".parse::<TransactionState>().expect("parses"),
            TransactionState::Shopping
        );
        assert_eq!(
            "TENDERING".parse::<TransactionState>().expect("parses"),
            TransactionState::Tendering
        );
        assert!("PAUSED".parse::<TransactionState>().is_err());
    }
}
