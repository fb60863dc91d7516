//! # Receipt Model
//!
//! The data handed to a [`ReceiptSink`](crate::contracts::ReceiptSink) when a
//! transaction completes. Formatting (paper width, store header, file
//! layout) belongs to the sink; this is just the frozen facts of the sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use register_core::{Money, Payment, Transaction};

/// One printed line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Per-category tax row, present when the breakdown is worth printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptTaxLine {
    pub category: String,
    pub rate: String,
    pub tax: Money,
}

/// A completed sale, frozen for printing and archival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub completed_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    /// Populated when the transaction carried multiple tax rates.
    pub tax_lines: Vec<ReceiptTaxLine>,
    pub tax: Money,
    pub total: Money,
    pub payment: Option<Payment>,
}

impl Receipt {
    /// Projects a paid transaction into a receipt.
    pub fn from_transaction(
        transaction: &Transaction,
        receipt_number: &str,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let breakdown = transaction.tax_breakdown();

        let tax_lines = if breakdown.has_multiple_rates() {
            breakdown
                .categories()
                .iter()
                .map(|c| ReceiptTaxLine {
                    category: c.category().to_string(),
                    rate: c.rate().formatted(),
                    tax: c.tax(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Receipt {
            receipt_number: receipt_number.to_string(),
            completed_at,
            lines: transaction
                .lines()
                .iter()
                .map(|l| ReceiptLine {
                    description: l.description().to_string(),
                    quantity: l.quantity(),
                    unit_price: l.unit_price(),
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: transaction.subtotal(),
            tax_lines,
            tax: breakdown.total_tax(),
            total: transaction.total(),
            payment: transaction.payment().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use register_core::{CardType, CatalogItem};

    fn when() -> DateTime<Utc> {
        "2024-01-15T16:00:00Z".parse().expect("timestamp")
    }

    #[test]
    fn test_from_transaction_freezes_sale() {
        let mut tx = Transaction::new();
        tx.add_item(
            CatalogItem::new("A", "Cola", Money::from_cents(100), "OTHER", false)
                .expect("valid item"),
        );
        tx.add_item(
            CatalogItem::new("B", "Cigarettes", Money::from_cents(500), "TOBACCO", false)
                .expect("valid item"),
        );
        tx.start_tendering().expect("has items");
        tx.set_payment(Payment::card(CardType::Visa, tx.total(), when()));

        let receipt = Receipt::from_transaction(&tx, "R-20240115-001", when());

        assert_eq!(receipt.receipt_number, "R-20240115-001");
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.subtotal.cents(), 600);
        assert_eq!(receipt.total, receipt.subtotal + receipt.tax);
        // Mixed categories: the breakdown is printed
        assert_eq!(receipt.tax_lines.len(), 2);
        assert!(receipt.payment.expect("payment").is_card());
    }

    #[test]
    fn test_single_default_category_omits_tax_lines() {
        let mut tx = Transaction::new();
        tx.add_item(
            CatalogItem::new("A", "Cola", Money::from_cents(100), "OTHER", false)
                .expect("valid item"),
        );

        let receipt = Receipt::from_transaction(&tx, "R-20240115-002", when());
        assert!(receipt.tax_lines.is_empty());
        assert_eq!(receipt.tax.cents(), 7);
    }
}
