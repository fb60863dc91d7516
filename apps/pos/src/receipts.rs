//! # Text Receipt Sink
//!
//! Formats receipts as fixed-width text and writes one file per sale into
//! the receipt directory.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use register_core::Payment;
use register_engine::{Receipt, ReceiptSink};

const WIDTH: usize = 40;

/// Writes `<receipt_number>.txt` files into a directory.
pub struct TextReceiptSink {
    dir: PathBuf,
}

impl TextReceiptSink {
    /// Creates a sink writing into `dir` (created on first persist).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TextReceiptSink { dir: dir.into() }
    }

    fn path_for(&self, receipt: &Receipt) -> PathBuf {
        self.dir.join(format!("{}.txt", receipt.receipt_number))
    }
}

impl ReceiptSink for TextReceiptSink {
    fn persist(&self, receipt: &Receipt) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create receipt directory");
            return false;
        }

        let path = self.path_for(receipt);
        match fs::write(&path, format_receipt(receipt)) {
            Ok(()) => {
                debug!(path = %path.display(), "Receipt written");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write receipt");
                false
            }
        }
    }
}

/// Renders a receipt as register tape.
pub fn format_receipt(receipt: &Receipt) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:^WIDTH$}", "* REGISTER *");
    let _ = writeln!(out, "{:^WIDTH$}", receipt.receipt_number);
    let _ = writeln!(
        out,
        "{:^WIDTH$}",
        receipt.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{:-<WIDTH$}", "");

    for line in &receipt.lines {
        let _ = writeln!(out, "{}", line.description);
        let detail = format!("  {} @ {}", line.quantity, line.unit_price);
        let _ = writeln!(out, "{}", right_aligned(&detail, &line.line_total.to_string()));
    }

    let _ = writeln!(out, "{:-<WIDTH$}", "");
    let _ = writeln!(out, "{}", right_aligned("SUBTOTAL", &receipt.subtotal.to_string()));
    for tax_line in &receipt.tax_lines {
        let label = format!("TAX {} ({})", tax_line.category, tax_line.rate);
        let _ = writeln!(out, "{}", right_aligned(&label, &tax_line.tax.to_string()));
    }
    let _ = writeln!(out, "{}", right_aligned("TAX", &receipt.tax.to_string()));
    let _ = writeln!(out, "{}", right_aligned("TOTAL", &receipt.total.to_string()));

    match &receipt.payment {
        Some(Payment::Cash {
            tendered, change, ..
        }) => {
            let _ = writeln!(out, "{}", right_aligned("CASH", &tendered.to_string()));
            let _ = writeln!(out, "{}", right_aligned("CHANGE", &change.to_string()));
        }
        Some(Payment::Card {
            card_type, amount, ..
        }) => {
            let label = format!("CARD ({})", card_type.display_name());
            let _ = writeln!(out, "{}", right_aligned(&label, &amount.to_string()));
        }
        None => {}
    }

    let _ = writeln!(out, "{:-<WIDTH$}", "");
    let _ = writeln!(out, "{:^WIDTH$}", "THANK YOU");

    out
}

fn right_aligned(label: &str, amount: &str) -> String {
    format!("{label:<0$}{amount}", WIDTH.saturating_sub(amount.len()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use register_core::{CardType, CatalogItem, Money, Transaction};

    fn sample_receipt() -> Receipt {
        let mut tx = Transaction::new();
        tx.add_item(
            CatalogItem::new("A", "Cola", Money::from_cents(100), "OTHER", false).expect("valid"),
        );
        tx.add_item(
            CatalogItem::new("B", "Cigarettes", Money::from_cents(500), "TOBACCO", false)
                .expect("valid"),
        );
        tx.start_tendering().expect("has items");
        let when: DateTime<Utc> = "2024-01-15T16:00:00Z".parse().expect("timestamp");
        tx.set_payment(Payment::card(CardType::Visa, tx.total(), when));

        Receipt::from_transaction(&tx, "R-20240115-160000-000", when)
    }

    #[test]
    fn test_format_receipt_contains_the_sale() {
        let text = format_receipt(&sample_receipt());

        assert!(text.contains("R-20240115-160000-000"));
        assert!(text.contains("Cola"));
        assert!(text.contains("Cigarettes"));
        assert!(text.contains("$6.00")); // subtotal
        assert!(text.contains("TAX TOBACCO (20%)"));
        assert!(text.contains("CARD (Visa)"));
    }

    #[test]
    fn test_persist_writes_a_file() {
        let dir = std::env::temp_dir().join(format!("receipts-test-{}", std::process::id()));
        let sink = TextReceiptSink::new(&dir);
        let receipt = sample_receipt();

        assert!(sink.persist(&receipt));
        let path = dir.join("R-20240115-160000-000.txt");
        let written = fs::read_to_string(&path).expect("receipt file");
        assert!(written.contains("TOTAL"));

        let _ = fs::remove_dir_all(&dir);
    }
}
