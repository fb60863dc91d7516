//! # Console Display Sink
//!
//! Renders the live transaction to the terminal after every mutation.
//! Stands in for the lane display of a real register.

use register_core::Transaction;
use register_engine::DisplaySink;

/// Prints the transaction state to stdout.
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn update(&self, transaction: &Transaction) {
        println!();
        println!("== {} ==", transaction.state().display_name());

        if transaction.is_empty() {
            println!("   (no items)");
            return;
        }

        for (index, line) in transaction.lines().iter().enumerate() {
            println!(
                "   {:>2}. {:<32} {:>3} x {:>8} = {:>9}",
                index + 1,
                line.description(),
                line.quantity(),
                line.unit_price().to_string(),
                line.line_total().to_string(),
            );
        }

        println!("   {:-<62}", "");
        println!("   Subtotal {:>41}", transaction.subtotal().to_string());

        let breakdown = transaction.tax_breakdown();
        if breakdown.has_multiple_rates() {
            for row in breakdown.categories() {
                println!(
                    "     Tax {:<10} ({:>6}) {:>27}",
                    row.category(),
                    row.rate().formatted(),
                    row.tax().to_string(),
                );
            }
        }
        println!("   Tax      {:>41}", transaction.tax_amount().to_string());
        println!("   TOTAL    {:>41}", transaction.total().to_string());
    }

    fn show_error(&self, message: &str) {
        println!("!! {message}");
    }
}
