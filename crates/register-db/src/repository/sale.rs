//! # Sale Repository
//!
//! Database operations for completed transactions. Rows land here only when
//! a payment has gone through; the live transaction itself is never
//! persisted (suspensions are, see the suspension repository).
//!
//! The completed history feeds two things: receipt archival and the sales
//! aggregate behind popularity recalculation.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use register_core::Transaction;

use crate::error::DbResult;

/// Repository for completed-transaction database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a completed (paid) transaction under its receipt number.
    ///
    /// The header row and every item row are written in one database
    /// transaction: the history never contains a half-recorded sale.
    pub async fn save_completed(
        &self,
        transaction: &Transaction,
        receipt_number: &str,
    ) -> DbResult<()> {
        debug!(receipt_number = %receipt_number, "Recording completed transaction");

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let (method, card_type, tendered, change) = match transaction.payment() {
            Some(payment) => (
                payment.method_name(),
                payment.card_type().map(|c| c.display_name()),
                payment.tendered().cents(),
                payment.change().cents(),
            ),
            None => ("NONE", None, 0, 0),
        };

        let mut dbtx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO completed_transactions (
                id, receipt_number, subtotal_cents, tax_cents, total_cents,
                item_count, payment_method, card_type, tendered_cents,
                change_cents, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(receipt_number)
        .bind(transaction.subtotal().cents())
        .bind(transaction.tax_amount().cents())
        .bind(transaction.total().cents())
        .bind(transaction.item_count())
        .bind(method)
        .bind(card_type)
        .bind(tendered)
        .bind(change)
        .bind(now)
        .execute(&mut *dbtx)
        .await?;

        for line in transaction.lines() {
            sqlx::query(
                r#"
                INSERT INTO completed_transaction_items (
                    id, transaction_id, upc, description, quantity,
                    unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(line.upc())
            .bind(line.description())
            .bind(line.quantity())
            .bind(line.unit_price().cents())
            .bind(line.line_total().cents())
            .execute(&mut *dbtx)
            .await?;
        }

        dbtx.commit().await?;

        Ok(())
    }

    /// Units sold per UPC over the trailing `days` window.
    pub async fn sales_aggregate_for_days(&self, days: u32) -> DbResult<HashMap<String, i64>> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT i.upc, SUM(i.quantity)
            FROM completed_transaction_items i
            JOIN completed_transactions t ON t.id = i.transaction_id
            WHERE t.completed_at >= ?1
            GROUP BY i.upc
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Number of completed transactions on record.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM completed_transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
