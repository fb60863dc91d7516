//! # Suspension Repository
//!
//! Database operations for parked transactions.
//!
//! ## Suspension Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. SUSPEND                                                            │
//! │     └── next_sequence_for_day() → 1-based per-day counter              │
//! │     └── save() → row keyed S-YYYYMMDD-NNN                              │
//! │                                                                         │
//! │  2. (LATER)                                                            │
//! │     └── load_all() → most recent first, for the lane display           │
//! │                                                                         │
//! │  3. RESUME or DELETE                                                   │
//! │     └── delete(id) → row removed                                       │
//! │                                                                         │
//! │  4. OR EXPIRE                                                          │
//! │     └── delete_expired_before(day) / delete_older_than(cutoff)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use register_core::{Money, SuspensionSnapshot};

use crate::error::DbResult;

/// Row shape for the `suspended_transactions` table.
#[derive(Debug, sqlx::FromRow)]
struct SuspensionRow {
    id: String,
    suspended_at: DateTime<Utc>,
    transaction_state: String,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    item_count: i64,
    items_payload: String,
    note: Option<String>,
}

impl From<SuspensionRow> for SuspensionSnapshot {
    fn from(row: SuspensionRow) -> Self {
        SuspensionSnapshot {
            id: row.id,
            suspended_at: row.suspended_at,
            transaction_state: row.transaction_state,
            subtotal: Money::from_cents(row.subtotal_cents),
            tax: Money::from_cents(row.tax_cents),
            total: Money::from_cents(row.total_cents),
            item_count: row.item_count,
            items_payload: row.items_payload,
            note: row.note,
        }
    }
}

/// Repository for suspended-transaction database operations.
#[derive(Debug, Clone)]
pub struct SuspensionRepository {
    pool: SqlitePool,
}

impl SuspensionRepository {
    /// Creates a new SuspensionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SuspensionRepository { pool }
    }

    /// Persists a suspension snapshot.
    ///
    /// The calendar day is stored alongside the timestamp so day-boundary
    /// cleanup is one indexed comparison.
    pub async fn save(&self, snapshot: &SuspensionSnapshot) -> DbResult<()> {
        debug!(id = %snapshot.id, items = snapshot.item_count, "Saving suspension");

        sqlx::query(
            r#"
            INSERT INTO suspended_transactions (
                id, suspended_at, suspension_date, transaction_state,
                subtotal_cents, tax_cents, total_cents, item_count,
                items_payload, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&snapshot.id)
        .bind(snapshot.suspended_at)
        .bind(snapshot.suspension_date())
        .bind(&snapshot.transaction_state)
        .bind(snapshot.subtotal.cents())
        .bind(snapshot.tax.cents())
        .bind(snapshot.total.cents())
        .bind(snapshot.item_count)
        .bind(&snapshot.items_payload)
        .bind(&snapshot.note)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads every outstanding suspension, most recent suspend time first.
    pub async fn load_all(&self) -> DbResult<Vec<SuspensionSnapshot>> {
        let rows: Vec<SuspensionRow> = sqlx::query_as(
            r#"
            SELECT id, suspended_at, transaction_state,
                   subtotal_cents, tax_cents, total_cents, item_count,
                   items_payload, note
            FROM suspended_transactions
            ORDER BY suspended_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SuspensionSnapshot::from).collect())
    }

    /// Deletes a suspension by id. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM suspended_transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Next 1-based sequence number for suspensions created on `day`.
    ///
    /// Backed by a per-day counter row, so the sequence is monotonic within
    /// a day even after suspensions are resumed or deleted - ids are never
    /// reused.
    pub async fn next_sequence_for_day(&self, day: NaiveDate) -> DbResult<u32> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO suspension_sequence (day, last_seq) VALUES (?1, 1)
            ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(seq as u32)
    }

    /// Deletes every suspension from a calendar day strictly before `day`.
    /// Returns the number removed.
    pub async fn delete_expired_before(&self, day: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM suspended_transactions WHERE suspension_date < ?1")
            .bind(day)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every suspension suspended strictly before `cutoff`.
    /// Returns the number removed.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM suspended_transactions WHERE suspended_at < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
