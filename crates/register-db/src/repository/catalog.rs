//! # Catalog Repository
//!
//! Database operations for the item catalog: UPC lookup during scanning,
//! price book ingestion, and the popularity flag behind the quick-pick grid.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use register_core::{CatalogItem, Money};

use crate::error::{DbError, DbResult};

/// How many top sellers get the popular flag by default.
pub const DEFAULT_POPULAR_TOP_N: i64 = 65;

/// Trailing sales window, in days, behind the popularity ranking.
pub const POPULARITY_PERIOD_DAYS: u32 = 30;

/// Row shape for the `items` table.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    upc: String,
    description: String,
    price_cents: i64,
    category: String,
    popular: bool,
}

impl ItemRow {
    /// Rehydrates the domain type, re-running its constructor validation so
    /// a corrupted row surfaces as an error instead of a bad basket.
    fn into_item(self) -> DbResult<CatalogItem> {
        CatalogItem::new(
            self.upc,
            self.description,
            Money::from_cents(self.price_cents),
            &self.category,
            self.popular,
        )
        .map_err(|e| DbError::invalid_row(e.to_string()))
    }
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts an item.
    ///
    /// A duplicate UPC fails with `UniqueViolation` (expected when re-loading
    /// a price book; the loader counts it as a skip).
    pub async fn insert_item(&self, item: &CatalogItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO items (upc, description, price_cents, category, popular)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(item.upc())
        .bind(item.description())
        .bind(item.price().cents())
        .bind(item.category())
        .bind(item.popular())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieves an item by its UPC. `None` when not stocked.
    pub async fn get_by_upc(&self, upc: &str) -> DbResult<Option<CatalogItem>> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            SELECT upc, description, price_cents, category, popular
            FROM items
            WHERE upc = ?1
            "#,
        )
        .bind(upc)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ItemRow::into_item).transpose()
    }

    /// All items, ordered by description for grid display.
    pub async fn all_items(&self) -> DbResult<Vec<CatalogItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT upc, description, price_cents, category, popular
            FROM items
            ORDER BY description
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    /// Items currently flagged popular, ordered by description.
    pub async fn popular_items(&self) -> DbResult<Vec<CatalogItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT upc, description, price_cents, category, popular
            FROM items
            WHERE popular = 1
            ORDER BY description
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    /// Number of items in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes every item. Useful for tests and full price book reloads.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM items").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Recalculates the popular flags from recent sales.
    ///
    /// The top `top_n` sellers by units over the trailing `period_days` are
    /// flagged; everything else is unflagged. With no sales history the
    /// existing flags are left alone (the static price book configuration
    /// keeps serving the grid).
    ///
    /// Returns the number of items flagged.
    pub async fn recalculate_popular(&self, top_n: i64, period_days: u32) -> DbResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(period_days));

        let sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT i.upc)
            FROM completed_transaction_items i
            JOIN completed_transactions t ON t.id = i.transaction_id
            WHERE t.completed_at >= ?1
            "#,
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        if sold == 0 {
            debug!("No sales data yet; keeping static popularity flags");
            return Ok(0);
        }

        let mut dbtx = self.pool.begin().await?;

        sqlx::query("UPDATE items SET popular = 0")
            .execute(&mut *dbtx)
            .await?;

        let result = sqlx::query(
            r#"
            UPDATE items SET popular = 1 WHERE upc IN (
                SELECT i.upc
                FROM completed_transaction_items i
                JOIN completed_transactions t ON t.id = i.transaction_id
                WHERE t.completed_at >= ?1
                GROUP BY i.upc
                ORDER BY SUM(i.quantity) DESC
                LIMIT ?2
            )
            "#,
        )
        .bind(cutoff)
        .bind(top_n)
        .execute(&mut *dbtx)
        .await?;

        dbtx.commit().await?;

        let flagged = result.rows_affected();
        info!(flagged, period_days, "Popular items recalculated");
        Ok(flagged)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
