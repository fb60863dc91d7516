//! # Collaborator Contracts
//!
//! The seams between the orchestrator and everything it does not own. The
//! store and catalog are async (they sit on a database); the display and
//! receipt sinks are synchronous local I/O.
//!
//! All of these are object-safe so tests can swap in fakes, and so the
//! binary can wire whatever concrete implementations it likes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use register_core::{CatalogItem, SuspensionSnapshot, Transaction};

use crate::error::PersistenceError;
use crate::receipt::Receipt;

// =============================================================================
// Persistence Store
// =============================================================================

/// Durable storage for suspensions and completed transactions.
///
/// ## Contract
/// Every method either fully succeeds or fails leaving the store unchanged;
/// the engine never observes partial writes. Calls are synchronous from the
/// engine's perspective - the engine awaits them inline and surfaces failures
/// to the caller of the operation that needed them.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Persists a suspension snapshot.
    async fn save_suspension(&self, snapshot: &SuspensionSnapshot)
        -> Result<(), PersistenceError>;

    /// Loads every outstanding suspension, most recent suspend time first.
    async fn load_all_suspensions(&self) -> Result<Vec<SuspensionSnapshot>, PersistenceError>;

    /// Deletes a suspension by id. Returns whether a row was removed.
    async fn delete_suspension(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Next 1-based sequence number for suspensions created on `day`.
    /// Monotonic within a day, even across deletes.
    async fn next_sequence_for_day(&self, day: NaiveDate) -> Result<u32, PersistenceError>;

    /// Deletes every suspension whose suspension date is strictly before
    /// `day`. Returns the number removed.
    async fn delete_expired_before(&self, day: NaiveDate) -> Result<u64, PersistenceError>;

    /// Deletes every suspension suspended strictly before `cutoff`.
    /// Returns the number removed. This is the retention-window variant;
    /// the day-boundary variant above is a distinct policy.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError>;

    /// Records a completed (paid) transaction under its receipt number.
    async fn save_completed_transaction(
        &self,
        transaction: &Transaction,
        receipt_number: &str,
    ) -> Result<(), PersistenceError>;

    /// Units sold per UPC over the trailing `days` window.
    async fn sales_aggregate_for_days(
        &self,
        days: u32,
    ) -> Result<HashMap<String, i64>, PersistenceError>;
}

// =============================================================================
// Catalog Lookup
// =============================================================================

/// Read access to the item catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Looks up an item by UPC. `None` when the UPC is not stocked.
    async fn item_by_upc(&self, upc: &str) -> Result<Option<CatalogItem>, PersistenceError>;
}

// =============================================================================
// Display Sink
// =============================================================================

/// The operator-facing display.
///
/// The engine pushes the whole transaction after every mutation and routes
/// rejection messages here; how any of it is rendered is not its business.
pub trait DisplaySink: Send + Sync {
    /// Re-renders the current transaction.
    fn update(&self, transaction: &Transaction);

    /// Shows a rejection or failure message to the operator.
    fn show_error(&self, message: &str);
}

// =============================================================================
// Receipt Sink
// =============================================================================

/// Builds and persists receipts at transaction completion.
pub trait ReceiptSink: Send + Sync {
    /// Builds a receipt from a paid transaction.
    ///
    /// The default projection is [`Receipt::from_transaction`]; implementors
    /// only need to override this when they enrich the receipt.
    fn create(
        &self,
        transaction: &Transaction,
        receipt_number: &str,
        completed_at: DateTime<Utc>,
    ) -> Receipt {
        Receipt::from_transaction(transaction, receipt_number, completed_at)
    }

    /// Persists a receipt. Returns whether the write succeeded; a failed
    /// receipt write never fails the sale.
    fn persist(&self, receipt: &Receipt) -> bool;
}
