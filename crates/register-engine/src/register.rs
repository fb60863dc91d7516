//! # The Register Orchestrator
//!
//! Owns the live transaction and the in-memory mirror of outstanding
//! suspensions, and enforces every rule the transaction aggregate itself
//! does not: no scans during tendering, the suspension ceiling, per-day
//! sequence ids, and store/mirror agreement.
//!
//! ## Shared-State Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  input thread ──► scan / void / tender / suspend / resume               │
//! │  cleanup task ──► cleanup_older_than / cleanup_expired                  │
//! │                                                                         │
//! │  Both touch the suspension mirror, so every mutation of it holds the    │
//! │  suspensions mutex ACROSS the paired store call: a reader can never     │
//! │  observe the mirror and the store mid-divergence. Lock order when both  │
//! │  are needed is always current-then-suspensions.                         │
//! │                                                                         │
//! │  Mutation rule: the store call goes first, and the mirror (and the      │
//! │  live transaction) change only after it succeeds. A store failure       │
//! │  leaves everything exactly as it was.                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use register_core::snapshot::{create_suspension, format_suspension_id, restore_transaction};
use register_core::validation::validate_upc;
use register_core::{
    CardType, Money, Payment, SuspensionSnapshot, Transaction, ValidationError,
    MAX_SUSPENDED_TRANSACTIONS,
};

use crate::clock::Clock;
use crate::contracts::{CatalogLookup, DisplaySink, PersistenceStore, ReceiptSink};
use crate::error::{RegisterError, RegisterResult};

// =============================================================================
// Register
// =============================================================================

/// The register: one live transaction, one lane.
pub struct Register<P, C> {
    store: P,
    catalog: C,
    clock: Arc<dyn Clock>,
    display: Option<Arc<dyn DisplaySink>>,
    receipts: Option<Arc<dyn ReceiptSink>>,
    current: Mutex<Transaction>,
    suspensions: Mutex<Vec<SuspensionSnapshot>>,
    receipt_seq: AtomicU32,
}

impl<P, C> Register<P, C>
where
    P: PersistenceStore,
    C: CatalogLookup,
{
    /// Creates a register, loading outstanding suspensions from the store so
    /// the in-memory mirror starts in agreement with it.
    pub async fn new(store: P, catalog: C, clock: Arc<dyn Clock>) -> RegisterResult<Self> {
        let suspensions = store.load_all_suspensions().await?;

        if !suspensions.is_empty() {
            info!(
                count = suspensions.len(),
                "Loaded suspended transactions from store"
            );
        }

        Ok(Register {
            store,
            catalog,
            clock,
            display: None,
            receipts: None,
            current: Mutex::new(Transaction::new()),
            suspensions: Mutex::new(suspensions),
            receipt_seq: AtomicU32::new(0),
        })
    }

    /// Attaches the operator display. Call before sharing the register.
    pub fn with_display(mut self, display: Arc<dyn DisplaySink>) -> Self {
        self.display = Some(display);
        self
    }

    /// Attaches the receipt sink. Call before sharing the register.
    pub fn with_receipts(mut self, receipts: Arc<dyn ReceiptSink>) -> Self {
        self.receipts = Some(receipts);
        self
    }

    // -------------------------------------------------------------------------
    // Display plumbing
    // -------------------------------------------------------------------------

    fn notify_update(&self, transaction: &Transaction) {
        if let Some(display) = &self.display {
            display.update(transaction);
        }
    }

    fn notify_error(&self, message: &str) {
        if let Some(display) = &self.display {
            display.show_error(message);
        }
    }

    // -------------------------------------------------------------------------
    // Shopping operations
    // -------------------------------------------------------------------------

    /// Processes a UPC from any input source (scanner, keyboard, grid).
    ///
    /// Rejected during tendering; the basket is locked once payment starts.
    pub async fn scan(&self, upc: &str) -> RegisterResult<()> {
        let mut current = self.current.lock().await;

        if current.is_tendering() {
            let message = "Cannot add items during payment. Void transaction to start over.";
            warn!("Rejected scan during tendering phase");
            self.notify_error(message);
            return Err(RegisterError::InvalidState {
                message: "cannot add items during tendering".to_string(),
            });
        }

        let upc = validate_upc(upc).map_err(|e| {
            warn!(error = %e, "Rejected scan: invalid UPC");
            self.notify_error(&e.to_string());
            RegisterError::from(e)
        })?;

        let item = match self.catalog.item_by_upc(&upc).await? {
            Some(item) => item,
            None => {
                warn!(upc = %upc, "Item not found");
                self.notify_error(&format!("Item not found: {upc}"));
                return Err(RegisterError::ItemNotFound { upc });
            }
        };

        current.add_item(item);

        let quantity = current
            .lines()
            .iter()
            .find(|l| l.upc() == upc)
            .map(|l| l.quantity())
            .unwrap_or(1);
        debug!(
            upc = %upc,
            quantity,
            subtotal = %current.subtotal(),
            tax = %current.tax_amount(),
            total = %current.total(),
            "Item scanned"
        );

        self.notify_update(&current);
        Ok(())
    }

    /// Voids the line at the given position.
    pub async fn void_line(&self, index: usize) -> RegisterResult<()> {
        let mut current = self.current.lock().await;

        let line = current.remove_item(index).map_err(|e| {
            warn!(index, error = %e, "Rejected void");
            RegisterError::from(e)
        })?;

        info!(
            upc = %line.upc(),
            quantity = line.quantity(),
            line_total = %line.line_total(),
            "Line voided"
        );

        self.notify_update(&current);
        Ok(())
    }

    /// Sets the quantity of the line at the given position. Quantities below
    /// 1 are rejected without mutation.
    pub async fn change_quantity(&self, index: usize, quantity: i64) -> RegisterResult<()> {
        let mut current = self.current.lock().await;

        let old_quantity = current.line(index).map(|l| l.quantity());
        current.change_quantity(index, quantity).map_err(|e| {
            let message = e.to_string();
            warn!(index, quantity, error = %message, "Rejected quantity change");
            self.notify_error(&message);
            RegisterError::from(e)
        })?;

        debug!(
            index,
            old_quantity,
            new_quantity = quantity,
            subtotal = %current.subtotal(),
            "Quantity changed"
        );

        self.notify_update(&current);
        Ok(())
    }

    /// Starts the tendering phase, locking the basket for payment.
    pub async fn start_tendering(&self) -> RegisterResult<()> {
        let mut current = self.current.lock().await;

        current.start_tendering().map_err(|e| {
            let message = e.to_string();
            warn!(error = %message, "Rejected tendering start");
            self.notify_error(&message);
            RegisterError::from(e)
        })?;

        let breakdown = current.tax_breakdown();
        info!(
            subtotal = %current.subtotal(),
            tax = %breakdown.total_tax(),
            total = %current.total(),
            categories = breakdown.categories().len(),
            "Tendering phase started - items locked"
        );

        self.notify_update(&current);
        Ok(())
    }

    /// Clears the live transaction and starts fresh in SHOPPING.
    pub async fn clear_transaction(&self) {
        let mut current = self.current.lock().await;

        info!(
            lines = current.line_count(),
            total = %current.total(),
            "Transaction cleared"
        );

        current.clear();
        self.notify_update(&current);
    }

    // -------------------------------------------------------------------------
    // Payment operations
    // -------------------------------------------------------------------------
    //
    // Sufficiency checking is deliberately uneven across these paths, matching
    // the tender flows themselves: exact and next-dollar tenders are
    // sufficient by construction, a card charges the total directly, and only
    // the custom cash path can come up short - so only it validates.

    /// Cash tender of exactly the total; no change.
    pub async fn pay_cash_exact(&self) -> RegisterResult<String> {
        let mut current = self.current.lock().await;
        self.require_items(&current)?;

        let total = current.total();
        let payment = Payment::cash(total, Money::zero(), self.clock.now());
        info!(amount = %total, change = %Money::zero(), "Cash payment processed");
        current.set_payment(payment);

        self.complete(&mut current).await
    }

    /// Cash tender rounded up to the next whole dollar.
    pub async fn pay_cash_next_dollar(&self) -> RegisterResult<String> {
        let mut current = self.current.lock().await;
        self.require_items(&current)?;

        let total = current.total();
        let tendered = total.next_dollar();
        let change = tendered - total;
        let payment = Payment::cash(tendered, change, self.clock.now());
        info!(amount = %tendered, change = %change, "Cash payment processed");
        current.set_payment(payment);

        self.complete(&mut current).await
    }

    /// Cash tender of an arbitrary amount. Rejected when it does not cover
    /// the total; this is the one payment path that can come up short.
    pub async fn pay_cash_custom(&self, tendered: Money) -> RegisterResult<String> {
        let mut current = self.current.lock().await;
        self.require_items(&current)?;

        let total = current.total();
        if tendered < total {
            let err = ValidationError::InsufficientPayment {
                tendered: tendered.to_string(),
                total: total.to_string(),
            };
            warn!(tendered = %tendered, total = %total, "Payment rejected: insufficient amount");
            self.notify_error(&err.to_string());
            return Err(err.into());
        }

        let change = tendered - total;
        let payment = Payment::cash(tendered, change, self.clock.now());
        info!(amount = %tendered, change = %change, "Cash payment processed");
        current.set_payment(payment);

        self.complete(&mut current).await
    }

    /// Card tender of exactly the total.
    pub async fn pay_card(&self, card_type: CardType) -> RegisterResult<String> {
        let mut current = self.current.lock().await;
        self.require_items(&current)?;

        let total = current.total();
        let payment = Payment::card(card_type, total, self.clock.now());
        info!(card = card_type.display_name(), amount = %total, "Card payment processed");
        current.set_payment(payment);

        self.complete(&mut current).await
    }

    fn require_items(&self, current: &Transaction) -> RegisterResult<()> {
        if current.is_empty() {
            warn!("Cannot process payment: transaction is empty");
            return Err(RegisterError::InvalidState {
                message: "cannot process payment on an empty transaction".to_string(),
            });
        }
        Ok(())
    }

    /// Completes the paid transaction: receipt out, sale recorded, fresh
    /// SHOPPING transaction. Receipt and analytics failures are logged but
    /// never un-ring the sale.
    async fn complete(&self, current: &mut Transaction) -> RegisterResult<String> {
        let completed_at = self.clock.now();
        let receipt_number = self.next_receipt_number(completed_at);

        if let Some(receipts) = &self.receipts {
            let receipt = receipts.create(current, &receipt_number, completed_at);
            if receipts.persist(&receipt) {
                debug!(receipt_number = %receipt_number, "Receipt persisted");
            } else {
                warn!(receipt_number = %receipt_number, "Failed to persist receipt");
            }
        }

        if let Err(e) = self
            .store
            .save_completed_transaction(current, &receipt_number)
            .await
        {
            error!(receipt_number = %receipt_number, error = %e, "Failed to record completed transaction");
        }

        info!(receipt_number = %receipt_number, total = %current.total(), "Transaction completed");

        current.clear();
        self.notify_update(current);

        Ok(receipt_number)
    }

    fn next_receipt_number(&self, completed_at: DateTime<Utc>) -> String {
        let seq = self.receipt_seq.fetch_add(1, Ordering::Relaxed) % 1000;
        format!("R-{}-{:03}", completed_at.format("%Y%m%d-%H%M%S"), seq)
    }

    // -------------------------------------------------------------------------
    // Suspend / Resume
    // -------------------------------------------------------------------------

    /// Suspends the live transaction, parking it in the store.
    ///
    /// Valid from either state. Returns the new suspension id. On any
    /// rejection or store failure nothing changes: not the live transaction,
    /// not the mirror, not the store.
    pub async fn suspend(&self, note: Option<String>) -> RegisterResult<String> {
        let mut current = self.current.lock().await;

        if current.is_empty() {
            let err = ValidationError::Required {
                field: "transaction items".to_string(),
            };
            warn!("Cannot suspend empty transaction");
            self.notify_error("Cannot suspend an empty transaction");
            return Err(err.into());
        }

        let mut suspensions = self.suspensions.lock().await;

        if suspensions.len() >= MAX_SUSPENDED_TRANSACTIONS {
            let err = RegisterError::LimitExceeded {
                max: MAX_SUSPENDED_TRANSACTIONS,
            };
            warn!(max = MAX_SUSPENDED_TRANSACTIONS, "Suspension limit reached");
            self.notify_error(&err.to_string());
            return Err(err);
        }

        let today = self.clock.today();
        let sequence = self.store.next_sequence_for_day(today).await?;
        let id = format_suspension_id(today, sequence);

        let snapshot = create_suspension(&current, id.as_str(), note.clone(), self.clock.now())?;

        if let Err(e) = self.store.save_suspension(&snapshot).await {
            error!(id = %id, error = %e, "Failed to save suspension");
            self.notify_error("Failed to suspend transaction");
            return Err(e.into());
        }

        info!(
            id = %id,
            items = snapshot.item_count,
            total = %snapshot.total,
            note = note.as_deref().unwrap_or(""),
            "Transaction suspended"
        );

        // Store write succeeded: now mutate. Newest sits at the front so the
        // mirror keeps the store's most-recent-first order.
        suspensions.insert(0, snapshot);
        current.clear();
        self.notify_update(&current);

        Ok(id)
    }

    /// Resumes a suspended transaction by id, installing it as the live one.
    ///
    /// The live transaction must be empty; suspend or void it first.
    pub async fn resume(&self, id: &str) -> RegisterResult<()> {
        let mut current = self.current.lock().await;

        if !current.is_empty() {
            let err = RegisterError::Conflict {
                message: "current transaction has items; suspend or void it before resuming"
                    .to_string(),
            };
            warn!(id = %id, "Cannot resume while current transaction has items");
            self.notify_error(
                "Current transaction has items. Suspend or void it before resuming.",
            );
            return Err(err);
        }

        let mut suspensions = self.suspensions.lock().await;

        let position = suspensions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| {
                warn!(id = %id, "Suspension not found");
                RegisterError::SuspensionNotFound { id: id.to_string() }
            })?;

        // Restore before touching anything: a malformed payload must leave
        // the (empty) live transaction, the mirror, and the store untouched.
        let restored = restore_transaction(&suspensions[position]).map_err(|e| {
            error!(id = %id, error = %e, "Failed to restore transaction");
            RegisterError::from(e)
        })?;

        let deleted = self.store.delete_suspension(id).await?;
        if !deleted {
            warn!(id = %id, "Suspension missing from store on resume");
        }

        let snapshot = suspensions.remove(position);
        info!(
            id = %snapshot.id,
            items = restored.item_count(),
            total = %restored.total(),
            "Transaction resumed"
        );

        *current = restored;
        self.notify_update(&current);

        Ok(())
    }

    /// Deletes a suspension without resuming it. Returns whether it existed.
    pub async fn delete_suspension(&self, id: &str) -> RegisterResult<bool> {
        let mut suspensions = self.suspensions.lock().await;

        let position = match suspensions.iter().position(|s| s.id == id) {
            Some(p) => p,
            None => return Ok(false),
        };

        let deleted = self.store.delete_suspension(id).await?;
        suspensions.remove(position);

        if deleted {
            info!(id = %id, "Deleted suspended transaction");
        }

        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Expiry cleanup
    // -------------------------------------------------------------------------

    /// Removes every suspension from a calendar day strictly before today.
    /// Same-day suspensions survive. Returns the count removed.
    pub async fn cleanup_expired(&self) -> RegisterResult<u64> {
        let today = self.clock.today();
        let mut suspensions = self.suspensions.lock().await;

        let removed = self.store.delete_expired_before(today).await?;
        suspensions.retain(|s| !s.is_from_previous_day(today));

        info!(removed, "Expired suspensions cleaned up");
        Ok(removed)
    }

    /// Removes every suspension suspended strictly before `cutoff` - the
    /// retention-window policy, distinct from the day-boundary one above.
    /// Returns the count removed.
    pub async fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> RegisterResult<u64> {
        let mut suspensions = self.suspensions.lock().await;

        let removed = self.store.delete_older_than(cutoff).await?;
        suspensions.retain(|s| s.suspended_at >= cutoff);

        info!(removed, cutoff = %cutoff, "Old suspensions cleaned up");
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Runs a closure with read access to the live transaction.
    pub async fn with_transaction<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Transaction) -> R,
    {
        let current = self.current.lock().await;
        f(&current)
    }

    /// A copy of the outstanding suspensions, most recent first.
    pub async fn suspensions(&self) -> Vec<SuspensionSnapshot> {
        self.suspensions.lock().await.clone()
    }

    /// Number of outstanding suspensions.
    pub async fn suspension_count(&self) -> usize {
        self.suspensions.lock().await.len()
    }

    /// Whether the suspension ceiling has been reached.
    pub async fn is_limit_reached(&self) -> bool {
        self.suspensions.lock().await.len() >= MAX_SUSPENDED_TRANSACTIONS
    }

    /// Daily sequence clock reference, used by the scheduler.
    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Logs shutdown state. Suspensions persist until their expiry cleanup.
    pub async fn shutdown(&self) {
        let outstanding = self.suspension_count().await;
        if outstanding > 0 {
            info!(
                outstanding,
                "Shutting down with suspended transactions; they persist until cleanup"
            );
        } else {
            info!("Shutting down register");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex as StdMutex;

    use register_core::CatalogItem;

    use crate::error::PersistenceError;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct MockStore {
        rows: StdMutex<Vec<SuspensionSnapshot>>,
        sequences: StdMutex<HashMap<NaiveDate, u32>>,
        completed: StdMutex<Vec<(String, i64, i64)>>, // (receipt, total, change)
        fail_saves: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl MockStore {
        fn row_count(&self) -> usize {
            self.rows.lock().expect("rows").len()
        }
    }

    #[async_trait]
    impl PersistenceStore for MockStore {
        async fn save_suspension(
            &self,
            snapshot: &SuspensionSnapshot,
        ) -> Result<(), PersistenceError> {
            if self.fail_saves.load(Ordering::Relaxed) {
                return Err(PersistenceError::new("disk on fire"));
            }
            self.rows.lock().expect("rows").push(snapshot.clone());
            Ok(())
        }

        async fn load_all_suspensions(
            &self,
        ) -> Result<Vec<SuspensionSnapshot>, PersistenceError> {
            let mut rows = self.rows.lock().expect("rows").clone();
            rows.sort_by(|a, b| b.suspended_at.cmp(&a.suspended_at));
            Ok(rows)
        }

        async fn delete_suspension(&self, id: &str) -> Result<bool, PersistenceError> {
            if self.fail_deletes.load(Ordering::Relaxed) {
                return Err(PersistenceError::new("disk on fire"));
            }
            let mut rows = self.rows.lock().expect("rows");
            let before = rows.len();
            rows.retain(|s| s.id != id);
            Ok(rows.len() < before)
        }

        async fn next_sequence_for_day(&self, day: NaiveDate) -> Result<u32, PersistenceError> {
            let mut sequences = self.sequences.lock().expect("sequences");
            let seq = sequences.entry(day).or_insert(0);
            *seq += 1;
            Ok(*seq)
        }

        async fn delete_expired_before(&self, day: NaiveDate) -> Result<u64, PersistenceError> {
            let mut rows = self.rows.lock().expect("rows");
            let before = rows.len();
            rows.retain(|s| s.suspension_date() >= day);
            Ok((before - rows.len()) as u64)
        }

        async fn delete_older_than(
            &self,
            cutoff: DateTime<Utc>,
        ) -> Result<u64, PersistenceError> {
            let mut rows = self.rows.lock().expect("rows");
            let before = rows.len();
            rows.retain(|s| s.suspended_at >= cutoff);
            Ok((before - rows.len()) as u64)
        }

        async fn save_completed_transaction(
            &self,
            transaction: &Transaction,
            receipt_number: &str,
        ) -> Result<(), PersistenceError> {
            let change = transaction
                .payment()
                .map(|p| p.change().cents())
                .unwrap_or(0);
            self.completed.lock().expect("completed").push((
                receipt_number.to_string(),
                transaction.total().cents(),
                change,
            ));
            Ok(())
        }

        async fn sales_aggregate_for_days(
            &self,
            _days: u32,
        ) -> Result<HashMap<String, i64>, PersistenceError> {
            Ok(HashMap::new())
        }
    }

    struct MockCatalog {
        items: HashMap<String, CatalogItem>,
    }

    impl MockCatalog {
        fn with_test_items() -> Self {
            let mut items = HashMap::new();
            for item in [
                CatalogItem::new("A", "Cola", Money::from_cents(100), "OTHER", false)
                    .expect("valid"),
                CatalogItem::new("B", "Cigarettes", Money::from_cents(500), "TOBACCO", false)
                    .expect("valid"),
                CatalogItem::new("C", "Beer", Money::from_cents(899), "ALCOHOL", false)
                    .expect("valid"),
            ] {
                items.insert(item.upc().to_string(), item);
            }
            MockCatalog { items }
        }
    }

    #[async_trait]
    impl CatalogLookup for MockCatalog {
        async fn item_by_upc(&self, upc: &str) -> Result<Option<CatalogItem>, PersistenceError> {
            Ok(self.items.get(upc).cloned())
        }
    }

    struct FixedClock {
        now: StdMutex<DateTime<Utc>>,
    }

    impl FixedClock {
        fn at(now: &str) -> Arc<Self> {
            Arc::new(FixedClock {
                now: StdMutex::new(now.parse().expect("timestamp")),
            })
        }

        fn set(&self, now: &str) {
            *self.now.lock().expect("now") = now.parse().expect("timestamp");
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("now")
        }
    }

    async fn test_register() -> (Arc<FixedClock>, Register<Arc<MockStore>, MockCatalog>) {
        let clock = FixedClock::at("2024-01-15T10:00:00Z");
        let register = Register::new(
            Arc::new(MockStore::default()),
            MockCatalog::with_test_items(),
            clock.clone() as Arc<dyn Clock>,
        )
        .await
        .expect("register");
        (clock, register)
    }

    #[async_trait]
    impl PersistenceStore for Arc<MockStore> {
        async fn save_suspension(
            &self,
            snapshot: &SuspensionSnapshot,
        ) -> Result<(), PersistenceError> {
            (**self).save_suspension(snapshot).await
        }
        async fn load_all_suspensions(
            &self,
        ) -> Result<Vec<SuspensionSnapshot>, PersistenceError> {
            (**self).load_all_suspensions().await
        }
        async fn delete_suspension(&self, id: &str) -> Result<bool, PersistenceError> {
            (**self).delete_suspension(id).await
        }
        async fn next_sequence_for_day(&self, day: NaiveDate) -> Result<u32, PersistenceError> {
            (**self).next_sequence_for_day(day).await
        }
        async fn delete_expired_before(&self, day: NaiveDate) -> Result<u64, PersistenceError> {
            (**self).delete_expired_before(day).await
        }
        async fn delete_older_than(
            &self,
            cutoff: DateTime<Utc>,
        ) -> Result<u64, PersistenceError> {
            (**self).delete_older_than(cutoff).await
        }
        async fn save_completed_transaction(
            &self,
            transaction: &Transaction,
            receipt_number: &str,
        ) -> Result<(), PersistenceError> {
            (**self)
                .save_completed_transaction(transaction, receipt_number)
                .await
        }
        async fn sales_aggregate_for_days(
            &self,
            days: u32,
        ) -> Result<HashMap<String, i64>, PersistenceError> {
            (**self).sales_aggregate_for_days(days).await
        }
    }

    fn store_of(register: &Register<Arc<MockStore>, MockCatalog>) -> Arc<MockStore> {
        register.store.clone()
    }

    // -------------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_scan_adds_and_increments() {
        let (_clock, register) = test_register().await;

        register.scan("A").await.expect("scan");
        register.scan("A").await.expect("scan");

        register
            .with_transaction(|tx| {
                assert_eq!(tx.line_count(), 1);
                assert_eq!(tx.item_count(), 2);
                assert_eq!(tx.subtotal().cents(), 200);
            })
            .await;
    }

    #[tokio::test]
    async fn test_scan_unknown_upc() {
        let (_clock, register) = test_register().await;

        let err = register.scan("ZZZ").await.expect_err("unknown");
        assert!(matches!(err, RegisterError::ItemNotFound { .. }));
        assert!(register.with_transaction(|tx| tx.is_empty()).await);
    }

    #[tokio::test]
    async fn test_scan_empty_upc() {
        let (_clock, register) = test_register().await;

        let err = register.scan("   ").await.expect_err("empty");
        assert!(matches!(err, RegisterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_scan_rejected_during_tendering() {
        let (_clock, register) = test_register().await;

        register.scan("A").await.expect("scan");
        register.start_tendering().await.expect("tender");

        let err = register.scan("B").await.expect_err("locked");
        assert!(matches!(err, RegisterError::InvalidState { .. }));
        assert_eq!(register.with_transaction(|tx| tx.line_count()).await, 1);
    }

    #[tokio::test]
    async fn test_mixed_basket_totals() {
        let (_clock, register) = test_register().await;

        register.scan("A").await.expect("scan");
        register.scan("A").await.expect("scan");
        register.scan("B").await.expect("scan");

        register
            .with_transaction(|tx| {
                assert_eq!(tx.subtotal().cents(), 700);
                assert_eq!(tx.tax_amount().cents(), 114);
                assert_eq!(tx.total().cents(), 814);
                assert!(tx.tax_breakdown().has_multiple_rates());
            })
            .await;
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_pay_cash_exact_completes_and_resets() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        register.start_tendering().await.expect("tender");

        let receipt_number = register.pay_cash_exact().await.expect("payment");
        assert!(receipt_number.starts_with("R-20240115-"));

        // Live transaction reset to a fresh SHOPPING one
        register
            .with_transaction(|tx| {
                assert!(tx.is_empty());
                assert!(tx.is_shopping());
                assert!(tx.payment().is_none());
            })
            .await;

        let completed = store.completed.lock().expect("completed");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].1, 107); // $1.00 + 7% tax
        assert_eq!(completed[0].2, 0); // exact cash: no change
    }

    #[tokio::test]
    async fn test_pay_next_dollar_change() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        // $8.14 total -> $9.00 tendered, $0.86 change
        register.scan("A").await.expect("scan");
        register.scan("A").await.expect("scan");
        register.scan("B").await.expect("scan");
        register.start_tendering().await.expect("tender");

        register.pay_cash_next_dollar().await.expect("payment");

        let completed = store.completed.lock().expect("completed");
        assert_eq!(completed[0].1, 814);
        assert_eq!(completed[0].2, 86);
    }

    #[tokio::test]
    async fn test_pay_custom_cash_insufficient_rejected() {
        let (_clock, register) = test_register().await;

        register.scan("B").await.expect("scan"); // $5.00 + $1.00 tax
        register.start_tendering().await.expect("tender");

        let err = register
            .pay_cash_custom(Money::from_cents(500))
            .await
            .expect_err("short");
        assert!(matches!(err, RegisterError::Validation(_)));

        // Still tendering, nothing paid, nothing cleared
        register
            .with_transaction(|tx| {
                assert!(tx.is_tendering());
                assert!(tx.payment().is_none());
                assert_eq!(tx.line_count(), 1);
            })
            .await;
    }

    #[tokio::test]
    async fn test_pay_empty_transaction_rejected() {
        let (_clock, register) = test_register().await;

        let err = register.pay_cash_exact().await.expect_err("empty");
        assert!(matches!(err, RegisterError::InvalidState { .. }));
    }

    // -------------------------------------------------------------------------
    // Suspend / Resume
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_suspend_parks_and_resets() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        register.scan("B").await.expect("scan");

        let id = register
            .suspend(Some("customer forgot wallet".into()))
            .await
            .expect("suspend");
        assert_eq!(id, "S-20240115-001");

        assert!(register.with_transaction(|tx| tx.is_empty()).await);
        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(store.row_count(), 1);

        let suspensions = register.suspensions().await;
        assert_eq!(suspensions[0].id, id);
        assert_eq!(suspensions[0].item_count, 2);
        assert_eq!(suspensions[0].note.as_deref(), Some("customer forgot wallet"));
    }

    #[tokio::test]
    async fn test_suspend_empty_rejected() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        let err = register.suspend(None).await.expect_err("empty");
        assert!(matches!(err, RegisterError::Validation(_)));
        assert_eq!(register.suspension_count().await, 0);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_suspend_sequence_increments() {
        let (_clock, register) = test_register().await;

        for expected in ["S-20240115-001", "S-20240115-002", "S-20240115-003"] {
            register.scan("A").await.expect("scan");
            let id = register.suspend(None).await.expect("suspend");
            assert_eq!(id, expected);
        }
    }

    #[tokio::test]
    async fn test_suspend_at_ceiling_rejected() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        for _ in 0..MAX_SUSPENDED_TRANSACTIONS {
            register.scan("A").await.expect("scan");
            register.suspend(None).await.expect("suspend");
        }
        assert_eq!(register.suspension_count().await, 10);

        register.scan("B").await.expect("scan");
        let err = register.suspend(None).await.expect_err("ceiling");
        assert!(matches!(err, RegisterError::LimitExceeded { max: 10 }));
        assert!(err.to_string().contains("10"));

        // List unchanged, live transaction unchanged
        assert_eq!(register.suspension_count().await, 10);
        assert_eq!(store.row_count(), 10);
        assert_eq!(register.with_transaction(|tx| tx.line_count()).await, 1);
        assert!(register.is_limit_reached().await);
    }

    #[tokio::test]
    async fn test_suspend_store_failure_mutates_nothing() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        store.fail_saves.store(true, Ordering::Relaxed);

        let err = register.suspend(None).await.expect_err("store down");
        assert!(matches!(err, RegisterError::Persistence(_)));

        assert_eq!(register.with_transaction(|tx| tx.line_count()).await, 1);
        assert_eq!(register.suspension_count().await, 0);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_suspend_resume_is_inverse() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        register.scan("A").await.expect("scan");
        register.scan("B").await.expect("scan");
        let before =
            register.with_transaction(|tx| (tx.subtotal(), tx.tax_amount(), tx.total())).await;

        let id = register.suspend(None).await.expect("suspend");
        let id2 = {
            register.scan("C").await.expect("scan");
            register.suspend(None).await.expect("suspend")
        };
        assert_eq!(register.suspension_count().await, 2);

        register.resume(&id).await.expect("resume");

        register
            .with_transaction(|tx| {
                assert_eq!(tx.line_count(), 2);
                assert_eq!(tx.line(0).expect("line").quantity(), 2);
                assert_eq!((tx.subtotal(), tx.tax_amount(), tx.total()), before);
                assert!(tx.is_shopping());
            })
            .await;

        // Back to pre-suspend membership: only the other suspension remains
        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(register.suspensions().await[0].id, id2);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_resume_restores_tendering_state() {
        let (_clock, register) = test_register().await;

        register.scan("A").await.expect("scan");
        register.start_tendering().await.expect("tender");
        let id = register.suspend(None).await.expect("suspend");

        register.resume(&id).await.expect("resume");
        assert!(register.with_transaction(|tx| tx.is_tendering()).await);
    }

    #[tokio::test]
    async fn test_resume_with_items_is_conflict() {
        let (_clock, register) = test_register().await;

        register.scan("A").await.expect("scan");
        let id = register.suspend(None).await.expect("suspend");

        register.scan("B").await.expect("scan");
        let err = register.resume(&id).await.expect_err("conflict");
        assert!(matches!(err, RegisterError::Conflict { .. }));

        // Neither side mutated
        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(register.with_transaction(|tx| tx.line_count()).await, 1);
    }

    #[tokio::test]
    async fn test_resume_unknown_id() {
        let (_clock, register) = test_register().await;

        let err = register.resume("S-20240115-099").await.expect_err("absent");
        assert!(matches!(err, RegisterError::SuspensionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resume_malformed_payload_leaves_everything() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        let id = register.suspend(None).await.expect("suspend");

        // Corrupt the payload in the mirror copy restore will read from
        {
            let mut suspensions = register.suspensions.lock().await;
            suspensions[0].items_payload = "{broken".to_string();
        }

        let err = register.resume(&id).await.expect_err("malformed");
        assert!(matches!(err, RegisterError::Serialization { .. }));

        // Live transaction still empty, snapshot still listed, store untouched
        assert!(register.with_transaction(|tx| tx.is_empty()).await);
        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_resume_store_failure_mutates_nothing() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        let id = register.suspend(None).await.expect("suspend");
        store.fail_deletes.store(true, Ordering::Relaxed);

        let err = register.resume(&id).await.expect_err("store down");
        assert!(matches!(err, RegisterError::Persistence(_)));

        assert!(register.with_transaction(|tx| tx.is_empty()).await);
        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_suspension() {
        let (_clock, register) = test_register().await;
        let store = store_of(&register);

        register.scan("A").await.expect("scan");
        let id = register.suspend(None).await.expect("suspend");

        assert!(register.delete_suspension(&id).await.expect("delete"));
        assert_eq!(register.suspension_count().await, 0);
        assert_eq!(store.row_count(), 0);

        assert!(!register.delete_suspension(&id).await.expect("gone"));
    }

    #[tokio::test]
    async fn test_new_loads_existing_suspensions() {
        let clock = FixedClock::at("2024-01-15T10:00:00Z");
        let store = Arc::new(MockStore::default());

        // Seed the store before the register exists
        {
            let mut tx = Transaction::new();
            tx.add_item(
                CatalogItem::new("A", "Cola", Money::from_cents(100), "OTHER", false)
                    .expect("valid"),
            );
            let snap = register_core::snapshot::create_suspension(
                &tx,
                "S-20240114-001",
                None,
                "2024-01-14T18:00:00Z".parse().expect("timestamp"),
            )
            .expect("snapshot");
            store.rows.lock().expect("rows").push(snap);
        }

        let register = Register::new(
            store.clone(),
            MockCatalog::with_test_items(),
            clock as Arc<dyn Clock>,
        )
        .await
        .expect("register");

        assert_eq!(register.suspension_count().await, 1);
        assert_eq!(register.suspensions().await[0].id, "S-20240114-001");
    }

    // -------------------------------------------------------------------------
    // Cleanup
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_cleanup_expired_spares_today() {
        let (clock, register) = test_register().await;
        let store = store_of(&register);

        // One suspension yesterday, one today
        clock.set("2024-01-14T18:00:00Z");
        register.scan("A").await.expect("scan");
        let old_id = register.suspend(None).await.expect("suspend");

        clock.set("2024-01-15T09:00:00Z");
        register.scan("B").await.expect("scan");
        let new_id = register.suspend(None).await.expect("suspend");

        let removed = register.cleanup_expired().await.expect("cleanup");
        assert_eq!(removed, 1);

        let remaining = register.suspensions().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, new_id);
        assert_ne!(remaining[0].id, old_id);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_older_than_cutoff() {
        let (clock, register) = test_register().await;

        clock.set("2024-01-08T09:00:00Z");
        register.scan("A").await.expect("scan");
        register.suspend(None).await.expect("suspend");

        clock.set("2024-01-15T09:00:00Z");
        register.scan("B").await.expect("scan");
        register.suspend(None).await.expect("suspend");

        // 7-day retention measured from the 15th at noon
        let cutoff = "2024-01-08T12:00:00Z".parse().expect("timestamp");
        let removed = register.cleanup_older_than(cutoff).await.expect("cleanup");
        assert_eq!(removed, 1);
        assert_eq!(register.suspension_count().await, 1);
    }
}
