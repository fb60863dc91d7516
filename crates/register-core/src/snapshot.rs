//! # Suspension Snapshots
//!
//! The at-rest projection of a transaction: what gets written to the store
//! when a checkout is parked, and what gets replayed when it is resumed.
//!
//! ## Round-Trip Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   live Transaction ── create_suspension ──► SuspensionSnapshot          │
//! │        ▲                                        │                       │
//! │        │                                        │  (persisted at rest)  │
//! │        └────────── restore_transaction ◄────────┘                       │
//! │                                                                         │
//! │   After restore, subtotal/tax/total/item_count RECOMPUTED from the      │
//! │   rebuilt transaction must equal the snapshot's frozen values. The      │
//! │   frozen values are never read back into the live model - they exist    │
//! │   for list display while parked. A malformed snapshot therefore shows   │
//! │   up as visibly wrong totals, never as silently trusted numbers.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versioned Payload
//! The item list is serialized through an explicit envelope
//! (`{"version":1,"items":[...]}`) with its own record type, not a dump of
//! the in-memory structs. The wire format survives internal refactors, and
//! decode rejects versions it does not understand.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::transaction::{LineItem, Transaction, TransactionState};

/// Current version of the serialized item payload.
pub const ITEMS_PAYLOAD_VERSION: u32 = 1;

// =============================================================================
// Payload Records
// =============================================================================

/// One serialized line: enough to reconstruct the line and its total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub upc: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Tax category, carried so the restored basket re-taxes identically.
    pub category: String,
}

/// The versioned envelope actually written to storage.
#[derive(Debug, Serialize, Deserialize)]
struct ItemsPayload {
    version: u32,
    items: Vec<SnapshotItem>,
}

// =============================================================================
// Suspension Snapshot
// =============================================================================

/// A parked transaction, frozen at suspend time.
///
/// Created only by the orchestrator's suspend operation; destroyed on resume
/// or expiry cleanup. The id format `S-YYYYMMDD-NNN` is a hard contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionSnapshot {
    pub id: String,
    pub suspended_at: DateTime<Utc>,
    /// State name at suspend time: `SHOPPING` or `TENDERING`.
    pub transaction_state: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub item_count: i64,
    /// Serialized item list (see [`encode_items`]).
    pub items_payload: String,
    /// Optional operator note ("customer forgot wallet").
    pub note: Option<String>,
}

impl SuspensionSnapshot {
    /// Calendar day of the suspension, used for day-boundary cleanup.
    pub fn suspension_date(&self) -> NaiveDate {
        self.suspended_at.date_naive()
    }

    /// Whether this snapshot is from a day strictly before `today`
    /// (eligible for the daily cleanup).
    pub fn is_from_previous_day(&self, today: NaiveDate) -> bool {
        self.suspension_date() < today
    }

    /// One-line summary for the suspended-transactions list.
    pub fn display_summary(&self) -> String {
        format!(
            "{} - {} items - {} - {}",
            self.id,
            self.item_count,
            self.total,
            self.suspended_at.format("%b %d, %H:%M")
        )
    }
}

/// Formats a suspension id: `S-` + 8-digit date + `-` + 3-digit sequence.
///
/// ## Example
/// ```rust
/// use register_core::snapshot::format_suspension_id;
///
/// let day = "2024-01-15".parse().unwrap();
/// assert_eq!(format_suspension_id(day, 3), "S-20240115-003");
/// ```
pub fn format_suspension_id(day: NaiveDate, sequence: u32) -> String {
    format!("S-{}-{:03}", day.format("%Y%m%d"), sequence)
}

// =============================================================================
// Serializer
// =============================================================================

/// Serializes a transaction's lines into the versioned payload.
pub fn encode_items(lines: &[LineItem]) -> CoreResult<String> {
    let payload = ItemsPayload {
        version: ITEMS_PAYLOAD_VERSION,
        items: lines
            .iter()
            .map(|line| SnapshotItem {
                upc: line.upc().to_string(),
                description: line.description().to_string(),
                quantity: line.quantity(),
                unit_price_cents: line.unit_price().cents(),
                category: line.category().to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Decodes a payload back into snapshot items.
///
/// ## Errors
/// `Serialization` for invalid JSON, an unknown version, or any record with
/// a quantity below 1 or a negative price - a payload that could not have
/// been produced by [`encode_items`].
pub fn decode_items(json: &str) -> CoreResult<Vec<SnapshotItem>> {
    let payload: ItemsPayload = serde_json::from_str(json)?;

    if payload.version != ITEMS_PAYLOAD_VERSION {
        return Err(CoreError::Serialization {
            reason: format!(
                "unsupported items payload version {} (expected {})",
                payload.version, ITEMS_PAYLOAD_VERSION
            ),
        });
    }

    for item in &payload.items {
        if item.quantity < 1 {
            return Err(CoreError::Serialization {
                reason: format!("item {} has quantity {}", item.upc, item.quantity),
            });
        }
        if item.unit_price_cents < 0 {
            return Err(CoreError::Serialization {
                reason: format!("item {} has negative price", item.upc),
            });
        }
    }

    Ok(payload.items)
}

/// Freezes a live transaction into a snapshot.
///
/// Totals are captured as computed right now; the timestamp is injected by
/// the caller so this stays a pure function.
pub fn create_suspension(
    transaction: &Transaction,
    id: impl Into<String>,
    note: Option<String>,
    suspended_at: DateTime<Utc>,
) -> CoreResult<SuspensionSnapshot> {
    Ok(SuspensionSnapshot {
        id: id.into(),
        suspended_at,
        transaction_state: transaction.state().as_str().to_string(),
        subtotal: transaction.subtotal(),
        tax: transaction.tax_amount(),
        total: transaction.total(),
        item_count: transaction.item_count(),
        items_payload: encode_items(transaction.lines())?,
        note,
    })
}

/// Rebuilds a live transaction from a snapshot.
///
/// Each serialized line is replayed as `quantity` individual adds, relying on
/// the increment-on-duplicate-UPC rule to reconstruct the original quantity.
/// If the snapshot recorded the TENDERING state, the rebuilt transaction
/// re-enters it after the replay.
pub fn restore_transaction(snapshot: &SuspensionSnapshot) -> CoreResult<Transaction> {
    let items = decode_items(&snapshot.items_payload)?;

    let mut transaction = Transaction::new();
    for record in items {
        let item = CatalogItem::new(
            record.upc,
            record.description,
            Money::from_cents(record.unit_price_cents),
            &record.category,
            false,
        )?;
        for _ in 0..record.quantity {
            transaction.add_item(item.clone());
        }
    }

    let state: TransactionState = snapshot.transaction_state.parse()?;
    if state == TransactionState::Tendering {
        // A TENDERING snapshot with no items cannot come from a real suspend;
        // treat it as a corrupt payload rather than an invalid transition.
        transaction
            .start_tendering()
            .map_err(|_| CoreError::Serialization {
                reason: "snapshot recorded TENDERING with no items".to_string(),
            })?;
    }

    Ok(transaction)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(upc: &str, cents: i64, category: &str) -> CatalogItem {
        CatalogItem::new(upc, format!("Item {upc}"), Money::from_cents(cents), category, false)
            .expect("valid test item")
    }

    fn when() -> DateTime<Utc> {
        "2024-01-15T14:45:00Z".parse().expect("valid timestamp")
    }

    fn mixed_transaction() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("A", 100, "OTHER"));
        tx.add_item(item("B", 500, "TOBACCO"));
        tx
    }

    #[test]
    fn test_format_suspension_id() {
        let day: NaiveDate = "2024-01-15".parse().expect("date");
        assert_eq!(format_suspension_id(day, 1), "S-20240115-001");
        assert_eq!(format_suspension_id(day, 42), "S-20240115-042");
        assert_eq!(format_suspension_id(day, 137), "S-20240115-137");
    }

    #[test]
    fn test_create_suspension_freezes_totals() {
        let tx = mixed_transaction();
        let snap = create_suspension(&tx, "S-20240115-001", Some("note".into()), when())
            .expect("suspends");

        assert_eq!(snap.id, "S-20240115-001");
        assert_eq!(snap.transaction_state, "SHOPPING");
        assert_eq!(snap.subtotal.cents(), 700);
        assert_eq!(snap.tax.cents(), 114);
        assert_eq!(snap.total.cents(), 814);
        assert_eq!(snap.item_count, 3);
        assert_eq!(snap.note.as_deref(), Some("note"));
        assert_eq!(snap.suspension_date(), "2024-01-15".parse::<NaiveDate>().expect("date"));
    }

    #[test]
    fn test_round_trip_recomputes_equal_totals() {
        let tx = mixed_transaction();
        let snap = create_suspension(&tx, "S-20240115-001", None, when()).expect("suspends");
        let restored = restore_transaction(&snap).expect("restores");

        // Recomputed, not read from the snapshot
        assert_eq!(restored.subtotal(), tx.subtotal());
        assert_eq!(restored.tax_amount(), tx.tax_amount());
        assert_eq!(restored.total(), tx.total());
        assert_eq!(restored.item_count(), tx.item_count());
        assert_eq!(restored.line_count(), tx.line_count());
        assert_eq!(restored.state(), tx.state());
    }

    #[test]
    fn test_round_trip_restores_tendering_state() {
        let mut tx = mixed_transaction();
        tx.start_tendering().expect("has items");

        let snap = create_suspension(&tx, "S-20240115-002", None, when()).expect("suspends");
        assert_eq!(snap.transaction_state, "TENDERING");

        let restored = restore_transaction(&snap).expect("restores");
        assert!(restored.is_tendering());
        assert_eq!(restored.total(), tx.total());
    }

    #[test]
    fn test_quantity_replays_as_individual_adds() {
        let mut tx = Transaction::new();
        tx.add_item(item("A", 100, "OTHER"));
        tx.change_quantity(0, 7).expect("valid quantity");

        let snap = create_suspension(&tx, "S-20240115-003", None, when()).expect("suspends");
        let restored = restore_transaction(&snap).expect("restores");

        assert_eq!(restored.line_count(), 1);
        assert_eq!(restored.line(0).expect("line").quantity(), 7);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let json = r#"{"version":2,"items":[]}"#;
        let err = decode_items(json).expect_err("unknown version");
        assert!(matches!(err, CoreError::Serialization { .. }));
    }

    #[test]
    fn test_decode_rejects_zero_quantity() {
        let json = r#"{"version":1,"items":[{"upc":"A","description":"Item A","quantity":0,"unit_price_cents":100,"category":"OTHER"}]}"#;
        assert!(decode_items(json).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage_json() {
        assert!(decode_items("not json at all").is_err());
        assert!(decode_items(r#"{"items":[]}"#).is_err());
    }

    #[test]
    fn test_restore_rejects_unknown_state() {
        let tx = mixed_transaction();
        let mut snap = create_suspension(&tx, "S-20240115-004", None, when()).expect("suspends");
        snap.transaction_state = "PAUSED".to_string();

        assert!(restore_transaction(&snap).is_err());
    }

    #[test]
    fn test_is_from_previous_day() {
        let tx = mixed_transaction();
        let snap = create_suspension(&tx, "S-20240115-005", None, when()).expect("suspends");

        let same_day: NaiveDate = "2024-01-15".parse().expect("date");
        let next_day: NaiveDate = "2024-01-16".parse().expect("date");
        assert!(!snap.is_from_previous_day(same_day));
        assert!(snap.is_from_previous_day(next_day));
    }
}
