//! # Engine Contract Implementations
//!
//! Wires [`Database`] into the engine's collaborator seams. The engine sees
//! opaque store errors; the detail stays in this crate's logs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use register_core::{CatalogItem, SuspensionSnapshot, Transaction};
use register_engine::{CatalogLookup, PersistenceError, PersistenceStore};

use crate::pool::Database;

#[async_trait]
impl PersistenceStore for Database {
    async fn save_suspension(
        &self,
        snapshot: &SuspensionSnapshot,
    ) -> Result<(), PersistenceError> {
        self.suspensions().save(snapshot).await.map_err(Into::into)
    }

    async fn load_all_suspensions(&self) -> Result<Vec<SuspensionSnapshot>, PersistenceError> {
        self.suspensions().load_all().await.map_err(Into::into)
    }

    async fn delete_suspension(&self, id: &str) -> Result<bool, PersistenceError> {
        self.suspensions().delete(id).await.map_err(Into::into)
    }

    async fn next_sequence_for_day(&self, day: NaiveDate) -> Result<u32, PersistenceError> {
        self.suspensions()
            .next_sequence_for_day(day)
            .await
            .map_err(Into::into)
    }

    async fn delete_expired_before(&self, day: NaiveDate) -> Result<u64, PersistenceError> {
        self.suspensions()
            .delete_expired_before(day)
            .await
            .map_err(Into::into)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError> {
        self.suspensions()
            .delete_older_than(cutoff)
            .await
            .map_err(Into::into)
    }

    async fn save_completed_transaction(
        &self,
        transaction: &Transaction,
        receipt_number: &str,
    ) -> Result<(), PersistenceError> {
        self.sales()
            .save_completed(transaction, receipt_number)
            .await
            .map_err(Into::into)
    }

    async fn sales_aggregate_for_days(
        &self,
        days: u32,
    ) -> Result<HashMap<String, i64>, PersistenceError> {
        self.sales()
            .sales_aggregate_for_days(days)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl CatalogLookup for Database {
    async fn item_by_upc(&self, upc: &str) -> Result<Option<CatalogItem>, PersistenceError> {
        self.catalog().get_by_upc(upc).await.map_err(Into::into)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
//
// The full stack: engine orchestration on top of the real SQLite store.
