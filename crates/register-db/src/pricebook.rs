//! # Price Book Ingestion
//!
//! Loads the catalog from a tab-delimited price book file.
//!
//! ## Expected Format
//! ```text
//! UPC <TAB> DESCRIPTION <TAB> PRICE [<TAB> CATEGORY [<TAB> POPULAR]]
//!
//! 036000291452	Cola 12oz Can	1.29	OTHER	1
//! 041220787346	Cigarettes Kings	9.49	TOBACCO
//! 4011	Bananas	0.59
//! ```
//!
//! Blank lines are skipped. A malformed row (missing fields, bad price,
//! negative price) is logged and counted, never fatal: one bad row must not
//! keep the rest of the catalog from loading. Duplicate UPCs count as
//! skips, which makes re-loading the same file a no-op.

use std::path::Path;

use tracing::{info, warn};

use register_core::{CatalogItem, Money};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Outcome of a price book load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBookSummary {
    /// Rows read from the file, blank lines excluded.
    pub total_rows: usize,
    /// Rows inserted into the catalog.
    pub inserted: usize,
    /// Rows rejected (malformed, invalid, or duplicate).
    pub skipped: usize,
}

/// Parses the price book file and inserts items into the database.
pub async fn load_price_book(db: &Database, path: &Path) -> DbResult<PriceBookSummary> {
    info!(path = %path.display(), "Loading price book");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DbError::PriceBook(e.to_string()))?;

    let catalog = db.catalog();
    let mut summary = PriceBookSummary {
        total_rows: 0,
        inserted: 0,
        skipped: 0,
    };

    for (line_number, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DbError::PriceBook(e.to_string()))?;

        // csv surfaces blank lines as a single empty field
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        summary.total_rows += 1;

        let item = match parse_row(&record) {
            Ok(item) => item,
            Err(reason) => {
                warn!(line = line_number + 1, reason = %reason, "Skipping price book row");
                summary.skipped += 1;
                continue;
            }
        };

        match catalog.insert_item(&item).await {
            Ok(()) => summary.inserted += 1,
            Err(DbError::UniqueViolation { .. }) => {
                warn!(line = line_number + 1, upc = %item.upc(), "Duplicate UPC; skipping");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        total = summary.total_rows,
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Price book loaded"
    );

    Ok(summary)
}

fn parse_row(record: &csv::StringRecord) -> Result<CatalogItem, String> {
    let upc = record.get(0).unwrap_or("");
    let description = record.get(1).ok_or("missing description")?;
    let price_field = record.get(2).ok_or("missing price")?;

    let price: Money = price_field
        .parse()
        .map_err(|_| format!("bad price '{price_field}'"))?;

    let category = record.get(3).unwrap_or("");
    let popular = matches!(
        record.get(4).map(str::trim),
        Some("1") | Some("true") | Some("Y") | Some("y")
    );

    CatalogItem::new(upc, description, price, category, popular).map_err(|e| e.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use std::io::Write;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn pricebook_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[tokio::test]
    async fn test_load_well_formed_rows() {
        let db = test_db().await;
        let file = pricebook_file(
            "036000291452\tCola 12oz Can\t1.29\tOTHER\t1\n\
             041220787346\tCigarettes Kings\t9.49\tTOBACCO\n\
             4011\tBananas\t0.59\n",
        );

        let summary = load_price_book(&db, file.path()).await.unwrap();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.skipped, 0);

        let cola = db
            .catalog()
            .get_by_upc("036000291452")
            .await
            .unwrap()
            .expect("found");
        assert_eq!(cola.price().cents(), 129);
        assert!(cola.popular());

        let smokes = db
            .catalog()
            .get_by_upc("041220787346")
            .await
            .unwrap()
            .expect("found");
        assert_eq!(smokes.category(), "TOBACCO");

        let bananas = db.catalog().get_by_upc("4011").await.unwrap().expect("found");
        assert_eq!(bananas.category(), "OTHER");
    }

    #[tokio::test]
    async fn test_bad_rows_are_skipped_not_fatal() {
        let db = test_db().await;
        let file = pricebook_file(
            "4011\tBananas\t0.59\n\
             \n\
             9999\tBroken Price\tabc\n\
             8888\tNegative\t-1.00\n\
             7777\t\t1.00\n\
             4011\tBananas Again\t0.79\n",
        );

        let summary = load_price_book(&db, file.path()).await.unwrap();
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 4);
        assert_eq!(db.catalog().count().await.unwrap(), 1);

        // The original row won; the duplicate did not overwrite it
        let bananas = db.catalog().get_by_upc("4011").await.unwrap().expect("found");
        assert_eq!(bananas.price().cents(), 59);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let db = test_db().await;
        let err = load_price_book(&db, Path::new("/nonexistent/pricebook.tsv"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, DbError::PriceBook(_)));
    }
}
