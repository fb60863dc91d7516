//! # register-pos: Headless Register
//!
//! Wires the register stack together and drives it from the console:
//! SQLite store underneath, the orchestration engine in the middle, a
//! line-oriented command loop on top standing in for the scanner and
//! keypad.

mod display;
mod receipts;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use register_db::{load_price_book, Database, DbConfig};
use register_engine::{CleanupScheduler, Clock, Register, RegisterConfig, SystemClock};

use crate::display::ConsoleDisplay;
use crate::receipts::TextReceiptSink;

/// Point-of-sale register with suspend/resume and category tax.
#[derive(Debug, Parser)]
#[command(name = "register-pos", version, about)]
struct Cli {
    /// Path to the SQLite database file (created if missing).
    #[arg(long, default_value = "register.db")]
    database: PathBuf,

    /// Tab-delimited price book to load into the catalog at startup.
    #[arg(long)]
    pricebook: Option<PathBuf>,

    /// Days a suspended transaction is kept before scheduled cleanup.
    #[arg(long, default_value_t = 7)]
    retention_days: u32,

    /// Directory receipts are written into.
    #[arg(long, default_value = "receipts")]
    receipt_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Register terminated with an error");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::new(DbConfig::new(&cli.database)).await?;

    if let Some(pricebook) = &cli.pricebook {
        let summary = load_price_book(&db, pricebook).await?;
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Price book ready"
        );
    }

    let item_count = db.catalog().count().await?;
    info!(item_count, "Catalog ready");

    // Refresh the quick-pick grid from recent sales before the lane opens
    db.catalog()
        .recalculate_popular(
            register_db::repository::catalog::DEFAULT_POPULAR_TOP_N,
            register_db::repository::catalog::POPULARITY_PERIOD_DAYS,
        )
        .await?;

    let register = Register::new(
        db.clone(),
        db.clone(),
        Arc::new(SystemClock) as Arc<dyn Clock>,
    )
    .await?
    .with_display(Arc::new(ConsoleDisplay))
    .with_receipts(Arc::new(TextReceiptSink::new(&cli.receipt_dir)));
    let register = Arc::new(register);

    let scheduler = CleanupScheduler::start(
        register.clone(),
        RegisterConfig::new().retention_days(cli.retention_days),
    );

    repl::run(register.clone(), db.clone()).await?;

    register.shutdown().await;
    scheduler.stop().await;
    db.close().await;

    Ok(())
}
