//! # register-core: Pure Business Logic for the Register
//!
//! This crate is the **heart** of the register. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Register Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Input (scanner / keyboard / console)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              register-engine (orchestration)                    │   │
//! │  │    scan, void, tender, suspend, resume, expiry cleanup          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ register-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │  │  money  │ │transaction│ │   tax   │ │ payment │ │snapshot│  │   │
//! │  │  │  Money  │ │ LineItem  │ │Breakdown│ │Cash/Card│ │ encode │  │   │
//! │  │  │ TaxCalc │ │ StateMach │ │ by cat  │ │         │ │ decode │  │   │
//! │  │  └─────────┘ └───────────┘ └─────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 register-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - Catalog items (UPC, description, price, category)
//! - [`transaction`] - Line items + the SHOPPING/TENDERING state machine
//! - [`tax`] - Category tax rate table and recomputed breakdown
//! - [`payment`] - Cash/card payment records
//! - [`snapshot`] - Suspension snapshots and their versioned serializer
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **No Clock Reads**: timestamps are parameters, injected by the caller

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod payment;
pub mod snapshot;
pub mod tax;
pub mod transaction;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use register_core::Money` instead of
// `use register_core::money::Money`

pub use catalog::CatalogItem;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{CardType, Payment};
pub use snapshot::{SnapshotItem, SuspensionSnapshot};
pub use tax::{TaxBreakdown, TaxRate};
pub use transaction::{LineItem, Transaction, TransactionState};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of transactions that may be suspended at one time.
///
/// ## Business Reason
/// Suspensions park a customer's basket so the lane can serve the next
/// customer; an unbounded backlog would never be resumed. The ceiling is a
/// hard contract: the suspend operation rejects at this count and the
/// rejection message must name the value.
pub const MAX_SUSPENDED_TRANSACTIONS: usize = 10;

/// Category assigned to catalog items that do not declare one.
pub const DEFAULT_CATEGORY: &str = "OTHER";
