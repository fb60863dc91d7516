//! # register-db: Database Layer for the Register
//!
//! This crate provides database access for the register.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Register Data Flow                               │
//! │                                                                         │
//! │  register-engine (suspend / resume / scan / cleanup)                   │
//! │       │            via PersistenceStore + CatalogLookup traits         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     register-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (catalog.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo    │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ SuspensionRepo │    │ ...          │  │   │
//! │  │   │ Management    │    │ SaleRepo       │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, suspension, sale)
//! - [`store`] - PersistenceStore / CatalogLookup implementations
//! - [`pricebook`] - Tab-delimited price book ingestion

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod pricebook;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use pricebook::{load_price_book, PriceBookSummary};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::sale::SaleRepository;
pub use repository::suspension::SuspensionRepository;
