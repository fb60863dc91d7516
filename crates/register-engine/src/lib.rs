//! # register-engine: Orchestration for the Register
//!
//! This crate drives the transaction lifecycle. It owns the live
//! [`Transaction`](register_core::Transaction), the mirror of outstanding
//! suspensions, and the rules the transaction aggregate itself cannot
//! enforce: scans are rejected during tendering, suspensions are capped and
//! sequenced per day, suspend/resume/delete keep the in-memory list and the
//! persistence store in agreement, and a background task expires stale
//! suspensions.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  input event ──► Register ──► Transaction (mutate)                      │
//! │                     │                                                   │
//! │                     ├──► DisplaySink.update(tx) after every change      │
//! │                     │                                                   │
//! │     suspend ───────►├──► freeze to SuspensionSnapshot ──► store.save    │
//! │                     │        (only on success: mirror + fresh tx)       │
//! │                     │                                                   │
//! │     resume ────────►├──► store.delete ──► install restored tx           │
//! │                     │                                                   │
//! │  hourly tick ──────►└──► day advanced? ──► cleanup_older_than(cutoff)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`register`] - The orchestrator itself
//! - [`contracts`] - Collaborator traits (store, catalog, display, receipts)
//! - [`scheduler`] - Hourly expiry-cleanup task
//! - [`clock`] - Injected time source
//! - [`receipt`] - Receipt model built at completion
//! - [`config`] - Runtime knobs (retention window, tick interval)
//! - [`error`] - Orchestration error taxonomy

pub mod clock;
pub mod config;
pub mod contracts;
pub mod error;
pub mod receipt;
pub mod register;
pub mod scheduler;

pub use clock::{Clock, SystemClock};
pub use config::RegisterConfig;
pub use contracts::{CatalogLookup, DisplaySink, PersistenceStore, ReceiptSink};
pub use error::{PersistenceError, RegisterError, RegisterResult};
pub use receipt::Receipt;
pub use register::Register;
pub use scheduler::CleanupScheduler;
