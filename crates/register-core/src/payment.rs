//! # Payment Records
//!
//! The tagged result of a completed tender. A payment exists only in its
//! completed form: there is no "pending payment" value, and a constructed
//! record is never mutated. "Not yet paid" is simply the absence of a
//! payment on the transaction (`Option::None`).
//!
//! ## Sufficiency Is the Caller's Job
//! Neither factory validates the amount against a transaction total. The
//! exact and next-dollar cash paths are sufficient by construction, the card
//! path charges the total directly, and the custom cash path is validated by
//! the orchestrator before the record is built. Centralizing that check here
//! would silently change which paths can fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Card Type
// =============================================================================

/// Types of payment cards accepted at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    Other,
}

impl CardType {
    /// Human-readable name for display and receipts.
    pub fn display_name(&self) -> &'static str {
        match self {
            CardType::Visa => "Visa",
            CardType::Mastercard => "Mastercard",
            CardType::AmericanExpress => "American Express",
            CardType::Discover => "Discover",
            CardType::Other => "Other",
        }
    }

    /// Parses a card type from loose operator input ("visa", "AMEX", ...).
    /// Unknown names map to `Other`.
    pub fn parse(s: &str) -> CardType {
        match s.trim().to_ascii_lowercase().as_str() {
            "visa" => CardType::Visa,
            "mastercard" | "mc" => CardType::Mastercard,
            "amex" | "american express" | "american_express" => CardType::AmericanExpress,
            "discover" => CardType::Discover,
            _ => CardType::Other,
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A completed tender, either cash or card.
///
/// Both variants carry the moment they were taken. The record is immutable
/// once constructed; completion is implied by existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Payment {
    /// Physical cash: what the customer handed over and what came back.
    Cash {
        tendered: Money,
        change: Money,
        paid_at: DateTime<Utc>,
    },
    /// Card payment on an external terminal.
    Card {
        card_type: CardType,
        amount: Money,
        paid_at: DateTime<Utc>,
    },
}

impl Payment {
    /// Creates a cash payment from a tendered amount and precomputed change.
    ///
    /// The timestamp is injected by the caller (the orchestrator's clock);
    /// this keeps the type constructible in pure code.
    pub fn cash(tendered: Money, change: Money, paid_at: DateTime<Utc>) -> Self {
        Payment::Cash {
            tendered,
            change,
            paid_at,
        }
    }

    /// Creates a card payment for the charged amount.
    pub fn card(card_type: CardType, amount: Money, paid_at: DateTime<Utc>) -> Self {
        Payment::Card {
            card_type,
            amount,
            paid_at,
        }
    }

    /// Checks if payment is cash.
    pub fn is_cash(&self) -> bool {
        matches!(self, Payment::Cash { .. })
    }

    /// Checks if payment is card.
    pub fn is_card(&self) -> bool {
        matches!(self, Payment::Card { .. })
    }

    /// The amount applied to the transaction (tendered cash or card charge).
    pub fn tendered(&self) -> Money {
        match self {
            Payment::Cash { tendered, .. } => *tendered,
            Payment::Card { amount, .. } => *amount,
        }
    }

    /// Change returned to the customer (always zero for card).
    pub fn change(&self) -> Money {
        match self {
            Payment::Cash { change, .. } => *change,
            Payment::Card { .. } => Money::zero(),
        }
    }

    /// When the tender completed.
    pub fn paid_at(&self) -> DateTime<Utc> {
        match self {
            Payment::Cash { paid_at, .. } | Payment::Card { paid_at, .. } => *paid_at,
        }
    }

    /// Method name for journals and the completed-transaction store.
    pub fn method_name(&self) -> &'static str {
        match self {
            Payment::Cash { .. } => "CASH",
            Payment::Card { .. } => "CARD",
        }
    }

    /// Card type, when this is a card payment.
    pub fn card_type(&self) -> Option<CardType> {
        match self {
            Payment::Card { card_type, .. } => Some(*card_type),
            Payment::Cash { .. } => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
