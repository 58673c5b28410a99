//! # cashup-core: Pure Business Logic for Cashup
//!
//! This crate is the heart of the register session subsystem. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashup Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              cashup-register (Lifecycle Service)                │   │
//! │  │       open_session, close_session, history, reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cashup-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ reconcile │  │ validation│  │   │
//! │  │   │  Session  │  │   Money   │  │  verify   │  │   rules   │  │   │
//! │  │   │ Breakdown │  │  (cents)  │  │ discrep.  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cashup-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RegisterSession, DenominationType, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`reconcile`] - Balance verification and discrepancy computation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::{breakdown_total, compute_discrepancy, verify_balance, BalanceCheck};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reconciliation tolerance between a declared balance and the total
/// calculated from a denomination breakdown.
///
/// One minor currency unit (one cent). Absorbs rounding noise from balances
/// entered in decimal notation at the terminal. This is a hard constant of
/// the reconciliation contract, never configuration.
pub const BALANCE_TOLERANCE: Money = Money::from_cents(1);

/// Maximum quantity of a single denomination in a counted breakdown.
///
/// A drawer physically holds nowhere near 100,000 of any bill or coin;
/// anything above this is a data-entry error, not a count.
pub const MAX_DENOMINATION_QUANTITY: i64 = 100_000;
