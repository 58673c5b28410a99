//! # Domain Types
//!
//! Core domain types for the register session subsystem.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────────┐   ┌────────────────┐  │
//! │  │ RegisterSession  │   │ BreakdownEntry       │   │ AuditLogEntry  │  │
//! │  │ ───────────────  │   │ ───────────────────  │   │ ─────────────  │  │
//! │  │ id (UUID)        │   │ session_id (FK)      │   │ id (UUID)      │  │
//! │  │ session_number   │   │ denomination_id (FK) │   │ action         │  │
//! │  │ status           │   │ phase                │   │ old/new value  │  │
//! │  │ discrepancy      │   │ quantity × value     │   │ (JSON)         │  │
//! │  └──────────────────┘   └──────────────────────┘   └────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────────┐                       │
//! │  │ DenominationType │   │ SessionStatus        │                       │
//! │  │ ───────────────  │   │ ───────────────────  │                       │
//! │  │ value_cents      │   │ Open                 │                       │
//! │  │ sort_order       │   │ Closed (terminal)    │                       │
//! │  └──────────────────┘   └──────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Sessions carry both an `id` (UUID v4, used for relations) and a
//! `session_number` (human-readable business id printed on reports).
//! Register, branch, user and denomination ids are `i64` keys owned by the
//! surrounding back-office catalogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Session Status
// =============================================================================

/// Lifecycle status of a register session.
///
/// Transitions only `Open -> Closed`. A closed session is terminal; opening
/// the register again creates a new session entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum SessionStatus {
    Open,
    Closed,
}

// =============================================================================
// Breakdown Phase
// =============================================================================

/// Which cash count a denomination breakdown belongs to.
///
/// A session has at most one breakdown per phase, written once when the
/// session is opened or closed and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum BreakdownPhase {
    Opening,
    Closing,
}

// =============================================================================
// Denomination Catalog
// =============================================================================

/// A recognized currency denomination (bill or coin).
///
/// Static reference data: created and edited by configuration, never by
/// session operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DenominationType {
    /// Unique identifier.
    pub id: i64,

    /// Display name, e.g. "$100 bill" or "25¢ coin".
    pub name: String,

    /// Face value in cents. Always positive.
    pub value_cents: i64,

    /// Inactive denominations are kept for historical breakdowns but are
    /// not offered for new counts.
    pub is_active: bool,

    /// Display order, largest denominations first by convention.
    pub sort_order: i64,
}

impl DenominationType {
    /// Face value as [`Money`].
    #[inline]
    pub fn value(&self) -> Money {
        Money::from_cents(self.value_cents)
    }
}

// =============================================================================
// Counted Denomination (input)
// =============================================================================

/// One line of a counted drawer: how many units of a denomination were
/// physically counted.
///
/// This is the caller-facing input shape; the persisted form is
/// [`DenominationBreakdownEntry`] with the extended amount filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedDenomination {
    pub denomination_id: i64,

    /// Units counted. Zero is a valid count; negative is rejected.
    pub quantity: i64,
}

// =============================================================================
// Register Session
// =============================================================================

/// One open-to-close lifecycle of a physical register.
///
/// ## Invariants
/// - At most one session with `status = Open` exists per `register_id`
///   (enforced by a partial unique index in the store).
/// - The row is mutated exactly once, at close, to add the closing fields.
/// - `discrepancy_cents`, when present, equals
///   `system_expected_cents - calculated_closing_cents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegisterSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable business identifier, unique in practice
    /// (register id + millisecond timestamp).
    pub session_number: String,

    /// Register (drawer/till) this session belongs to.
    pub register_id: i64,

    /// Branch the register belongs to.
    pub branch_id: i64,

    /// User who opened the session.
    pub opened_by: i64,

    /// User who closed the session. `None` while open.
    pub closed_by: Option<i64>,

    /// Opening balance as asserted by the user, in cents.
    pub declared_opening_cents: i64,

    /// Opening balance derived from the counted breakdown, in cents.
    pub calculated_opening_cents: i64,

    /// Closing balance as asserted by the user. `None` while open.
    pub declared_closing_cents: Option<i64>,

    /// Closing balance derived from the counted breakdown. `None` while open.
    pub calculated_closing_cents: Option<i64>,

    /// Balance the surrounding system (sales, payouts, expenses) expected
    /// at close time. Supplied by the ledger, never computed here.
    pub system_expected_cents: Option<i64>,

    /// Signed difference `system_expected - calculated_closing`.
    /// Positive = shortage, negative = surplus.
    pub discrepancy_cents: Option<i64>,

    pub status: SessionStatus,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    pub opening_notes: Option<String>,
    pub closing_notes: Option<String>,
}

impl RegisterSession {
    /// Whether the session is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Closing discrepancy as [`Money`], if the session has been closed.
    #[inline]
    pub fn discrepancy(&self) -> Option<Money> {
        self.discrepancy_cents.map(Money::from_cents)
    }

    /// Whether the session closed with a non-zero discrepancy.
    #[inline]
    pub fn has_discrepancy(&self) -> bool {
        matches!(self.discrepancy_cents, Some(d) if d != 0)
    }
}

// =============================================================================
// Denomination Breakdown Entry
// =============================================================================

/// A persisted line of a session's cash count.
///
/// Keyed by `(session_id, denomination_id, phase)`; created once when the
/// session is persisted for that phase, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DenominationBreakdownEntry {
    pub session_id: String,
    pub denomination_id: i64,
    pub phase: BreakdownPhase,

    /// Units counted (>= 0).
    pub quantity: i64,

    /// Extended amount: `quantity * denomination.value_cents`.
    pub amount_cents: i64,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Audited lifecycle actions.
///
/// Stored as snake_case text so the column stays extensible for
/// register-level events outside this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum AuditAction {
    SessionOpened,
    SessionClosed,
}

/// One append-only audit record.
///
/// No update or delete operation exists anywhere in the system for these
/// rows; attempting one would be a programming error, so no such method is
/// exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Session the event belongs to. `None` for register-level events.
    pub session_id: Option<String>,

    pub register_id: i64,
    pub branch_id: i64,
    pub user_id: i64,

    pub action: AuditAction,

    /// Human-readable summary, e.g. "Register 1 opened with 500.00".
    pub description: String,

    /// Snapshot of state before the action, as an opaque JSON payload.
    pub old_value: Option<serde_json::Value>,

    /// Snapshot of state after the action.
    pub new_value: Option<serde_json::Value>,

    /// Principal amount involved, when the action has one.
    pub amount_cents: Option<i64>,

    /// Request metadata.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Discrepancy Report
// =============================================================================

/// A closed session whose drawer did not match the system expectation,
/// joined with register and user display names for back-office review.
///
/// Derived on demand from session rows; not separately stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiscrepancyReport {
    pub session_id: String,
    pub session_number: String,
    pub register_id: i64,
    pub register_name: String,
    pub branch_id: i64,
    pub closed_by: Option<i64>,
    pub closed_by_name: Option<String>,
    pub declared_closing_cents: Option<i64>,
    pub calculated_closing_cents: Option<i64>,
    pub system_expected_cents: Option<i64>,
    pub discrepancy_cents: i64,
    pub closed_at: Option<DateTime<Utc>>,
}

impl DiscrepancyReport {
    /// Positive discrepancies mean the drawer held less cash than the
    /// system expected.
    #[inline]
    pub fn is_shortage(&self) -> bool {
        self.discrepancy_cents > 0
    }
}

/// Full reconciliation picture of a closed session: the session row plus
/// both cash counts. Assembled on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub session: RegisterSession,
    pub opening_breakdown: Vec<DenominationBreakdownEntry>,
    pub closing_breakdown: Vec<DenominationBreakdownEntry>,
}

impl ReconciliationReport {
    /// Closing discrepancy as [`Money`].
    #[inline]
    pub fn discrepancy(&self) -> Option<Money> {
        self.session.discrepancy()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session() -> RegisterSession {
        RegisterSession {
            id: "s-1".into(),
            session_number: "CS-1-20260825120000000".into(),
            register_id: 1,
            branch_id: 1,
            opened_by: 7,
            closed_by: None,
            declared_opening_cents: 50_000,
            calculated_opening_cents: 50_000,
            declared_closing_cents: None,
            calculated_closing_cents: None,
            system_expected_cents: None,
            discrepancy_cents: None,
            status: SessionStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            opening_notes: None,
            closing_notes: None,
        }
    }

    #[test]
    fn test_session_state_helpers() {
        let mut session = open_session();
        assert!(session.is_open());
        assert!(!session.has_discrepancy());
        assert_eq!(session.discrepancy(), None);

        session.status = SessionStatus::Closed;
        session.discrepancy_cents = Some(2_000);
        assert!(!session.is_open());
        assert!(session.has_discrepancy());
        assert_eq!(session.discrepancy(), Some(Money::from_cents(2_000)));

        session.discrepancy_cents = Some(0);
        assert!(!session.has_discrepancy());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Open).unwrap(),
            "\"open\""
        );
        assert_eq!(
            serde_json::to_string(&BreakdownPhase::Closing).unwrap(),
            "\"closing\""
        );
        assert_eq!(
            serde_json::to_string(&AuditAction::SessionOpened).unwrap(),
            "\"session_opened\""
        );
    }

    #[test]
    fn test_shortage_sign_convention() {
        let report = DiscrepancyReport {
            session_id: "s-1".into(),
            session_number: "CS-1-1".into(),
            register_id: 1,
            register_name: "Front register".into(),
            branch_id: 1,
            closed_by: Some(7),
            closed_by_name: Some("Dana".into()),
            declared_closing_cents: Some(48_000),
            calculated_closing_cents: Some(48_000),
            system_expected_cents: Some(50_000),
            discrepancy_cents: 2_000,
            closed_at: Some(Utc::now()),
        };
        assert!(report.is_shortage());
    }
}
