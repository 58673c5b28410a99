//! # Register Service
//!
//! Session lifecycle orchestration: the one place where validation,
//! reconciliation and persistence are wired together.
//!
//! ## Open Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_session(request)                                                  │
//! │                                                                         │
//! │  1. Validate request fields (ids, declared balance, notes)             │
//! │  2. Fast-path conflict check: register already open? → CONFLICT        │
//! │  3. Load active denomination catalog                                   │
//! │  4. verify_balance(declared, counted, catalog)                         │
//! │         └── mismatch → VALIDATION_ERROR with both amounts              │
//! │  5. One transaction: session + opening breakdown + audit entry         │
//! │         └── partial unique index lost race → CONFLICT (no retry)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Close Flow
//! Same shape, plus the discrepancy computation: the caller supplies the
//! ledger's expected balance, the service records
//! `expected - counted` (positive = shortage) and never blocks the close on
//! it. A drawer that is short still closes; the discrepancy is what the
//! back office reviews.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use cashup_core::{
    compute_discrepancy, validation, verify_balance, AuditAction, AuditLogEntry, BreakdownPhase,
    CountedDenomination, DenominationBreakdownEntry, DenominationType, DiscrepancyReport, Money,
    ReconciliationReport, RegisterSession, SessionStatus,
};
use cashup_db::{Database, SessionClosing};

use crate::error::{ServiceError, ServiceResult};
use crate::requests::{CloseSessionRequest, OpenSessionRequest, RequestContext};

/// Default page size for session history queries.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Default page size for discrepancy report queries.
pub const DEFAULT_REPORT_LIMIT: u32 = 20;

/// Session lifecycle service.
///
/// Cheap to clone; all state lives in the database handle.
#[derive(Debug, Clone)]
pub struct RegisterService {
    db: Database,
}

impl RegisterService {
    /// Creates a new service over an initialized database.
    pub fn new(db: Database) -> Self {
        RegisterService { db }
    }

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Opens a register session.
    ///
    /// The declared opening balance must match the counted breakdown within
    /// tolerance. On success the session, its opening breakdown and a
    /// `session_opened` audit entry are committed atomically.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` for bad fields or a non-reconciling count
    /// - `CONFLICT` when the register already has an open session. Never
    ///   retried here; the caller re-reads register state and decides.
    pub async fn open_session(
        &self,
        request: OpenSessionRequest,
        ctx: &RequestContext,
    ) -> ServiceResult<RegisterSession> {
        validation::validate_entity_id("register_id", request.register_id)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_entity_id("branch_id", request.branch_id)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_entity_id("opened_by", request.opened_by)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_declared_cents(request.declared_opening_cents)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_notes(request.notes.as_deref())
            .map_err(cashup_core::CoreError::from)?;

        // Friendly fast path. The partial unique index is the authority;
        // this just avoids burning a transaction on the common case.
        if let Some(existing) = self
            .db
            .sessions()
            .get_active_session(request.register_id)
            .await?
        {
            warn!(
                register_id = request.register_id,
                existing_session = %existing.id,
                "Open rejected, register already has an open session"
            );
            return Err(ServiceError::conflict(format!(
                "Register {} already has an open session ({})",
                request.register_id, existing.session_number
            )));
        }

        let catalog = self.db.denominations().list_active().await?;

        let declared = Money::from_cents(request.declared_opening_cents);
        let check = verify_balance(declared, &request.counted_breakdown, &catalog)?;
        if !check.is_balanced() {
            return Err(ServiceError::validation(format!(
                "Declared opening balance {} does not match counted total {}",
                check.declared, check.calculated
            )));
        }

        let now = Utc::now();
        let session = RegisterSession {
            id: Uuid::new_v4().to_string(),
            session_number: format!(
                "CS-{}-{}",
                request.register_id,
                now.format("%Y%m%d%H%M%S%3f")
            ),
            register_id: request.register_id,
            branch_id: request.branch_id,
            opened_by: request.opened_by,
            closed_by: None,
            declared_opening_cents: request.declared_opening_cents,
            calculated_opening_cents: check.calculated.cents(),
            declared_closing_cents: None,
            calculated_closing_cents: None,
            system_expected_cents: None,
            discrepancy_cents: None,
            status: SessionStatus::Open,
            opened_at: now,
            closed_at: None,
            opening_notes: request.notes,
            closing_notes: None,
        };

        let breakdown = build_breakdown_entries(
            &session.id,
            BreakdownPhase::Opening,
            &request.counted_breakdown,
            &catalog,
        )?;

        let audit_entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            session_id: Some(session.id.clone()),
            register_id: session.register_id,
            branch_id: session.branch_id,
            user_id: session.opened_by,
            action: AuditAction::SessionOpened,
            description: format!(
                "Register {} opened with {}",
                session.register_id, check.calculated
            ),
            old_value: None,
            new_value: Some(serde_json::json!({
                "session_number": session.session_number,
                "declared_opening_cents": session.declared_opening_cents,
                "calculated_opening_cents": session.calculated_opening_cents,
                "breakdown": request.counted_breakdown,
            })),
            amount_cents: Some(session.calculated_opening_cents),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: now,
        };

        self.db
            .sessions()
            .create_session(&session, &breakdown, &audit_entry)
            .await?;

        info!(
            session_id = %session.id,
            session_number = %session.session_number,
            register_id = session.register_id,
            opening_cents = session.calculated_opening_cents,
            "Register session opened"
        );

        Ok(session)
    }

    /// Closes a register session.
    ///
    /// The declared closing balance must match the counted breakdown within
    /// tolerance. The caller supplies the ledger's expected balance; the
    /// signed discrepancy `expected - counted` is recorded (positive =
    /// shortage) but never blocks the close.
    ///
    /// ## Errors
    /// - `NOT_FOUND` when the session does not exist
    /// - `CONFLICT` when it is already closed
    /// - `VALIDATION_ERROR` for a non-reconciling count; the session stays
    ///   open and untouched
    pub async fn close_session(
        &self,
        request: CloseSessionRequest,
        ctx: &RequestContext,
    ) -> ServiceResult<RegisterSession> {
        validation::validate_entity_id("closed_by", request.closed_by)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_declared_cents(request.declared_closing_cents)
            .map_err(cashup_core::CoreError::from)?;
        validation::validate_notes(request.notes.as_deref())
            .map_err(cashup_core::CoreError::from)?;

        let session = self
            .db
            .sessions()
            .get_by_id(&request.session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Session", &request.session_id))?;

        if !session.is_open() {
            return Err(ServiceError::conflict(format!(
                "Session {} is already closed",
                session.session_number
            )));
        }

        let catalog = self.db.denominations().list_active().await?;

        let declared = Money::from_cents(request.declared_closing_cents);
        let check = verify_balance(declared, &request.counted_breakdown, &catalog)?;
        if !check.is_balanced() {
            return Err(ServiceError::validation(format!(
                "Declared closing balance {} does not match counted total {}",
                check.declared, check.calculated
            )));
        }

        let system_expected = Money::from_cents(request.system_expected_cents);
        let discrepancy = compute_discrepancy(system_expected, check.calculated);

        let now = Utc::now();
        let closing = SessionClosing {
            closed_by: request.closed_by,
            declared_closing_cents: request.declared_closing_cents,
            calculated_closing_cents: check.calculated.cents(),
            system_expected_cents: request.system_expected_cents,
            discrepancy_cents: discrepancy.cents(),
            closed_at: now,
            closing_notes: request.notes.clone(),
        };

        let breakdown = build_breakdown_entries(
            &session.id,
            BreakdownPhase::Closing,
            &request.counted_breakdown,
            &catalog,
        )?;

        let audit_entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            session_id: Some(session.id.clone()),
            register_id: session.register_id,
            branch_id: session.branch_id,
            user_id: request.closed_by,
            action: AuditAction::SessionClosed,
            description: format!(
                "Register {} closed with {} (discrepancy {})",
                session.register_id, check.calculated, discrepancy
            ),
            old_value: Some(serde_json::json!({
                "status": "open",
                "calculated_opening_cents": session.calculated_opening_cents,
            })),
            new_value: Some(serde_json::json!({
                "status": "closed",
                "declared_closing_cents": closing.declared_closing_cents,
                "calculated_closing_cents": closing.calculated_closing_cents,
                "system_expected_cents": closing.system_expected_cents,
                "discrepancy_cents": closing.discrepancy_cents,
                "has_discrepancy": closing.discrepancy_cents != 0,
                "breakdown": request.counted_breakdown,
            })),
            amount_cents: Some(closing.calculated_closing_cents),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: now,
        };

        let close_result = self
            .db
            .sessions()
            .close_session(&session.id, &closing, &breakdown, &audit_entry)
            .await;

        if let Err(err) = close_result {
            // The session existed and was open above, so a zero-row UPDATE
            // means another terminal closed it in between
            return Err(match err {
                cashup_db::DbError::NotFound { .. } => ServiceError::conflict(format!(
                    "Session {} is already closed",
                    session.session_number
                )),
                other => other.into(),
            });
        }

        if discrepancy.is_zero() {
            info!(
                session_id = %session.id,
                closing_cents = closing.calculated_closing_cents,
                "Register session closed clean"
            );
        } else {
            warn!(
                session_id = %session.id,
                closing_cents = closing.calculated_closing_cents,
                expected_cents = closing.system_expected_cents,
                discrepancy_cents = closing.discrepancy_cents,
                "Register session closed with discrepancy"
            );
        }

        Ok(RegisterSession {
            closed_by: Some(closing.closed_by),
            declared_closing_cents: Some(closing.declared_closing_cents),
            calculated_closing_cents: Some(closing.calculated_closing_cents),
            system_expected_cents: Some(closing.system_expected_cents),
            discrepancy_cents: Some(closing.discrepancy_cents),
            status: SessionStatus::Closed,
            closed_at: Some(now),
            closing_notes: closing.closing_notes,
            ..session
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The open session for a register, if any.
    pub async fn active_session(&self, register_id: i64) -> ServiceResult<Option<RegisterSession>> {
        Ok(self.db.sessions().get_active_session(register_id).await?)
    }

    /// A session by id.
    pub async fn session(&self, session_id: &str) -> ServiceResult<RegisterSession> {
        self.db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Session", session_id))
    }

    /// A session's counted breakdown for one phase, in catalog order.
    pub async fn denomination_breakdown(
        &self,
        session_id: &str,
        phase: BreakdownPhase,
    ) -> ServiceResult<Vec<DenominationBreakdownEntry>> {
        Ok(self
            .db
            .sessions()
            .get_denomination_breakdown(session_id, phase)
            .await?)
    }

    /// A register's sessions, most recent first.
    pub async fn session_history(
        &self,
        register_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<RegisterSession>> {
        Ok(self
            .db
            .sessions()
            .get_session_history(register_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?)
    }

    /// The full reconciliation picture of a closed session: the session
    /// row plus its opening and closing counts.
    pub async fn reconciliation_report(
        &self,
        session_id: &str,
    ) -> ServiceResult<ReconciliationReport> {
        let session = self.session(session_id).await?;
        if session.is_open() {
            return Err(ServiceError::conflict(format!(
                "Session {} is not closed yet",
                session.session_number
            )));
        }

        let sessions = self.db.sessions();
        let opening_breakdown = sessions
            .get_denomination_breakdown(session_id, BreakdownPhase::Opening)
            .await?;
        let closing_breakdown = sessions
            .get_denomination_breakdown(session_id, BreakdownPhase::Closing)
            .await?;

        Ok(ReconciliationReport {
            session,
            opening_breakdown,
            closing_breakdown,
        })
    }

    /// Closed sessions with a non-zero discrepancy for a branch, most
    /// recent first.
    pub async fn discrepancy_reports(
        &self,
        branch_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<DiscrepancyReport>> {
        Ok(self
            .db
            .sessions()
            .get_discrepancy_reports(branch_id, limit.unwrap_or(DEFAULT_REPORT_LIMIT))
            .await?)
    }

    /// Active denominations offered for new counts, in display order.
    pub async fn list_denomination_types(&self) -> ServiceResult<Vec<DenominationType>> {
        Ok(self.db.denominations().list_active().await?)
    }

    /// Audit trail for one session, oldest first.
    pub async fn audit_trail(&self, session_id: &str) -> ServiceResult<Vec<AuditLogEntry>> {
        Ok(self.db.audit_log().list_for_session(session_id).await?)
    }
}

/// Expands counted lines into persisted breakdown entries with the extended
/// amount filled in.
///
/// Runs after [`verify_balance`] succeeded, so the lookups cannot miss; the
/// errors are still propagated rather than unwrapped.
fn build_breakdown_entries(
    session_id: &str,
    phase: BreakdownPhase,
    counted: &[CountedDenomination],
    catalog: &[DenominationType],
) -> ServiceResult<Vec<DenominationBreakdownEntry>> {
    let mut entries = Vec::with_capacity(counted.len());

    for line in counted {
        let denomination = catalog
            .iter()
            .find(|d| d.id == line.denomination_id)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "Unknown denomination: {}",
                    line.denomination_id
                ))
            })?;

        let amount = denomination
            .value()
            .multiply_quantity(line.quantity)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "Breakdown amount overflow for denomination {}",
                    line.denomination_id
                ))
            })?;

        entries.push(DenominationBreakdownEntry {
            session_id: session_id.to_string(),
            denomination_id: line.denomination_id,
            phase,
            quantity: line.quantity,
            amount_cents: amount.cents(),
        });
    }

    Ok(entries)
}

// =============================================================================
// Unit Tests
// =============================================================================
