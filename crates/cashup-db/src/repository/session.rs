//! # Session Repository
//!
//! Database operations for register sessions and their denomination
//! breakdowns.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Register Session Lifecycle                          │
//! │                                                                         │
//! │  1. OPEN (one transaction)                                             │
//! │     ├── INSERT register_sessions  { status: open }                     │
//! │     │        └─ partial UNIQUE index rejects a second open session     │
//! │     ├── INSERT register_session_denominations (phase: opening)         │
//! │     └── INSERT register_audit_logs (session_opened)                    │
//! │                                                                         │
//! │  2. CLOSE (one transaction)                                            │
//! │     ├── UPDATE register_sessions WHERE id = ? AND status = 'open'      │
//! │     │        └─ 0 rows affected ⇒ NotFound, nothing committed          │
//! │     ├── INSERT register_session_denominations (phase: closing)         │
//! │     └── INSERT register_audit_logs (session_closed)                    │
//! │                                                                         │
//! │  Closed is terminal. No reopen, no delete.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::audit;
use cashup_core::{
    AuditLogEntry, BreakdownPhase, DenominationBreakdownEntry, DiscrepancyReport, RegisterSession,
};
use chrono::{DateTime, Utc};

/// Closing fields written to a session row by [`SessionRepository::close_session`].
///
/// A named struct rather than a parameter list so the store contract stays
/// explicit about exactly which columns the single permitted mutation
/// touches.
#[derive(Debug, Clone)]
pub struct SessionClosing {
    pub closed_by: i64,
    pub declared_closing_cents: i64,
    pub calculated_closing_cents: i64,
    pub system_expected_cents: i64,
    pub discrepancy_cents: i64,
    pub closed_at: DateTime<Utc>,
    pub closing_notes: Option<String>,
}

const SESSION_COLUMNS: &str = r#"
    id, session_number, register_id, branch_id, opened_by, closed_by,
    declared_opening_cents, calculated_opening_cents,
    declared_closing_cents, calculated_closing_cents,
    system_expected_cents, discrepancy_cents,
    status, opened_at, closed_at, opening_notes, closing_notes
"#;

/// Repository for register session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Persists a new session, its opening breakdown and the
    /// `session_opened` audit entry as a single atomic unit.
    ///
    /// ## Atomicity
    /// On any failure nothing is persisted: the session row, the breakdown
    /// rows and the audit row commit together or not at all.
    ///
    /// ## Conflict
    /// The partial unique index on `(register_id) WHERE status = 'open'`
    /// turns a concurrent duplicate open into [`DbError::SessionConflict`]
    /// instead of a race.
    pub async fn create_session(
        &self,
        session: &RegisterSession,
        opening_breakdown: &[DenominationBreakdownEntry],
        audit_entry: &AuditLogEntry,
    ) -> DbResult<()> {
        debug!(
            id = %session.id,
            session_number = %session.session_number,
            register_id = session.register_id,
            "Creating register session"
        );

        let mut tx = self.pool.begin().await?;

        let insert_result = sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, session_number, register_id, branch_id, opened_by, closed_by,
                declared_opening_cents, calculated_opening_cents,
                declared_closing_cents, calculated_closing_cents,
                system_expected_cents, discrepancy_cents,
                status, opened_at, closed_at, opening_notes, closing_notes
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8,
                ?9, ?10,
                ?11, ?12,
                ?13, ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&session.id)
        .bind(&session.session_number)
        .bind(session.register_id)
        .bind(session.branch_id)
        .bind(session.opened_by)
        .bind(session.closed_by)
        .bind(session.declared_opening_cents)
        .bind(session.calculated_opening_cents)
        .bind(session.declared_closing_cents)
        .bind(session.calculated_closing_cents)
        .bind(session.system_expected_cents)
        .bind(session.discrepancy_cents)
        .bind(session.status)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(&session.opening_notes)
        .bind(&session.closing_notes)
        .execute(&mut *tx)
        .await;

        if let Err(err) = insert_result {
            // Fill in the register id the UNIQUE-violation message can't carry
            return Err(match DbError::from(err) {
                DbError::SessionConflict { .. } => DbError::SessionConflict {
                    register_id: session.register_id,
                },
                other => other,
            });
        }

        insert_breakdown(&mut tx, opening_breakdown).await?;
        audit::insert_entry(&mut *tx, audit_entry).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets the open session for a register, if any.
    ///
    /// Reads the latest committed state directly; there is no cache to go
    /// stale. Used both for invariant enforcement and status display.
    pub async fn get_active_session(&self, register_id: i64) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM register_sessions
            WHERE register_id = ?1 AND status = 'open'
            "#
        ))
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session by id.
    pub async fn get_by_id(&self, session_id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM register_sessions
            WHERE id = ?1
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Closes a session: writes the closing fields, the closing breakdown
    /// and the `session_closed` audit entry in one transaction.
    ///
    /// The UPDATE is guarded by `status = 'open'`; closing a missing or
    /// already-closed session affects zero rows and the whole transaction
    /// is abandoned with [`DbError::NotFound`].
    pub async fn close_session(
        &self,
        session_id: &str,
        closing: &SessionClosing,
        closing_breakdown: &[DenominationBreakdownEntry],
        audit_entry: &AuditLogEntry,
    ) -> DbResult<()> {
        debug!(
            id = %session_id,
            discrepancy_cents = closing.discrepancy_cents,
            "Closing register session"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE register_sessions SET
                status = 'closed',
                closed_by = ?2,
                declared_closing_cents = ?3,
                calculated_closing_cents = ?4,
                system_expected_cents = ?5,
                discrepancy_cents = ?6,
                closed_at = ?7,
                closing_notes = ?8
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(session_id)
        .bind(closing.closed_by)
        .bind(closing.declared_closing_cents)
        .bind(closing.calculated_closing_cents)
        .bind(closing.system_expected_cents)
        .bind(closing.discrepancy_cents)
        .bind(closing.closed_at)
        .bind(&closing.closing_notes)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open session", session_id));
        }

        insert_breakdown(&mut tx, closing_breakdown).await?;
        audit::insert_entry(&mut *tx, audit_entry).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets a session's denomination breakdown for one phase, ordered by
    /// the catalog's `sort_order`.
    pub async fn get_denomination_breakdown(
        &self,
        session_id: &str,
        phase: BreakdownPhase,
    ) -> DbResult<Vec<DenominationBreakdownEntry>> {
        let entries = sqlx::query_as::<_, DenominationBreakdownEntry>(
            r#"
            SELECT b.session_id, b.denomination_id, b.phase, b.quantity, b.amount_cents
            FROM register_session_denominations b
            JOIN denomination_types d ON d.id = b.denomination_id
            WHERE b.session_id = ?1 AND b.phase = ?2
            ORDER BY d.sort_order
            "#,
        )
        .bind(session_id)
        .bind(phase)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets a register's session history, most recent first.
    pub async fn get_session_history(
        &self,
        register_id: i64,
        limit: u32,
    ) -> DbResult<Vec<RegisterSession>> {
        let sessions = sqlx::query_as::<_, RegisterSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM register_sessions
            WHERE register_id = ?1
            ORDER BY opened_at DESC
            LIMIT ?2
            "#
        ))
        .bind(register_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Gets closed sessions with a non-zero discrepancy for a branch,
    /// joined with register and user display names, most recent first.
    pub async fn get_discrepancy_reports(
        &self,
        branch_id: i64,
        limit: u32,
    ) -> DbResult<Vec<DiscrepancyReport>> {
        let reports = sqlx::query_as::<_, DiscrepancyReport>(
            r#"
            SELECT
                s.id AS session_id,
                s.session_number,
                s.register_id,
                r.name AS register_name,
                s.branch_id,
                s.closed_by,
                u.display_name AS closed_by_name,
                s.declared_closing_cents,
                s.calculated_closing_cents,
                s.system_expected_cents,
                s.discrepancy_cents,
                s.closed_at
            FROM register_sessions s
            JOIN registers r ON r.id = s.register_id
            LEFT JOIN users u ON u.id = s.closed_by
            WHERE s.branch_id = ?1
              AND s.status = 'closed'
              AND s.discrepancy_cents != 0
            ORDER BY s.closed_at DESC
            LIMIT ?2
            "#,
        )
        .bind(branch_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }
}

/// Inserts breakdown rows inside an open transaction.
async fn insert_breakdown(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    entries: &[DenominationBreakdownEntry],
) -> DbResult<()> {
    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO register_session_denominations (
                session_id, denomination_id, phase, quantity, amount_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.session_id)
        .bind(entry.denomination_id)
        .bind(entry.phase)
        .bind(entry.quantity)
        .bind(entry.amount_cents)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cashup_core::{AuditAction, SessionStatus};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO registers (id, name, branch_id) VALUES (1, 'Front register', 1)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (id, display_name) VALUES (7, 'Dana')")
            .execute(db.pool())
            .await
            .unwrap();
        db.denominations()
            .insert("$100 bill", 10_000, true, 1)
            .await
            .unwrap();
        db.denominations()
            .insert("$10 bill", 1_000, true, 2)
            .await
            .unwrap();

        db
    }

    fn session(id: &str, register_id: i64) -> RegisterSession {
        RegisterSession {
            id: id.to_string(),
            session_number: format!("CS-{register_id}-{id}"),
            register_id,
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

    fn breakdown(session_id: &str, phase: BreakdownPhase) -> Vec<DenominationBreakdownEntry> {
        vec![DenominationBreakdownEntry {
            session_id: session_id.to_string(),
            denomination_id: 1,
            phase,
            quantity: 5,
            amount_cents: 50_000,
        }]
    }

    fn audit(session_id: &str, action: AuditAction) -> AuditLogEntry {
        AuditLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: Some(session_id.to_string()),
            register_id: 1,
            branch_id: 1,
            user_id: 7,
            action,
            description: "test".into(),
            old_value: None,
            new_value: None,
            amount_cents: None,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_active_session() {
        let db = test_db().await;
        let repo = db.sessions();

        repo.create_session(
            &session("s-1", 1),
            &breakdown("s-1", BreakdownPhase::Opening),
            &audit("s-1", AuditAction::SessionOpened),
        )
        .await
        .unwrap();

        let active = repo.get_active_session(1).await.unwrap().unwrap();
        assert_eq!(active.id, "s-1");
        assert!(active.is_open());

        // Audit landed in the same transaction
        assert_eq!(db.audit_log().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_open_session_hits_unique_index() {
        let db = test_db().await;
        let repo = db.sessions();

        repo.create_session(
            &session("s-1", 1),
            &breakdown("s-1", BreakdownPhase::Opening),
            &audit("s-1", AuditAction::SessionOpened),
        )
        .await
        .unwrap();

        let err = repo
            .create_session(
                &session("s-2", 1),
                &breakdown("s-2", BreakdownPhase::Opening),
                &audit("s-2", AuditAction::SessionOpened),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::SessionConflict { register_id: 1 }));

        // The failed open left nothing behind
        assert!(repo.get_by_id("s-2").await.unwrap().is_none());
        assert_eq!(db.audit_log().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rolls_back_on_bad_breakdown() {
        let db = test_db().await;
        let repo = db.sessions();

        // Denomination 99 doesn't exist; the FK fails after the session
        // row was inserted, so everything must roll back
        let bad = vec![DenominationBreakdownEntry {
            session_id: "s-1".into(),
            denomination_id: 99,
            phase: BreakdownPhase::Opening,
            quantity: 1,
            amount_cents: 100,
        }];

        let err = repo
            .create_session(&session("s-1", 1), &bad, &audit("s-1", AuditAction::SessionOpened))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        assert!(repo.get_by_id("s-1").await.unwrap().is_none());
        assert!(repo.get_active_session(1).await.unwrap().is_none());
        assert_eq!(db.audit_log().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_close_session_writes_closing_fields_once() {
        let db = test_db().await;
        let repo = db.sessions();

        repo.create_session(
            &session("s-1", 1),
            &breakdown("s-1", BreakdownPhase::Opening),
            &audit("s-1", AuditAction::SessionOpened),
        )
        .await
        .unwrap();

        let closing = SessionClosing {
            closed_by: 7,
            declared_closing_cents: 48_000,
            calculated_closing_cents: 48_000,
            system_expected_cents: 50_000,
            discrepancy_cents: 2_000,
            closed_at: Utc::now(),
            closing_notes: Some("short".into()),
        };

        repo.close_session(
            "s-1",
            &closing,
            &breakdown("s-1", BreakdownPhase::Closing),
            &audit("s-1", AuditAction::SessionClosed),
        )
        .await
        .unwrap();

        let closed = repo.get_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.discrepancy_cents, Some(2_000));
        assert!(repo.get_active_session(1).await.unwrap().is_none());

        // Closing again: the status guard rejects it, nothing changes
        let err = repo
            .close_session(
                "s-1",
                &closing,
                &[],
                &audit("s-1", AuditAction::SessionClosed),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.audit_log().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_breakdown_ordered_by_sort_order() {
        let db = test_db().await;
        let repo = db.sessions();

        // Inserted in reverse sort order on purpose
        let entries = vec![
            DenominationBreakdownEntry {
                session_id: "s-1".into(),
                denomination_id: 2, // $10, sort_order 2
                quantity: 8,
                amount_cents: 8_000,
                phase: BreakdownPhase::Opening,
            },
            DenominationBreakdownEntry {
                session_id: "s-1".into(),
                denomination_id: 1, // $100, sort_order 1
                quantity: 4,
                amount_cents: 40_000,
                phase: BreakdownPhase::Opening,
            },
        ];

        repo.create_session(
            &session("s-1", 1),
            &entries,
            &audit("s-1", AuditAction::SessionOpened),
        )
        .await
        .unwrap();

        let fetched = repo
            .get_denomination_breakdown("s-1", BreakdownPhase::Opening)
            .await
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].denomination_id, 1);
        assert_eq!(fetched[1].denomination_id, 2);

        let closing = repo
            .get_denomination_breakdown("s-1", BreakdownPhase::Closing)
            .await
            .unwrap();
        assert!(closing.is_empty());
    }

    #[tokio::test]
    async fn test_history_and_discrepancy_reports() {
        let db = test_db().await;
        let repo = db.sessions();

        // First session: closed with a 20.00 shortage
        repo.create_session(
            &session("s-1", 1),
            &breakdown("s-1", BreakdownPhase::Opening),
            &audit("s-1", AuditAction::SessionOpened),
        )
        .await
        .unwrap();
        repo.close_session(
            "s-1",
            &SessionClosing {
                closed_by: 7,
                declared_closing_cents: 48_000,
                calculated_closing_cents: 48_000,
                system_expected_cents: 50_000,
                discrepancy_cents: 2_000,
                closed_at: Utc::now(),
                closing_notes: None,
            },
            &breakdown("s-1", BreakdownPhase::Closing),
            &audit("s-1", AuditAction::SessionClosed),
        )
        .await
        .unwrap();

        // Second session: closed clean
        repo.create_session(
            &session("s-2", 1),
            &breakdown("s-2", BreakdownPhase::Opening),
            &audit("s-2", AuditAction::SessionOpened),
        )
        .await
        .unwrap();
        repo.close_session(
            "s-2",
            &SessionClosing {
                closed_by: 7,
                declared_closing_cents: 50_000,
                calculated_closing_cents: 50_000,
                system_expected_cents: 50_000,
                discrepancy_cents: 0,
                closed_at: Utc::now(),
                closing_notes: None,
            },
            &breakdown("s-2", BreakdownPhase::Closing),
            &audit("s-2", AuditAction::SessionClosed),
        )
        .await
        .unwrap();

        let history = repo.get_session_history(1, 50).await.unwrap();
        assert_eq!(history.len(), 2);

        // Only the shortage shows up in discrepancy reports
        let reports = repo.get_discrepancy_reports(1, 20).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].session_id, "s-1");
        assert_eq!(reports[0].register_name, "Front register");
        assert_eq!(reports[0].closed_by_name.as_deref(), Some("Dana"));
        assert!(reports[0].is_shortage());
    }
}
