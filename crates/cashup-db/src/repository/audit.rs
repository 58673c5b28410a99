//! # Audit Log Repository
//!
//! Append-only persistence for register lifecycle events.
//!
//! ## Append-Only Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_audit_logs                                                    │
//! │                                                                         │
//! │  INSERT ─── allowed (append, and ONLY inside the same transaction      │
//! │             as the state change it records)                            │
//! │  SELECT ─── allowed (reporting, session trail)                         │
//! │  UPDATE ─── does not exist                                             │
//! │  DELETE ─── does not exist                                             │
//! │                                                                         │
//! │  If the audit write fails, the lifecycle operation fails with it:      │
//! │  audit and state commit together, or neither does.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use cashup_core::AuditLogEntry;

/// Inserts an audit entry through any executor.
///
/// Taking an executor rather than the pool lets [`SessionRepository`]
/// (crate::repository::session) run the same insert inside its open/close
/// transactions, which is what makes audit + state atomic.
pub(crate) async fn insert_entry<'e, E>(executor: E, entry: &AuditLogEntry) -> DbResult<()>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO register_audit_logs (
            id, session_id, register_id, branch_id, user_id,
            action, description, old_value, new_value,
            amount_cents, ip_address, user_agent, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13
        )
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.session_id)
    .bind(entry.register_id)
    .bind(entry.branch_id)
    .bind(entry.user_id)
    .bind(entry.action)
    .bind(&entry.description)
    .bind(entry.old_value.clone())
    .bind(entry.new_value.clone())
    .bind(entry.amount_cents)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(entry.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for the append-only audit trail.
///
/// No update or delete method exists on this type by design of the audit
/// contract.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends an entry outside any session transaction.
    ///
    /// For register-level events that are not tied to an open/close (those
    /// go through [`SessionRepository`](crate::repository::session) so they
    /// share the state-change transaction).
    pub async fn append(&self, entry: &AuditLogEntry) -> DbResult<()> {
        debug!(
            id = %entry.id,
            action = ?entry.action,
            register_id = entry.register_id,
            "Appending audit entry"
        );

        insert_entry(&self.pool, entry).await
    }

    /// Lists the audit trail for one session, oldest first.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, session_id, register_id, branch_id, user_id,
                   action, description, old_value, new_value,
                   amount_cents, ip_address, user_agent, created_at
            FROM register_audit_logs
            WHERE session_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists recent audit entries for a register, newest first.
    pub async fn list_for_register(
        &self,
        register_id: i64,
        limit: u32,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, session_id, register_id, branch_id, user_id,
                   action, description, old_value, new_value,
                   amount_cents, ip_address, user_agent, created_at
            FROM register_audit_logs
            WHERE register_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(register_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Total number of audit entries. Test and diagnostics helper.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM register_audit_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cashup_core::AuditAction;
    use chrono::Utc;

    fn entry(register_id: i64) -> AuditLogEntry {
        AuditLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: None,
            register_id,
            branch_id: 1,
            user_id: 7,
            action: AuditAction::SessionOpened,
            description: "test event".into(),
            old_value: None,
            new_value: Some(serde_json::json!({ "declared_cents": 50_000 })),
            amount_cents: Some(50_000),
            ip_address: Some("10.0.0.4".into()),
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.audit_log();

        repo.append(&entry(1)).await.unwrap();
        repo.append(&entry(1)).await.unwrap();
        repo.append(&entry(2)).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);

        let for_register = repo.list_for_register(1, 50).await.unwrap();
        assert_eq!(for_register.len(), 2);
        assert_eq!(for_register[0].action, AuditAction::SessionOpened);
        assert_eq!(
            for_register[0].new_value.as_ref().unwrap()["declared_cents"],
            50_000
        );
    }
}
