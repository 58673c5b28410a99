//! # Denomination Repository
//!
//! Read access to the denomination catalog: the set of recognized bills and
//! coins for the register's currency.
//!
//! Catalog rows are reference data maintained by configuration. Session
//! operations only ever read them; the single write method exists for
//! configuration tooling and test seeding.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cashup_core::DenominationType;

/// Repository for denomination catalog access.
#[derive(Debug, Clone)]
pub struct DenominationRepository {
    pool: SqlitePool,
}

impl DenominationRepository {
    /// Creates a new DenominationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DenominationRepository { pool }
    }

    /// Lists active denominations ordered by `sort_order`.
    ///
    /// This is the catalog handed to the reconciliation engine. An empty
    /// result means the deployment was never configured; that is the
    /// caller's error to surface, not handled here.
    pub async fn list_active(&self) -> DbResult<Vec<DenominationType>> {
        let denominations = sqlx::query_as::<_, DenominationType>(
            r#"
            SELECT id, name, value_cents, is_active, sort_order
            FROM denomination_types
            WHERE is_active = 1
            ORDER BY sort_order
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = denominations.len(), "Listed active denominations");

        Ok(denominations)
    }

    /// Lists all denominations, including inactive ones, ordered by
    /// `sort_order`. Used by back-office configuration screens and for
    /// rendering historical breakdowns that reference retired
    /// denominations.
    pub async fn list_all(&self) -> DbResult<Vec<DenominationType>> {
        let denominations = sqlx::query_as::<_, DenominationType>(
            r#"
            SELECT id, name, value_cents, is_active, sort_order
            FROM denomination_types
            ORDER BY sort_order
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(denominations)
    }

    /// Gets a denomination by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<DenominationType> {
        let denomination = sqlx::query_as::<_, DenominationType>(
            r#"
            SELECT id, name, value_cents, is_active, sort_order
            FROM denomination_types
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Denomination", id.to_string()))?;

        Ok(denomination)
    }

    /// Inserts a denomination and returns its generated id.
    ///
    /// Configuration/seeding only; never called by session operations.
    pub async fn insert(
        &self,
        name: &str,
        value_cents: i64,
        is_active: bool,
        sort_order: i64,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO denomination_types (name, value_cents, is_active, sort_order)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(name)
        .bind(value_cents)
        .bind(is_active)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_list_active_orders_by_sort_order_and_hides_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.denominations();

        repo.insert("$10 bill", 1_000, true, 2).await.unwrap();
        repo.insert("$100 bill", 10_000, true, 1).await.unwrap();
        repo.insert("$2 bill", 200, false, 3).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].name, "$100 bill");
        assert_eq!(active[1].name, "$10 bill");

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.denominations().get_by_id(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
