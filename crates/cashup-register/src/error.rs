//! # Service Error Type
//!
//! Unified error type returned to callers of [`RegisterService`].
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Cashup                                 │
//! │                                                                         │
//! │  Caller                       Service                                   │
//! │  ──────                       ───────                                   │
//! │                                                                         │
//! │  open_session(request)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<RegisterSession, ServiceError>                           │  │
//! │  │         │                                                        │  │
//! │  │  Input invalid? ──── CoreError ───────► VALIDATION_ERROR         │  │
//! │  │  Count ≠ declared? ─────────────────── VALIDATION_ERROR          │  │
//! │  │  Already open? ───── DbError ────────► CONFLICT                  │  │
//! │  │  Session missing? ── DbError ────────► NOT_FOUND                 │  │
//! │  │  Anything else ──────────────────────► INTERNAL                  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  A CONFLICT is never retried by the service. The caller decides        │
//! │  whether to re-read register state and try again.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use cashup_core::CoreError;
use cashup_db::DbError;

/// Error returned from service operations.
///
/// ## Serialization
/// This is what an API layer forwards when an operation fails:
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Register 3 already has an open session"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The requested session or catalog entity does not exist (404)
    NotFound,

    /// Input validation or reconciliation failed (400)
    ValidationError,

    /// The operation lost to a concurrent state change, e.g. the register
    /// already has an open session (409)
    Conflict,

    /// Infrastructure failure; request-shape retries won't help (500)
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::SessionConflict { register_id } => ServiceError::conflict(format!(
                "Register {} already has an open session",
                register_id
            )),
            DbError::UniqueViolation { field } => ServiceError::validation(format!(
                "Duplicate {}: value already exists",
                field
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ServiceError::validation("Invalid reference to register, user or denomination")
            }
            DbError::ConnectionFailed(_) => {
                ServiceError::internal("Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ServiceError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ServiceError::internal("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ServiceError::internal("Database transaction failed")
            }
            DbError::PoolExhausted => ServiceError::internal("Database pool exhausted"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ServiceError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
///
/// Everything the reconciliation engine rejects is bad input as far as the
/// caller is concerned.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownDenomination { denomination_id } => ServiceError::validation(
                format!("Unknown denomination: {}", denomination_id),
            ),
            CoreError::AmountOverflow { denomination_id } => ServiceError::validation(format!(
                "Breakdown amount overflow for denomination {}",
                denomination_id
            )),
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_conflict_maps_to_conflict_code() {
        let err: ServiceError = DbError::SessionConflict { register_id: 3 }.into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Register 3 already has an open session");
    }

    #[test]
    fn test_core_errors_map_to_validation() {
        let err: ServiceError = CoreError::UnknownDenomination {
            denomination_id: 42,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ValidationError).unwrap(),
            "\"VALIDATION_ERROR\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::Conflict).unwrap(),
            "\"CONFLICT\""
        );
    }
}
