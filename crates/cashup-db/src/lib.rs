//! # cashup-db: Database Layer for Cashup
//!
//! This crate provides database access for the register session subsystem.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashup Data Flow                                 │
//! │                                                                         │
//! │  RegisterService (open_session / close_session)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cashup-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (session.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │  denomination, │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  audit)        │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (WAL mode)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (session, denomination, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashup_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/cashup.db")).await?;
//! let active = db.sessions().get_active_session(1).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::denomination::DenominationRepository;
pub use repository::session::{SessionClosing, SessionRepository};
