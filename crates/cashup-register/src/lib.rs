//! # cashup-register: Session Lifecycle Service for Cashup
//!
//! The orchestration layer of the register session subsystem. Callers hand
//! this crate typed requests; it validates them, runs the reconciliation
//! engine from `cashup-core` and persists through `cashup-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashup Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            ★ cashup-register (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  RegisterService                                                │   │
//! │  │  ├── open_session / close_session    (lifecycle)                │   │
//! │  │  ├── active_session / session        (state queries)            │   │
//! │  │  ├── session_history / reports       (back office)              │   │
//! │  │  └── audit_trail                     (review)                   │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │        ┌─────────▼─────────┐         ┌─────────▼─────────┐             │
//! │        │   cashup-core     │         │    cashup-db      │             │
//! │        │ reconcile, Money  │         │ SQLite, sqlx      │             │
//! │        └───────────────────┘         └───────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use cashup_db::{Database, DbConfig};
//! use cashup_register::{OpenSessionRequest, RegisterService, RequestContext};
//!
//! let db = Database::new(DbConfig::new("./cashup.db")).await?;
//! let service = RegisterService::new(db);
//!
//! let session = service
//!     .open_session(request, &RequestContext::empty())
//!     .await?;
//! ```

pub mod error;
pub mod requests;
pub mod service;

pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use requests::{CloseSessionRequest, OpenSessionRequest, RequestContext};
pub use service::{RegisterService, DEFAULT_HISTORY_LIMIT, DEFAULT_REPORT_LIMIT};
