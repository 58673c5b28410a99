//! # Repository Module
//!
//! Database repository implementations for Cashup.
//!
//! ## Repository Pattern
//! One typed repository per aggregate, each owning the SQL for that
//! aggregate. No generic any-table abstraction: the session store, the
//! denomination catalog and the audit log have different contracts
//! (transactional writes, read-only reference data, append-only) and get
//! different APIs.
//!
//! ## Available Repositories
//!
//! - [`denomination::DenominationRepository`] - Denomination catalog (read-mostly)
//! - [`session::SessionRepository`] - Register sessions and breakdowns
//! - [`audit::AuditLogRepository`] - Append-only audit trail

pub mod audit;
pub mod denomination;
pub mod session;
