//! # Service Request Types
//!
//! Typed request shapes for session lifecycle operations. These are the
//! deserialization boundary: an API layer turns JSON into these structs and
//! hands them to [`RegisterService`](crate::RegisterService).

use serde::{Deserialize, Serialize};

use cashup_core::CountedDenomination;

/// Request to open a register session.
///
/// ## Example
/// ```json
/// {
///   "registerId": 1,
///   "branchId": 1,
///   "openedBy": 7,
///   "declaredOpeningCents": 50000,
///   "countedBreakdown": [
///     { "denomination_id": 1, "quantity": 5 }
///   ],
///   "notes": "Morning shift"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub register_id: i64,
    pub branch_id: i64,

    /// User opening the session.
    pub opened_by: i64,

    /// Opening balance the user asserts is in the drawer, in cents.
    pub declared_opening_cents: i64,

    /// Physical count of the drawer. Must reconcile with the declared
    /// balance within tolerance or the open is rejected.
    pub counted_breakdown: Vec<CountedDenomination>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to close a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionRequest {
    pub session_id: String,

    /// User closing the session. Need not be the user who opened it.
    pub closed_by: i64,

    /// Closing balance the user asserts is in the drawer, in cents.
    pub declared_closing_cents: i64,

    /// Physical count of the drawer at close.
    pub counted_breakdown: Vec<CountedDenomination>,

    /// Balance the surrounding ledger expects in the drawer, in cents.
    /// Opaque to this service: sales, payouts and expenses are summed by
    /// the caller. May be any sign.
    pub system_expected_cents: i64,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Request metadata recorded into the audit trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Context with no request metadata, for callers without a transport.
    pub fn empty() -> Self {
        RequestContext::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_request_deserializes_camel_case() {
        let json = r#"{
            "registerId": 1,
            "branchId": 2,
            "openedBy": 7,
            "declaredOpeningCents": 50000,
            "countedBreakdown": [{ "denomination_id": 1, "quantity": 5 }]
        }"#;

        let request: OpenSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.register_id, 1);
        assert_eq!(request.declared_opening_cents, 50_000);
        assert_eq!(request.counted_breakdown.len(), 1);
        assert_eq!(request.notes, None);
    }
}
