//! Shared response envelope types for API handlers.
//!
//! Single records are returned as `{ "data": ... }`; list endpoints
//! return the `Page` envelope from `stocktake_core::view` directly,
//! which carries the items plus the totals the pager needs.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
