//! JSON bodies returned by the HTTP API.
//!
//! Link lookups reuse [`AggregateResponse`](crate::aggregator::AggregateResponse)
//! directly, which serializes as:
//!
//! ```json
//! {
//!   "links": [
//!     { "id": 0, "url": "https://go.dev", "links": 18, "time": "312.042ms" },
//!     { "id": 1, "url": "https://down.example", "links": 0, "time": "10s",
//!       "error": { "kind": "timeout", "message": "request timed out" } }
//!   ],
//!   "time": "10.002s"
//! }
//! ```
//!
//! Per-entry `time` is that target's fetch and count; the top-level `time` is
//! the whole operation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}
