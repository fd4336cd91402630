//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current authenticated request.
///
/// Built by the transport layer once the bearer token has been resolved
/// and passed into every service method, so that each operation knows
/// *who* is acting without consulting ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: i64,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            request_time: Utc::now(),
        }
    }
}
