//! JWT claims carried by access tokens.

use serde::{Deserialize, Serialize};

use filevault_core::error::AppError;
use filevault_core::result::AppResult;

/// Registered claims issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID in decimal.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Parse the subject into a user ID. Only positive integers are accepted.
    pub fn user_id(&self) -> AppResult<i64> {
        match self.sub.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AppError::authentication("Token subject is not a valid user ID")),
        }
    }
}
