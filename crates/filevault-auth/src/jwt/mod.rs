//! Bearer token validation.

pub mod claims;
pub mod decoder;

use async_trait::async_trait;

use filevault_core::result::AppResult;

pub use claims::Claims;
pub use decoder::JwtIdentityResolver;

/// Resolves an opaque bearer token to the caller's numeric user ID.
///
/// Any token that cannot be resolved fails with `ErrorKind::Authentication`.
#[async_trait]
pub trait IdentityResolver: Send + Sync + std::fmt::Debug + 'static {
    async fn resolve(&self, token: &str) -> AppResult<i64>;
}
