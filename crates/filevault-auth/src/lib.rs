//! # filevault-auth
//!
//! Authorization and caller identity for FileVault.
//!
//! ## Modules
//!
//! - `acl`: the owner-or-grant access rule and its store-backed checker
//! - `jwt`: bearer token validation resolving a caller to a numeric user ID

pub mod acl;
pub mod jwt;

pub use acl::{AccessChecker, can_access};
pub use jwt::{Claims, IdentityResolver, JwtIdentityResolver};
