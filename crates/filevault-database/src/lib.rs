//! # filevault-database
//!
//! Durable storage of file, version, and permission metadata.
//!
//! [`FileMetadataStore`] is the contract the service layer depends on.
//! [`PgMetadataStore`] implements it on PostgreSQL through the
//! repositories in [`repositories`]; [`InMemoryFileStore`] implements it
//! in process memory for tests and throwaway deployments.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::InMemoryFileStore;
pub use repositories::{FileRepository, PermissionRepository};
pub use store::{FileMetadataStore, PgMetadataStore};
