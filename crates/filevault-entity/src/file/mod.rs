//! File domain entities.

pub mod model;
pub mod version;

pub use model::{File, MAX_NAME_LENGTH, NewFile, normalize_name};
pub use version::{FIRST_VERSION, FileVersion, NewFileVersion, storage_key};
