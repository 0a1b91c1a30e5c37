//! Sane Image Storage Library
//!
//! The file store capability the optimizer writes results through, plus an
//! in-memory implementation.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryFileStore, StoredFile};
pub use traits::{FileStore, StorageError, StorageResult, StoreOptions};
