//! Storage error taxonomy.
//!
//! Persistence failures are fatal per spec.md §7: the process aborts
//! and the next start resumes from the last successfully persisted
//! block. This enum is what the state engine matches on to decide
//! whether to abort.

#[derive(Debug)]
pub enum StorageError {
    Backend(String),
    Serialization(String),
    NotFound(String),
    Corrupt(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Backend(msg) => write!(f, "storage backend error: {msg}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::NotFound(what) => write!(f, "not found: {what}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt storage state: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}
