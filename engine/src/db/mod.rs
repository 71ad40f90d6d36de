//! The name/namespace database: typed records, history, pending
//! preorders, and the consensus-hash ring (spec.md §3.1).

pub mod errors;
pub mod history;
pub mod mem;
pub mod records;
pub mod rocksdb;
pub mod store;

pub use errors::StorageError;
pub use history::{History, HistoryKey};
pub use mem::MemDb;
pub use records::{
    NameRecord, NamespaceLifecycle, NamespaceRecord, PendingNamespacePreorder, PendingPreorder,
    NAMESPACE_LIFE_INFINITE,
};
pub use rocksdb::RocksDb;
pub use store::NameDb;
