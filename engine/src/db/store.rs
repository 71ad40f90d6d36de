//! The [`NameDb`] trait: a typed store of current records, history,
//! pending preorders, and the consensus-hash ring (spec.md §3.1).
//!
//! Two implementations exist: [`super::mem::MemDb`] (tests, `rebuilddb`
//! dry runs) and [`super::rocksdb::RocksDb`] (production persistence).
//! Dispatch is static (a type parameter on the engine), not dynamic —
//! consistent with the no-dynamic-dispatch design note for operations.

use crate::db::errors::StorageError;
use crate::db::history::History;
use crate::db::records::{NameRecord, NamespaceRecord, PendingNamespacePreorder, PendingPreorder};
use crate::types::hash::{Hash128, Hash160};
use crate::types::ids::{Address, Name, NamespaceId, ScriptPubkey};
use crate::types::tx::NameOp;

/// A typed store of the engine's entire durable state.
///
/// Implementations must make every write durable before the call
/// returns successfully (or report [`StorageError`] so the caller can
/// treat it as the fatal persistence failure spec.md §7 requires).
pub trait NameDb {
    fn get_name(&self, name: &Name) -> Result<Option<NameRecord>, StorageError>;
    fn put_name(&mut self, record: NameRecord) -> Result<(), StorageError>;
    fn remove_name(&mut self, name: &Name) -> Result<(), StorageError>;
    /// All currently-active names, for expiration scans and queries.
    fn all_name_keys(&self) -> Result<Vec<Name>, StorageError>;

    fn get_namespace(&self, id: &NamespaceId) -> Result<Option<NamespaceRecord>, StorageError>;
    fn put_namespace(&mut self, record: NamespaceRecord) -> Result<(), StorageError>;
    fn all_namespace_keys(&self) -> Result<Vec<NamespaceId>, StorageError>;

    fn get_pending_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingPreorder>, StorageError>;
    fn put_pending_preorder(&mut self, preorder: PendingPreorder) -> Result<(), StorageError>;
    fn remove_pending_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError>;
    fn all_pending_preorders(&self) -> Result<Vec<PendingPreorder>, StorageError>;

    fn get_pending_namespace_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingNamespacePreorder>, StorageError>;
    fn put_pending_namespace_preorder(
        &mut self,
        preorder: PendingNamespacePreorder,
    ) -> Result<(), StorageError>;
    fn remove_pending_namespace_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError>;
    fn all_pending_namespace_preorders(
        &self,
    ) -> Result<Vec<PendingNamespacePreorder>, StorageError>;

    fn append_history(
        &mut self,
        name: &Name,
        block: u64,
        vtxindex: u32,
        snapshot: NameRecord,
    ) -> Result<(), StorageError>;
    fn get_history(&self, name: &Name) -> Result<History, StorageError>;
    /// Every name that has ever had a history entry, including names
    /// since expired or revoked and removed from the live lookup table.
    /// SNV reconstruction needs this superset of [`NameDb::all_name_keys`].
    fn all_history_keys(&self) -> Result<Vec<Name>, StorageError>;

    fn put_consensus_hash(&mut self, block: u64, hash: Hash128) -> Result<(), StorageError>;
    fn get_consensus_hash(&self, block: u64) -> Result<Option<Hash128>, StorageError>;
    fn get_block_from_consensus(&self, hash: &Hash128) -> Result<Option<u64>, StorageError>;

    fn get_last_block(&self) -> Result<Option<u64>, StorageError>;
    fn set_last_block(&mut self, block: u64) -> Result<(), StorageError>;

    /// Persists the accepted operations of one block, in canonical
    /// order, for `get_records_at` (spec.md §6).
    fn put_block_records(&mut self, block: u64, ops: Vec<NameOp>) -> Result<(), StorageError>;
    /// Returns the accepted operations of `block` in canonical order,
    /// or an empty list if the block was never indexed.
    fn get_block_records(&self, block: u64) -> Result<Vec<NameOp>, StorageError>;

    /// Number of currently-active (non-expired, non-revoked) names
    /// owned by `sender`, for the 25-name quota (spec.md §3.2).
    ///
    /// Default implementation scans every name; backends with a
    /// secondary owner index should override it.
    fn count_active_names_for_sender(
        &self,
        sender: &ScriptPubkey,
        current_block: u64,
    ) -> Result<usize, StorageError> {
        let mut count = 0;
        for name in self.all_name_keys()? {
            if let Some(record) = self.get_name(&name)? {
                if record.revoked || record.sender.as_bytes() != sender.as_bytes() {
                    continue;
                }
                let Some(ns_id) = NamespaceId::parse(name.namespace_id()) else {
                    continue;
                };
                let Some(ns) = self.get_namespace(&ns_id)? else {
                    continue;
                };
                if record.is_live(current_block, &ns) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn names_owned_by_address(&self, addr: &Address) -> Result<Vec<Name>, StorageError> {
        let mut out = Vec::new();
        for name in self.all_name_keys()? {
            if let Some(record) = self.get_name(&name)? {
                if &record.address == addr {
                    out.push(name);
                }
            }
        }
        Ok(out)
    }

    fn names_in_namespace(
        &self,
        ns: &NamespaceId,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Name>, StorageError> {
        let mut matching: Vec<Name> = self
            .all_name_keys()?
            .into_iter()
            .filter(|n| n.namespace_id() == ns.as_str())
            .collect();
        matching.sort();
        Ok(matching.into_iter().skip(offset).take(count).collect())
    }

    fn all_names(&self, offset: usize, count: usize) -> Result<Vec<Name>, StorageError> {
        let mut all = self.all_name_keys()?;
        all.sort();
        Ok(all.into_iter().skip(offset).take(count).collect())
    }
}
