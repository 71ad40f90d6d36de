//! In-memory [`NameDb`] backend, used by tests and `rebuilddb` dry
//! runs (no RocksDB column families to manage).

use std::collections::HashMap;

use crate::db::errors::StorageError;
use crate::db::history::History;
use crate::db::records::{NameRecord, NamespaceRecord, PendingNamespacePreorder, PendingPreorder};
use crate::db::store::NameDb;
use crate::types::hash::{Hash128, Hash160};
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::NameOp;

#[derive(Default)]
pub struct MemDb {
    names: HashMap<Name, NameRecord>,
    namespaces: HashMap<NamespaceId, NamespaceRecord>,
    preorders: HashMap<Hash160, PendingPreorder>,
    namespace_preorders: HashMap<Hash160, PendingNamespacePreorder>,
    histories: HashMap<Name, History>,
    consensus_ring: HashMap<u64, Hash128>,
    consensus_ring_rev: HashMap<Hash128, u64>,
    block_records: HashMap<u64, Vec<NameOp>>,
    last_block: Option<u64>,
}

impl MemDb {
    pub fn new() -> Self {
        MemDb::default()
    }
}

impl NameDb for MemDb {
    fn get_name(&self, name: &Name) -> Result<Option<NameRecord>, StorageError> {
        Ok(self.names.get(name).cloned())
    }

    fn put_name(&mut self, record: NameRecord) -> Result<(), StorageError> {
        self.names.insert(record.name.clone(), record);
        Ok(())
    }

    fn remove_name(&mut self, name: &Name) -> Result<(), StorageError> {
        self.names.remove(name);
        Ok(())
    }

    fn all_name_keys(&self) -> Result<Vec<Name>, StorageError> {
        Ok(self.names.keys().cloned().collect())
    }

    fn get_namespace(&self, id: &NamespaceId) -> Result<Option<NamespaceRecord>, StorageError> {
        Ok(self.namespaces.get(id).cloned())
    }

    fn put_namespace(&mut self, record: NamespaceRecord) -> Result<(), StorageError> {
        self.namespaces.insert(record.namespace_id.clone(), record);
        Ok(())
    }

    fn all_namespace_keys(&self) -> Result<Vec<NamespaceId>, StorageError> {
        Ok(self.namespaces.keys().cloned().collect())
    }

    fn get_pending_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingPreorder>, StorageError> {
        Ok(self.preorders.get(hash).cloned())
    }

    fn put_pending_preorder(&mut self, preorder: PendingPreorder) -> Result<(), StorageError> {
        self.preorders.insert(preorder.preorder_hash, preorder);
        Ok(())
    }

    fn remove_pending_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError> {
        self.preorders.remove(hash);
        Ok(())
    }

    fn all_pending_preorders(&self) -> Result<Vec<PendingPreorder>, StorageError> {
        Ok(self.preorders.values().cloned().collect())
    }

    fn get_pending_namespace_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingNamespacePreorder>, StorageError> {
        Ok(self.namespace_preorders.get(hash).cloned())
    }

    fn put_pending_namespace_preorder(
        &mut self,
        preorder: PendingNamespacePreorder,
    ) -> Result<(), StorageError> {
        self.namespace_preorders
            .insert(preorder.preorder_hash, preorder);
        Ok(())
    }

    fn remove_pending_namespace_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError> {
        self.namespace_preorders.remove(hash);
        Ok(())
    }

    fn all_pending_namespace_preorders(
        &self,
    ) -> Result<Vec<PendingNamespacePreorder>, StorageError> {
        Ok(self.namespace_preorders.values().cloned().collect())
    }

    fn append_history(
        &mut self,
        name: &Name,
        block: u64,
        vtxindex: u32,
        snapshot: NameRecord,
    ) -> Result<(), StorageError> {
        self.histories
            .entry(name.clone())
            .or_default()
            .push(block, vtxindex, snapshot);
        Ok(())
    }

    fn get_history(&self, name: &Name) -> Result<History, StorageError> {
        Ok(self.histories.get(name).cloned().unwrap_or_default())
    }

    fn all_history_keys(&self) -> Result<Vec<Name>, StorageError> {
        Ok(self.histories.keys().cloned().collect())
    }

    fn put_consensus_hash(&mut self, block: u64, hash: Hash128) -> Result<(), StorageError> {
        self.consensus_ring.insert(block, hash);
        self.consensus_ring_rev.insert(hash, block);
        Ok(())
    }

    fn get_consensus_hash(&self, block: u64) -> Result<Option<Hash128>, StorageError> {
        Ok(self.consensus_ring.get(&block).copied())
    }

    fn get_block_from_consensus(&self, hash: &Hash128) -> Result<Option<u64>, StorageError> {
        Ok(self.consensus_ring_rev.get(hash).copied())
    }

    fn get_last_block(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.last_block)
    }

    fn set_last_block(&mut self, block: u64) -> Result<(), StorageError> {
        self.last_block = Some(block);
        Ok(())
    }

    fn put_block_records(&mut self, block: u64, ops: Vec<NameOp>) -> Result<(), StorageError> {
        self.block_records.insert(block, ops);
        Ok(())
    }

    fn get_block_records(&self, block: u64) -> Result<Vec<NameOp>, StorageError> {
        Ok(self.block_records.get(&block).cloned().unwrap_or_default())
    }
}
