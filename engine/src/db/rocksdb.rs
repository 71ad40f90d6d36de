//! RocksDB-backed [`NameDb`] implementation.
//!
//! Column families split the keyspace the way the teacher's own
//! storage layer splits block data from metadata: one CF per logical
//! table, plus a catch-all `meta` CF for `lastblock` and similar
//! singleton values.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, Options, DB};

use crate::db::errors::StorageError;
use crate::db::history::History;
use crate::db::records::{NameRecord, NamespaceRecord, PendingNamespacePreorder, PendingPreorder};
use crate::db::store::NameDb;
use crate::types::hash::{Hash128, Hash160};
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::NameOp;

const CF_NAMES: &str = "names";
const CF_NAMESPACES: &str = "namespaces";
const CF_PREORDERS: &str = "preorders";
const CF_NAMESPACE_PREORDERS: &str = "namespace_preorders";
const CF_HISTORY: &str = "history";
const CF_CONSENSUS_RING: &str = "consensus_ring";
const CF_CONSENSUS_RING_REV: &str = "consensus_ring_rev";
const CF_BLOCK_RECORDS: &str = "block_records";
const CF_META: &str = "meta";

const ALL_CFS: &[&str] = &[
    CF_NAMES,
    CF_NAMESPACES,
    CF_PREORDERS,
    CF_NAMESPACE_PREORDERS,
    CF_HISTORY,
    CF_CONSENSUS_RING,
    CF_CONSENSUS_RING_REV,
    CF_BLOCK_RECORDS,
    CF_META,
];

const LAST_BLOCK_KEY: &[u8] = b"lastblock";

pub struct RocksDb {
    db: DB,
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

impl RocksDb {
    /// Opens (or creates) a database at `path`, ensuring every column
    /// family this engine needs exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;
        Ok(RocksDb { db })
    }

    fn cf(&self, name: &str) -> Result<Arc<rocksdb::BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::Corrupt(format!("missing column family {name}")))
    }

    fn history_cf_key(name: &Name) -> Vec<u8> {
        name.as_str().as_bytes().to_vec()
    }
}

impl NameDb for RocksDb {
    fn get_name(&self, name: &Name) -> Result<Option<NameRecord>, StorageError> {
        let cf = self.cf(CF_NAMES)?;
        match self.db.get_cf(&cf, name.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_name(&mut self, record: NameRecord) -> Result<(), StorageError> {
        let cf = self.cf(CF_NAMES)?;
        let bytes = encode(&record)?;
        self.db
            .put_cf(&cf, record.name.as_str().as_bytes(), bytes)?;
        Ok(())
    }

    fn remove_name(&mut self, name: &Name) -> Result<(), StorageError> {
        let cf = self.cf(CF_NAMES)?;
        self.db.delete_cf(&cf, name.as_str().as_bytes())?;
        Ok(())
    }

    fn all_name_keys(&self) -> Result<Vec<Name>, StorageError> {
        let cf = self.cf(CF_NAMES)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (key, _) = item?;
            let s = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            if let Some(name) = Name::parse(s) {
                out.push(name);
            }
        }
        Ok(out)
    }

    fn get_namespace(&self, id: &NamespaceId) -> Result<Option<NamespaceRecord>, StorageError> {
        let cf = self.cf(CF_NAMESPACES)?;
        match self.db.get_cf(&cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_namespace(&mut self, record: NamespaceRecord) -> Result<(), StorageError> {
        let cf = self.cf(CF_NAMESPACES)?;
        let bytes = encode(&record)?;
        self.db
            .put_cf(&cf, record.namespace_id.as_str().as_bytes(), bytes)?;
        Ok(())
    }

    fn all_namespace_keys(&self) -> Result<Vec<NamespaceId>, StorageError> {
        let cf = self.cf(CF_NAMESPACES)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (key, _) = item?;
            let s = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            if let Some(id) = NamespaceId::parse(s) {
                out.push(id);
            }
        }
        Ok(out)
    }

    fn get_pending_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingPreorder>, StorageError> {
        let cf = self.cf(CF_PREORDERS)?;
        match self.db.get_cf(&cf, hash.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_pending_preorder(&mut self, preorder: PendingPreorder) -> Result<(), StorageError> {
        let cf = self.cf(CF_PREORDERS)?;
        let bytes = encode(&preorder)?;
        self.db
            .put_cf(&cf, preorder.preorder_hash.as_bytes(), bytes)?;
        Ok(())
    }

    fn remove_pending_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError> {
        let cf = self.cf(CF_PREORDERS)?;
        self.db.delete_cf(&cf, hash.as_bytes())?;
        Ok(())
    }

    fn all_pending_preorders(&self) -> Result<Vec<PendingPreorder>, StorageError> {
        let cf = self.cf(CF_PREORDERS)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item?;
            out.push(decode(&value)?);
        }
        Ok(out)
    }

    fn get_pending_namespace_preorder(
        &self,
        hash: &Hash160,
    ) -> Result<Option<PendingNamespacePreorder>, StorageError> {
        let cf = self.cf(CF_NAMESPACE_PREORDERS)?;
        match self.db.get_cf(&cf, hash.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_pending_namespace_preorder(
        &mut self,
        preorder: PendingNamespacePreorder,
    ) -> Result<(), StorageError> {
        let cf = self.cf(CF_NAMESPACE_PREORDERS)?;
        let bytes = encode(&preorder)?;
        self.db
            .put_cf(&cf, preorder.preorder_hash.as_bytes(), bytes)?;
        Ok(())
    }

    fn remove_pending_namespace_preorder(&mut self, hash: &Hash160) -> Result<(), StorageError> {
        let cf = self.cf(CF_NAMESPACE_PREORDERS)?;
        self.db.delete_cf(&cf, hash.as_bytes())?;
        Ok(())
    }

    fn all_pending_namespace_preorders(
        &self,
    ) -> Result<Vec<PendingNamespacePreorder>, StorageError> {
        let cf = self.cf(CF_NAMESPACE_PREORDERS)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item?;
            out.push(decode(&value)?);
        }
        Ok(out)
    }

    fn append_history(
        &mut self,
        name: &Name,
        block: u64,
        vtxindex: u32,
        snapshot: NameRecord,
    ) -> Result<(), StorageError> {
        let cf = self.cf(CF_HISTORY)?;
        let key = Self::history_cf_key(name);
        let mut history: History = match self.db.get_cf(&cf, &key)? {
            Some(bytes) => decode(&bytes)?,
            None => History::new(),
        };
        history.push(block, vtxindex, snapshot);
        let bytes = encode(&history)?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn get_history(&self, name: &Name) -> Result<History, StorageError> {
        let cf = self.cf(CF_HISTORY)?;
        match self.db.get_cf(&cf, Self::history_cf_key(name))? {
            Some(bytes) => decode(&bytes),
            None => Ok(History::new()),
        }
    }

    fn all_history_keys(&self) -> Result<Vec<Name>, StorageError> {
        let cf = self.cf(CF_HISTORY)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (key, _) = item?;
            let s = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            if let Some(name) = Name::parse(s) {
                out.push(name);
            }
        }
        Ok(out)
    }

    fn put_consensus_hash(&mut self, block: u64, hash: Hash128) -> Result<(), StorageError> {
        let fwd = self.cf(CF_CONSENSUS_RING)?;
        let rev = self.cf(CF_CONSENSUS_RING_REV)?;
        self.db.put_cf(&fwd, block.to_be_bytes(), hash.as_bytes())?;
        self.db
            .put_cf(&rev, hash.as_bytes(), block.to_be_bytes())?;
        Ok(())
    }

    fn get_consensus_hash(&self, block: u64) -> Result<Option<Hash128>, StorageError> {
        let cf = self.cf(CF_CONSENSUS_RING)?;
        match self.db.get_cf(&cf, block.to_be_bytes())? {
            Some(bytes) => Ok(Hash128::from_bytes(&bytes)),
            None => Ok(None),
        }
    }

    fn get_block_from_consensus(&self, hash: &Hash128) -> Result<Option<u64>, StorageError> {
        let cf = self.cf(CF_CONSENSUS_RING_REV)?;
        match self.db.get_cf(&cf, hash.as_bytes())? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::Corrupt("bad block number width".into()))?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    fn get_last_block(&self) -> Result<Option<u64>, StorageError> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(&cf, LAST_BLOCK_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::Corrupt("bad lastblock width".into()))?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    fn set_last_block(&mut self, block: u64) -> Result<(), StorageError> {
        let cf = self.cf(CF_META)?;
        self.db.put_cf(&cf, LAST_BLOCK_KEY, block.to_be_bytes())?;
        Ok(())
    }

    fn put_block_records(&mut self, block: u64, ops: Vec<NameOp>) -> Result<(), StorageError> {
        let cf = self.cf(CF_BLOCK_RECORDS)?;
        let bytes = encode(&ops)?;
        self.db.put_cf(&cf, block.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn get_block_records(&self, block: u64) -> Result<Vec<NameOp>, StorageError> {
        let cf = self.cf(CF_BLOCK_RECORDS)?;
        match self.db.get_cf(&cf, block.to_be_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids::{Address, ScriptPubkey};

    fn record(name: &str) -> NameRecord {
        NameRecord {
            name: Name::parse(name).unwrap(),
            preorder_hash: None,
            consensus_hash: None,
            sender: ScriptPubkey(vec![1, 2, 3]),
            address: Address("addr".into()),
            sender_pubkey: None,
            value_hash: None,
            block_number: 10,
            first_registered: 10,
            last_renewed: 10,
            op_fee: 100,
            revoked: false,
            importer: None,
        }
    }

    #[test]
    fn put_get_remove_name_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = RocksDb::open(dir.path()).unwrap();
        let rec = record("alice.test");
        db.put_name(rec.clone()).unwrap();
        assert!(db.get_name(&rec.name).unwrap().is_some());
        db.remove_name(&rec.name).unwrap();
        assert!(db.get_name(&rec.name).unwrap().is_none());
    }

    #[test]
    fn last_block_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut db = RocksDb::open(dir.path()).unwrap();
            db.set_last_block(42).unwrap();
        }
        let db = RocksDb::open(dir.path()).unwrap();
        assert_eq!(db.get_last_block().unwrap(), Some(42));
    }

    #[test]
    fn consensus_ring_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let hash = Hash128([9u8; 16]);
        {
            let mut db = RocksDb::open(dir.path()).unwrap();
            db.put_consensus_hash(7, hash).unwrap();
        }
        let db = RocksDb::open(dir.path()).unwrap();
        assert_eq!(db.get_consensus_hash(7).unwrap(), Some(hash));
        assert_eq!(db.get_block_from_consensus(&hash).unwrap(), Some(7));
    }
}
