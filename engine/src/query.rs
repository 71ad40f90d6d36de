//! The read-only query interface exposed to front-ends (spec.md §6).
//!
//! Every call that would read partial state while a block is being
//! indexed returns [`QueryError::Indexing`] instead — callers observe
//! the same indexing flag the state engine sets around
//! `process_block`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::db::{NameDb, NameRecord, NamespaceRecord, StorageError};
use crate::engine::ConsensusParams;
use crate::pricing::{name_price, namespace_price};
use crate::types::hash::Hash128;
use crate::types::ids::{Address, Name, NamespaceId};
use crate::types::tx::NameOp;

#[derive(Debug)]
pub enum QueryError {
    Indexing,
    NotFound,
    Storage(StorageError),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Indexing => write!(f, "Indexing blockchain"),
            QueryError::NotFound => write!(f, "not found"),
            QueryError::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<StorageError> for QueryError {
    fn from(e: StorageError) -> Self {
        QueryError::Storage(e)
    }
}

/// Shared flag the state engine sets while a block is mid-processing;
/// queries that would observe partial state check it first.
#[derive(Clone, Default)]
pub struct IndexingFlag(Arc<AtomicBool>);

impl IndexingFlag {
    pub fn new() -> Self {
        IndexingFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self, indexing: bool) {
        self.0.store(indexing, Ordering::SeqCst);
    }

    pub fn is_indexing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct NodeInfo {
    pub chain_tip: u64,
    pub last_processed_block: u64,
    pub consensus: Option<Hash128>,
    pub version: &'static str,
}

pub struct QueryEngine<'a, D: NameDb> {
    db: &'a D,
    indexing: IndexingFlag,
    params: ConsensusParams,
    chain_tip: u64,
}

impl<'a, D: NameDb> QueryEngine<'a, D> {
    pub fn new(db: &'a D, indexing: IndexingFlag, params: ConsensusParams, chain_tip: u64) -> Self {
        QueryEngine {
            db,
            indexing,
            params,
            chain_tip,
        }
    }

    fn guard(&self) -> Result<(), QueryError> {
        if self.indexing.is_indexing() {
            return Err(QueryError::Indexing);
        }
        Ok(())
    }

    pub fn get_name_record(&self, name: &Name) -> Result<NameRecord, QueryError> {
        self.guard()?;
        self.db.get_name(name)?.ok_or(QueryError::NotFound)
    }

    pub fn get_name_history(
        &self,
        name: &Name,
        start: u64,
        end: u64,
    ) -> Result<Vec<NameRecord>, QueryError> {
        self.guard()?;
        let history = self.db.get_history(name)?;
        Ok(history.range(start, end).into_iter().cloned().collect())
    }

    pub fn get_records_at(&self, block: u64) -> Result<Vec<NameOp>, QueryError> {
        self.guard()?;
        Ok(self.db.get_block_records(block)?)
    }

    pub fn get_records_hash_at(&self, block: u64) -> Result<Hash128, QueryError> {
        self.get_consensus_at(block)
    }

    pub fn get_consensus_at(&self, block: u64) -> Result<Hash128, QueryError> {
        self.guard()?;
        self.db.get_consensus_hash(block)?.ok_or(QueryError::NotFound)
    }

    pub fn get_block_from_consensus(&self, hash: &Hash128) -> Result<u64, QueryError> {
        self.guard()?;
        self.db
            .get_block_from_consensus(hash)?
            .ok_or(QueryError::NotFound)
    }

    pub fn get_names_owned_by_address(&self, addr: &Address) -> Result<Vec<Name>, QueryError> {
        self.guard()?;
        Ok(self.db.names_owned_by_address(addr)?)
    }

    pub fn get_all_names(&self, offset: usize, count: usize) -> Result<Vec<Name>, QueryError> {
        self.guard()?;
        Ok(self.db.all_names(offset, count)?)
    }

    pub fn get_names_in_namespace(
        &self,
        ns: &NamespaceId,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Name>, QueryError> {
        self.guard()?;
        Ok(self.db.names_in_namespace(ns, offset, count)?)
    }

    pub fn get_namespace_record(&self, ns_id: &NamespaceId) -> Result<NamespaceRecord, QueryError> {
        self.guard()?;
        self.db.get_namespace(ns_id)?.ok_or(QueryError::NotFound)
    }

    /// Alias of [`Self::get_namespace_record`]: a namespace's reveal
    /// parameters (pricing table, lifetime) live on the same record as
    /// its current lifecycle state rather than a separate table.
    pub fn get_namespace_reveal_record(
        &self,
        ns_id: &NamespaceId,
    ) -> Result<NamespaceRecord, QueryError> {
        self.get_namespace_record(ns_id)
    }

    pub fn get_name_cost(&self, name: &Name) -> Result<u64, QueryError> {
        self.guard()?;
        let ns_id = NamespaceId::parse(name.namespace_id()).ok_or(QueryError::NotFound)?;
        let namespace = self.db.get_namespace(&ns_id)?.ok_or(QueryError::NotFound)?;
        Ok(name_price(name.local_part(), &namespace.price_params()))
    }

    pub fn get_namespace_cost(&self, ns_id: &NamespaceId) -> Result<u64, QueryError> {
        self.guard()?;
        Ok(namespace_price(ns_id.as_str().len(), self.params.testset))
    }

    pub fn getinfo(&self) -> Result<NodeInfo, QueryError> {
        let last_processed_block = self.db.get_last_block()?.unwrap_or(0);
        let consensus = self.db.get_consensus_hash(last_processed_block)?;
        Ok(NodeInfo {
            chain_tip: self.chain_tip,
            last_processed_block,
            consensus,
            version: env!("CARGO_PKG_VERSION"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemDb;

    #[test]
    fn indexing_flag_rejects_reads() {
        let db = MemDb::new();
        let flag = IndexingFlag::new();
        flag.set(true);
        let q = QueryEngine::new(&db, flag, ConsensusParams::mainnet(), 0);
        let name = Name::parse("alice.test").unwrap();
        assert!(matches!(
            q.get_name_record(&name),
            Err(QueryError::Indexing)
        ));
    }

    #[test]
    fn not_found_when_absent_and_not_indexing() {
        let db = MemDb::new();
        let flag = IndexingFlag::new();
        let q = QueryEngine::new(&db, flag, ConsensusParams::mainnet(), 0);
        let name = Name::parse("alice.test").unwrap();
        assert!(matches!(
            q.get_name_record(&name),
            Err(QueryError::NotFound)
        ));
    }

    #[test]
    fn get_records_at_reflects_persisted_block() {
        let mut db = MemDb::new();
        db.put_block_records(5, vec![]).unwrap();
        let flag = IndexingFlag::new();
        let q = QueryEngine::new(&db, flag, ConsensusParams::mainnet(), 0);
        assert!(q.get_records_at(5).unwrap().is_empty());
    }

    #[test]
    fn getinfo_reports_zero_before_any_block() {
        let db = MemDb::new();
        let flag = IndexingFlag::new();
        let q = QueryEngine::new(&db, flag, ConsensusParams::mainnet(), 10);
        let info = q.getinfo().unwrap();
        assert_eq!(info.last_processed_block, 0);
        assert_eq!(info.chain_tip, 10);
        assert!(info.consensus.is_none());
    }
}
