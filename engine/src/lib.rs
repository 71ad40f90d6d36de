//! `nameset-engine`: a deterministic name-registry state engine
//! layered atop an external, already-confirmed blockchain.
//!
//! Parses namecoin-style opcodes out of transactions the caller
//! supplies (via [`chain_client::ChainClient`]), tracks name and
//! namespace ownership and pricing, and produces a per-block consensus
//! hash that light clients can verify independently via SNV
//! ([`engine::snv`]).
//!
//! This crate has no network code and no key custody: callers provide
//! a chain client and drive [`engine::StateEngine::process_block`]
//! block by block (spec.md §5).

pub mod chain_client;
pub mod codec;
pub mod db;
pub mod engine;
pub mod metrics;
pub mod ops;
pub mod pricing;
pub mod query;
pub mod types;

pub use chain_client::{ChainClient, RawTx, RawTxInput, RawTxOutput, CONFIRMATIONS};
pub use codec::{encode_payload, parse_payload, CodecError, Network};
pub use db::{MemDb, NameDb, NameRecord, NamespaceRecord, RocksDb, StorageError};
pub use engine::{BlockResult, CheckError, ConsensusParams, EngineConfig, EngineError, StateEngine};
pub use metrics::EngineMetrics;
pub use query::{IndexingFlag, NodeInfo, QueryEngine, QueryError};
pub use types::{Address, Name, NameOp, NamespaceId, OpPayload, ScriptPubkey};
