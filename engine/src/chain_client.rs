//! The chain-client interface this engine consumes (spec.md §6).
//!
//! The engine never talks to a blockchain node itself — a caller
//! supplies something implementing [`ChainClient`], the way the
//! state engine is generic over [`crate::db::NameDb`] rather than
//! owning a concrete backend. Retries/backoff on chain-client failure
//! are the caller's responsibility (spec.md §7): this trait only
//! describes the shape of a successful read.

use crate::types::ids::{Address, ScriptPubkey};

/// One transaction input, enough to recover the op's sender.
#[derive(Clone, Debug)]
pub struct RawTxInput {
    pub script_pubkey: ScriptPubkey,
    pub addresses: Vec<Address>,
    pub script_type: String,
    /// Present for p2sh inputs, to let the caller recover the
    /// embedded pubkey script for sender-script comparisons.
    pub redeem_script: Option<ScriptPubkey>,
}

/// One transaction output.
#[derive(Clone, Debug)]
pub struct RawTxOutput {
    pub value: u64,
    pub script_pubkey: ScriptPubkey,
    pub addresses: Vec<Address>,
}

/// A transaction as the chain client exposes it: enough to build a
/// [`crate::types::tx::TxContext`] and recover the op-return payload.
#[derive(Clone, Debug)]
pub struct RawTx {
    pub txid: [u8; 32],
    pub vtxindex: u32,
    pub inputs: Vec<RawTxInput>,
    pub outputs: Vec<RawTxOutput>,
    /// The raw bytes following an `OP_RETURN` in one of this
    /// transaction's outputs, if any. `None` if this transaction
    /// carries no candidate opcode payload.
    pub op_return_payload: Option<Vec<u8>>,
}

/// Number of confirmations a block must have before the engine will
/// index it (spec.md §6).
pub const CONFIRMATIONS: u64 = 6;

/// The externally-ordered, already-confirmed chain this engine reads
/// from. Implementations are expected to retry transient failures
/// with backoff rather than surface them — per spec.md §7, chain-client
/// failure never aborts the process.
pub trait ChainClient {
    type Error: std::fmt::Display;

    /// Returns `(first_block, tip - CONFIRMATIONS)`, the inclusive
    /// range of blocks currently safe to index.
    fn get_index_range(&self) -> Result<(u64, u64), Self::Error>;

    /// Returns every transaction in `block_id`, in on-chain order.
    fn tx_iter(&self, block_id: u64) -> Result<Vec<RawTx>, Self::Error>;
}
