//! `NAMESPACE_PREORDER` (spec.md §4.3.7) — same shape as `NAME_PREORDER`,
//! except the burn amount is checked against the namespace price table
//! rather than the name price function. Namespace length isn't known
//! until the matching reveal, so the fee floor check happens there.

use crate::db::{NameDb, PendingNamespacePreorder};
use crate::engine::config::ConsensusParams;
use crate::engine::consensus_hash::consensus_hash_in_window;
use crate::engine::error::{CheckError, EngineError};
use crate::types::hash::{Hash128, Hash160};
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["preorder_hash", "consensus_hash"];

pub fn check<D: NameDb>(
    db: &D,
    params: &ConsensusParams,
    block: u64,
    ctx: &TxContext,
    preorder_hash: Hash160,
    consensus_hash: Hash128,
    accepted_preorder_hashes: &std::collections::HashSet<Hash160>,
) -> Result<(), EngineError> {
    if accepted_preorder_hashes.contains(&preorder_hash) {
        return Err(CheckError::CollisionWithinBlock.into());
    }
    if let Some(existing) = db.get_pending_namespace_preorder(&preorder_hash)? {
        if !existing.is_expired(block, params.namespace_preorder_expire) {
            return Err(CheckError::PreorderHashInUse.into());
        }
    }
    if !consensus_hash_in_window(db, consensus_hash, block, params.consensus_hash_max_age)? {
        return Err(CheckError::StaleConsensusHash.into());
    }
    if ctx.burn_fee.is_none() {
        return Err(CheckError::Underpayment {
            required: 1,
            paid: 0,
        }
        .into());
    }
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    ctx: &TxContext,
    preorder_hash: Hash160,
) -> Result<(), EngineError> {
    db.put_pending_namespace_preorder(PendingNamespacePreorder {
        preorder_hash,
        sender: ctx.sender_script.clone(),
        sender_address: ctx.sender_address.clone(),
        block_number: block,
        op_fee: ctx.burn_fee.unwrap_or(0),
    })?;
    Ok(())
}
