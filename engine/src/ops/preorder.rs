//! `NAME_PREORDER` (spec.md §4.3.1).

use crate::db::{NameDb, PendingPreorder};
use crate::engine::config::ConsensusParams;
use crate::engine::consensus_hash::consensus_hash_in_window;
use crate::engine::error::{CheckError, EngineError};
use crate::types::hash::{Hash128, Hash160};
use crate::types::tx::TxContext;

/// Fields this opcode contributes to the per-block consensus serialization
/// (spec.md §4.4), grounded in the original's per-operation `FIELDS` list.
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
    if let Some(existing) = db.get_pending_preorder(&preorder_hash)? {
        if !existing.is_expired(block, params.name_preorder_expire) {
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
    // Per spec.md §4.3.1, the sender's 25-name quota is checked at
    // registration, not here — preorders do not yet name a name.
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    ctx: &TxContext,
    preorder_hash: Hash160,
) -> Result<(), EngineError> {
    let preorder = PendingPreorder {
        preorder_hash,
        sender: ctx.sender_script.clone(),
        sender_address: ctx.sender_address.clone(),
        block_number: block,
        op_fee: ctx.burn_fee.unwrap_or(0),
    };
    db.put_pending_preorder(preorder)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemDb;
    use crate::types::ids::{Address, ScriptPubkey};

    fn ctx(burn_fee: Option<u64>) -> TxContext {
        TxContext {
            block_number: 100,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: ScriptPubkey(vec![1]),
            sender_address: Address("S".into()),
            sender_pubkey: None,
            recipient_script: None,
            recipient_address: None,
            burn_fee,
            aux_update_hash: None,
        }
    }

    #[test]
    fn rejects_without_burn_fee() {
        let db = MemDb::new();
        let params = ConsensusParams::mainnet();
        let mut db_with_ch = MemDb::new();
        db_with_ch
            .put_consensus_hash(100, Hash128([0; 16]))
            .unwrap();
        let err = check(
            &db,
            &params,
            100,
            &ctx(None),
            Hash160([1; 20]),
            Hash128([0; 16]),
            &Default::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_reused_live_preorder_hash() {
        let mut db = MemDb::new();
        let params = ConsensusParams::mainnet();
        db.put_consensus_hash(100, Hash128([0; 16])).unwrap();
        db.put_pending_preorder(PendingPreorder {
            preorder_hash: Hash160([1; 20]),
            sender: ScriptPubkey(vec![1]),
            sender_address: Address("S".into()),
            block_number: 99,
            op_fee: 100,
        })
        .unwrap();
        let result = check(
            &db,
            &params,
            100,
            &ctx(Some(100)),
            Hash160([1; 20]),
            Hash128([0; 16]),
            &Default::default(),
        );
        assert_eq!(result.unwrap_err().to_string().contains("in use"), true);
    }

    #[test]
    fn accepts_expired_reused_preorder_hash() {
        let mut db = MemDb::new();
        let params = ConsensusParams::mainnet();
        db.put_consensus_hash(300, Hash128([0; 16])).unwrap();
        db.put_pending_preorder(PendingPreorder {
            preorder_hash: Hash160([1; 20]),
            sender: ScriptPubkey(vec![1]),
            sender_address: Address("S".into()),
            block_number: 0,
            op_fee: 100,
        })
        .unwrap();
        let result = check(
            &db,
            &params,
            300,
            &ctx(Some(100)),
            Hash160([1; 20]),
            Hash128([0; 16]),
            &Default::default(),
        );
        assert!(result.is_ok());
    }
}
