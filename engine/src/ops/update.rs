//! `NAME_UPDATE` (spec.md §4.3.3).

use crate::db::NameDb;
use crate::engine::config::ConsensusParams;
use crate::engine::consensus_hash::consensus_hash_in_window;
use crate::engine::error::{CheckError, EngineError};
use crate::types::hash::{hash256_trunc128, Hash128, Hash160};
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["name_hash", "update_hash"];

pub fn check<D: NameDb>(
    db: &D,
    params: &ConsensusParams,
    block: u64,
    ctx: &TxContext,
    name: &Name,
    name_hash: Hash128,
) -> Result<(), EngineError> {
    let record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    if record.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NotOwner.into());
    }
    let ns_id = NamespaceId::parse(name.namespace_id()).ok_or(CheckError::NamespaceNotFound)?;
    let namespace = db
        .get_namespace(&ns_id)?
        .ok_or(CheckError::NamespaceNotFound)?;
    if !record.is_live(block, &namespace) {
        return Err(CheckError::NameNotFound.into());
    }

    // name_hash = trunc128(sha256(name || consensus_hash)); we don't
    // know which past consensus hash was used, so search the allowed
    // window for one that reproduces the claimed name_hash.
    let earliest = block.saturating_sub(params.consensus_hash_max_age);
    let mut matched = false;
    for b in earliest..=block {
        if let Some(ch) = db.get_consensus_hash(b)? {
            if hash256_trunc128(name.as_str(), ch).as_bytes() == name_hash.as_bytes() {
                matched = true;
                break;
            }
        }
    }
    if !matched {
        return Err(CheckError::StaleConsensusHash.into());
    }
    let _ = consensus_hash_in_window; // shared helper reused by sibling ops
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    vtxindex: u32,
    name: &Name,
    update_hash: Hash160,
) -> Result<(), EngineError> {
    let mut record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    record.value_hash = Some(update_hash);
    db.append_history(name, block, vtxindex, record.clone())?;
    db.put_name(record)?;
    Ok(())
}
