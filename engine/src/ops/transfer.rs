//! `NAME_TRANSFER` (spec.md §4.3.4).

use crate::db::NameDb;
use crate::engine::config::ConsensusParams;
use crate::engine::consensus_hash::consensus_hash_in_window;
use crate::engine::error::{CheckError, EngineError};
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::{TransferDisposition, TxContext};

pub const SERIALIZE_FIELDS: &[&str] = &["disposition", "name_hash128", "consensus_hash"];

pub fn check<D: NameDb>(
    db: &D,
    params: &ConsensusParams,
    block: u64,
    ctx: &TxContext,
    name: &Name,
    consensus_hash: crate::types::hash::Hash128,
) -> Result<(), EngineError> {
    let record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    if record.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NotOwner.into());
    }
    let recipient_address = ctx
        .recipient_address
        .as_ref()
        .ok_or(CheckError::NotOwner)?;
    if &record.address == recipient_address {
        return Err(CheckError::RecipientAlreadyOwns.into());
    }
    let ns_id = NamespaceId::parse(name.namespace_id()).ok_or(CheckError::NamespaceNotFound)?;
    let namespace = db
        .get_namespace(&ns_id)?
        .ok_or(CheckError::NamespaceNotFound)?;
    if !record.is_live(block, &namespace) {
        return Err(CheckError::NameNotFound.into());
    }
    let recipient_script = ctx
        .recipient_script
        .as_ref()
        .ok_or(CheckError::NotOwner)?;
    let recipient_active = db.count_active_names_for_sender(recipient_script, block)?;
    if recipient_active >= params.max_names_per_sender {
        return Err(CheckError::RecipientOverQuota.into());
    }
    if !consensus_hash_in_window(db, consensus_hash, block, params.consensus_hash_max_age)? {
        return Err(CheckError::StaleConsensusHash.into());
    }
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    vtxindex: u32,
    ctx: &TxContext,
    name: &Name,
    disposition: TransferDisposition,
    consensus_hash: crate::types::hash::Hash128,
) -> Result<(), EngineError> {
    let mut record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    record.sender = ctx
        .recipient_script
        .clone()
        .ok_or(CheckError::NotOwner)?;
    record.address = ctx
        .recipient_address
        .clone()
        .ok_or(CheckError::NotOwner)?;
    if matches!(disposition, TransferDisposition::DropData) {
        record.value_hash = None;
    }
    record.consensus_hash = Some(consensus_hash);
    db.append_history(name, block, vtxindex, record.clone())?;
    db.put_name(record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemDb, NameRecord, NamespaceLifecycle, NamespaceRecord};
    use crate::types::hash::{Hash128, Hash160};
    use crate::types::ids::{Address, ScriptPubkey};

    fn setup() -> (MemDb, Name, TxContext) {
        let mut db = MemDb::new();
        let name = Name::parse("alice.test").unwrap();
        db.put_namespace(NamespaceRecord {
            namespace_id: NamespaceId::parse("test").unwrap(),
            version: 1,
            lifetime: crate::db::NAMESPACE_LIFE_INFINITE,
            coeff: 1,
            base: 1,
            buckets: [0; 16],
            nonalpha_discount: 1,
            no_vowel_discount: 1,
            preorder_hash: Hash160([0; 20]),
            sender: ScriptPubkey(vec![]),
            recipient: ScriptPubkey(vec![]),
            address: Address("ns".into()),
            recipient_address: Address("ns".into()),
            preorder_block: 0,
            reveal_block: Some(1),
            ready_block: Some(2),
            op_fee: 0,
            lifecycle: NamespaceLifecycle::Ready,
        })
        .unwrap();
        let owner = ScriptPubkey(vec![1]);
        db.put_name(NameRecord {
            name: name.clone(),
            preorder_hash: None,
            consensus_hash: None,
            sender: owner.clone(),
            address: Address("R1".into()),
            sender_pubkey: None,
            value_hash: Some(Hash160([5; 20])),
            block_number: 129,
            first_registered: 129,
            last_renewed: 129,
            op_fee: 100,
            revoked: false,
            importer: None,
        })
        .unwrap();
        db.put_consensus_hash(129, Hash128([3; 16])).unwrap();
        let ctx = TxContext {
            block_number: 130,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: owner,
            sender_address: Address("R1".into()),
            sender_pubkey: None,
            recipient_script: Some(ScriptPubkey(vec![2])),
            recipient_address: Some(Address("R2".into())),
            burn_fee: None,
            aux_update_hash: None,
        };
        (db, name, ctx)
    }

    #[test]
    fn drop_data_clears_value_hash_and_changes_owner() {
        let (mut db, name, ctx) = setup();
        let params = ConsensusParams::mainnet();
        check(&db, &params, 130, &ctx, &name, Hash128([3; 16])).unwrap();
        commit(
            &mut db,
            130,
            0,
            &ctx,
            &name,
            TransferDisposition::DropData,
            Hash128([3; 16]),
        )
        .unwrap();

        let record = db.get_name(&name).unwrap().unwrap();
        assert_eq!(record.address.as_str(), "R2");
        assert!(record.value_hash.is_none());
        assert_eq!(record.consensus_hash, Some(Hash128([3; 16])));
    }

    #[test]
    fn keep_data_preserves_value_hash() {
        let (mut db, name, ctx) = setup();
        let params = ConsensusParams::mainnet();
        check(&db, &params, 130, &ctx, &name, Hash128([3; 16])).unwrap();
        commit(
            &mut db,
            130,
            0,
            &ctx,
            &name,
            TransferDisposition::KeepData,
            Hash128([3; 16]),
        )
        .unwrap();

        let record = db.get_name(&name).unwrap().unwrap();
        assert_eq!(record.value_hash, Some(Hash160([5; 20])));
    }
}
