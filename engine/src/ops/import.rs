//! `NAME_IMPORT` (spec.md §4.3.6).
//!
//! The original system accepts either the revealer's own sender script
//! or a key derivable from the revealer's keyring, up to
//! `NAME_IMPORT_KEYRING_SIZE` entries. There is no HD-wallet (BIP32)
//! crate in this stack to ground a literal derivation path on, so the
//! keyring is instead derived the way this crate derives every other
//! commitment: a deterministic `RIPEMD160(SHA256(...))` chain seeded on
//! the revealer's sender script, indexed `0..NAME_IMPORT_KEYRING_SIZE`.

use crate::db::{NameDb, NameRecord, NamespaceLifecycle};
use crate::engine::config::ConsensusParams;
use crate::engine::error::{CheckError, EngineError};
use crate::types::hash::Hash160;
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["name"];

/// The `index`-th keyring entry derived from the revealer's sender
/// script: `RIPEMD160(SHA256(revealer_script || index))`.
fn derive_keyring_entry(revealer_script: &[u8], index: usize) -> Hash160 {
    let mut buf = Vec::with_capacity(revealer_script.len() + 8);
    buf.extend_from_slice(revealer_script);
    buf.extend_from_slice(&(index as u64).to_le_bytes());
    Hash160::from_data(&buf)
}

/// Whether `sender_script` is the revealer's own script or one of its
/// first `keyring_size` derived keyring entries.
fn is_authorized_importer(revealer_script: &[u8], sender_script: &[u8], keyring_size: usize) -> bool {
    if revealer_script == sender_script {
        return true;
    }
    (0..keyring_size).any(|i| derive_keyring_entry(revealer_script, i).as_bytes() == sender_script)
}

pub fn check<D: NameDb>(
    db: &D,
    params: &ConsensusParams,
    ctx: &TxContext,
    name: &Name,
) -> Result<(), EngineError> {
    let ns_id = NamespaceId::parse(name.namespace_id()).ok_or(CheckError::NamespaceNotFound)?;
    let namespace = db
        .get_namespace(&ns_id)?
        .ok_or(CheckError::NamespaceNotFound)?;
    if namespace.lifecycle != NamespaceLifecycle::Revealed {
        return Err(CheckError::NamespaceNotRevealed.into());
    }
    if !is_authorized_importer(
        namespace.sender.as_bytes(),
        ctx.sender_script.as_bytes(),
        params.name_import_keyring_size,
    ) {
        return Err(CheckError::NotRevealer.into());
    }
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    vtxindex: u32,
    ctx: &TxContext,
    name: &Name,
) -> Result<(), EngineError> {
    let recipient_script = ctx
        .recipient_script
        .clone()
        .ok_or(CheckError::NotRevealer)?;
    let recipient_address = ctx
        .recipient_address
        .clone()
        .ok_or(CheckError::NotRevealer)?;
    let existing = db.get_name(name)?;
    let record = NameRecord {
        name: name.clone(),
        preorder_hash: None,
        consensus_hash: None,
        sender: recipient_script,
        address: recipient_address,
        sender_pubkey: None,
        value_hash: ctx.aux_update_hash,
        block_number: existing.as_ref().map(|r| r.block_number).unwrap_or(block),
        first_registered: existing.as_ref().map(|r| r.first_registered).unwrap_or(block),
        last_renewed: block,
        op_fee: 0,
        revoked: false,
        importer: Some(ctx.sender_script.clone()),
    };
    db.append_history(name, block, vtxindex, record.clone())?;
    db.put_name(record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemDb, NamespaceRecord};
    use crate::types::hash::{Hash160, Hash128};
    use crate::types::ids::{Address, ScriptPubkey};

    fn setup() -> (MemDb, Name, TxContext) {
        let mut db = MemDb::new();
        let revealer = ScriptPubkey(vec![9]);
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
            sender: revealer.clone(),
            recipient: revealer.clone(),
            address: Address("ns".into()),
            recipient_address: Address("ns".into()),
            preorder_block: 0,
            reveal_block: Some(1),
            ready_block: None,
            op_fee: 0,
            lifecycle: NamespaceLifecycle::Revealed,
        })
        .unwrap();
        let name = Name::parse("alice.test").unwrap();
        let ctx = TxContext {
            block_number: 5,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: revealer,
            sender_address: Address("ns".into()),
            sender_pubkey: None,
            recipient_script: Some(ScriptPubkey(vec![1])),
            recipient_address: Some(Address("R".into())),
            burn_fee: None,
            aux_update_hash: Some(Hash160([0xcc; 20])),
        };
        (db, name, ctx)
    }

    #[test]
    fn import_requires_revealed_namespace_and_revealer_sender() {
        let (mut db, name, ctx) = setup();
        let params = ConsensusParams::mainnet();
        check(&db, &params, &ctx, &name).unwrap();
        commit(&mut db, 5, 0, &ctx, &name).unwrap();
        let record = db.get_name(&name).unwrap().unwrap();
        assert_eq!(record.value_hash, Some(Hash160([0xcc; 20])));
        assert_eq!(record.address.as_str(), "R");
    }

    #[test]
    fn rejects_non_revealer() {
        let (db, name, mut ctx) = setup();
        let params = ConsensusParams::mainnet();
        ctx.sender_script = ScriptPubkey(vec![0xff]);
        assert!(check(&db, &params, &ctx, &name).is_err());
    }

    #[test]
    fn rejects_once_namespace_is_ready() {
        let (mut db, name, ctx) = setup();
        let params = ConsensusParams::mainnet();
        let mut ns = db
            .get_namespace(&NamespaceId::parse("test").unwrap())
            .unwrap()
            .unwrap();
        ns.lifecycle = NamespaceLifecycle::Ready;
        db.put_namespace(ns).unwrap();
        assert!(check(&db, &params, &ctx, &name).is_err());
        let _ = Hash128([0; 16]);
    }

    #[test]
    fn accepts_a_derived_keyring_entry_as_importer() {
        let (db, name, mut ctx) = setup();
        let params = ConsensusParams::mainnet();
        let revealer = ScriptPubkey(vec![9]);
        let derived = derive_keyring_entry(revealer.as_bytes(), 7);
        ctx.sender_script = ScriptPubkey(derived.as_bytes().to_vec());
        check(&db, &params, &ctx, &name).unwrap();
    }

    #[test]
    fn rejects_a_script_outside_the_keyring_bound() {
        let (db, name, mut ctx) = setup();
        let mut params = ConsensusParams::mainnet();
        params.name_import_keyring_size = 3;
        let revealer = ScriptPubkey(vec![9]);
        let derived = derive_keyring_entry(revealer.as_bytes(), 10);
        ctx.sender_script = ScriptPubkey(derived.as_bytes().to_vec());
        assert!(check(&db, &params, &ctx, &name).is_err());
    }
}
