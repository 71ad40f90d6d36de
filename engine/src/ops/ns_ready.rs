//! `NAMESPACE_READY` (spec.md §4.3.9).

use crate::db::{NameDb, NamespaceLifecycle};
use crate::engine::error::{CheckError, EngineError};
use crate::types::ids::NamespaceId;
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["namespace_id"];

pub fn check<D: NameDb>(
    db: &D,
    ctx: &TxContext,
    namespace_id: &NamespaceId,
) -> Result<(), EngineError> {
    let namespace = db
        .get_namespace(namespace_id)?
        .ok_or(CheckError::NamespaceNotFound)?;
    if namespace.lifecycle != NamespaceLifecycle::Revealed {
        return Err(CheckError::NamespaceNotRevealed.into());
    }
    if namespace.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NotRevealer.into());
    }
    Ok(())
}

pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    namespace_id: &NamespaceId,
) -> Result<(), EngineError> {
    let mut namespace = db
        .get_namespace(namespace_id)?
        .ok_or(CheckError::NamespaceNotFound)?;
    namespace.lifecycle = NamespaceLifecycle::Ready;
    namespace.ready_block = Some(block);
    db.put_namespace(namespace)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemDb, NamespaceRecord};
    use crate::types::hash::Hash160;
    use crate::types::ids::{Address, ScriptPubkey};

    fn setup() -> (MemDb, NamespaceId, TxContext) {
        let mut db = MemDb::new();
        let revealer = ScriptPubkey(vec![9]);
        let ns_id = NamespaceId::parse("test").unwrap();
        db.put_namespace(NamespaceRecord {
            namespace_id: ns_id.clone(),
            version: 1,
            lifetime: crate::db::NAMESPACE_LIFE_INFINITE,
            coeff: 4,
            base: 4,
            buckets: [1; 16],
            nonalpha_discount: 10,
            no_vowel_discount: 10,
            preorder_hash: Hash160([0; 20]),
            sender: revealer.clone(),
            recipient: revealer.clone(),
            address: Address("ns".into()),
            recipient_address: Address("ns".into()),
            preorder_block: 100,
            reveal_block: Some(101),
            ready_block: None,
            op_fee: 0,
            lifecycle: NamespaceLifecycle::Revealed,
        })
        .unwrap();
        let ctx = TxContext {
            block_number: 102,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: revealer,
            sender_address: Address("ns".into()),
            sender_pubkey: None,
            recipient_script: None,
            recipient_address: None,
            burn_fee: None,
            aux_update_hash: None,
        };
        (db, ns_id, ctx)
    }

    #[test]
    fn ready_transitions_lifecycle() {
        let (mut db, ns_id, ctx) = setup();
        check(&db, &ctx, &ns_id).unwrap();
        commit(&mut db, 102, &ns_id).unwrap();
        let ns = db.get_namespace(&ns_id).unwrap().unwrap();
        assert_eq!(ns.lifecycle, NamespaceLifecycle::Ready);
        assert_eq!(ns.ready_block, Some(102));
    }

    #[test]
    fn rejects_non_revealer() {
        let (db, ns_id, mut ctx) = setup();
        ctx.sender_script = ScriptPubkey(vec![0xff]);
        assert!(check(&db, &ctx, &ns_id).is_err());
    }
}
