//! `NAME_REGISTRATION`, including renewal (spec.md §4.3.2).

use crate::db::{NameDb, NameRecord, NamespaceLifecycle};
use crate::engine::error::{CheckError, EngineError};
use crate::pricing::name_price;
use crate::types::hash::hash_name;
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["name"];

/// Whether this registration is a renewal (name already live and owned
/// by the sender) as opposed to a fresh registration.
pub fn is_renewal<D: NameDb>(db: &D, name: &Name, ctx: &TxContext) -> Result<bool, EngineError> {
    match db.get_name(name)? {
        Some(existing) => Ok(!existing.revoked && existing.sender.as_bytes() == ctx.sender_script.as_bytes()),
        None => Ok(false),
    }
}

pub fn check<D: NameDb>(
    db: &D,
    block: u64,
    ctx: &TxContext,
    name: &Name,
    name_preorder_expire: u64,
    max_names_per_sender: usize,
) -> Result<(), EngineError> {
    let recipient_address = ctx
        .recipient_address
        .as_ref()
        .ok_or(CheckError::NoMatchingPreorder)?;
    let preorder_hash = hash_name(name.as_str(), ctx.sender_script.as_bytes(), recipient_address.as_str());
    let preorder = db
        .get_pending_preorder(&preorder_hash)?
        .ok_or(CheckError::NoMatchingPreorder)?;
    if preorder.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NoMatchingPreorder.into());
    }
    if preorder.is_expired(block, name_preorder_expire) {
        return Err(CheckError::PreorderExpired.into());
    }

    let existing = db.get_name(name)?;
    let renewal = existing
        .as_ref()
        .map(|r| !r.revoked && r.sender.as_bytes() == ctx.sender_script.as_bytes())
        .unwrap_or(false);

    let ns_id = NamespaceId::parse(name.namespace_id()).ok_or(CheckError::NamespaceNotFound)?;
    let namespace = db
        .get_namespace(&ns_id)?
        .ok_or(CheckError::NamespaceNotFound)?;

    if !renewal {
        if namespace.lifecycle != NamespaceLifecycle::Ready {
            return Err(CheckError::NamespaceNotReady.into());
        }
        if let Some(existing) = &existing {
            if existing.is_live(block, &namespace) {
                return Err(CheckError::NameAlreadyExists.into());
            }
            if existing.revoked && !existing.expired_by_lifetime(block, &namespace) {
                return Err(CheckError::NameAlreadyExists.into());
            }
        }
        let active = db.count_active_names_for_sender(&ctx.sender_script, block)?;
        if active >= max_names_per_sender {
            return Err(CheckError::QuotaExceeded.into());
        }
    }

    let price = name_price(name.local_part(), &namespace.price_params());
    let paid = preorder.op_fee;
    if paid < price {
        return Err(CheckError::Underpayment {
            required: price,
            paid,
        }
        .into());
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
    let recipient_address = ctx
        .recipient_address
        .clone()
        .ok_or(CheckError::NoMatchingPreorder)?;
    let preorder_hash = hash_name(name.as_str(), ctx.sender_script.as_bytes(), recipient_address.as_str());
    let preorder = db
        .get_pending_preorder(&preorder_hash)?
        .ok_or(CheckError::NoMatchingPreorder)?;

    let existing = db.get_name(name)?;
    let fresh = existing.is_none();

    let record = NameRecord {
        name: name.clone(),
        preorder_hash: Some(preorder_hash),
        consensus_hash: None,
        sender: ctx.sender_script.clone(),
        address: recipient_address,
        sender_pubkey: ctx.sender_pubkey.clone(),
        value_hash: if fresh {
            None
        } else {
            existing.as_ref().and_then(|r| r.value_hash)
        },
        block_number: existing.as_ref().map(|r| r.block_number).unwrap_or(block),
        first_registered: existing.as_ref().map(|r| r.first_registered).unwrap_or(block),
        last_renewed: block,
        op_fee: preorder.op_fee,
        revoked: false,
        importer: existing.as_ref().and_then(|r| r.importer.clone()),
    };

    db.remove_pending_preorder(&preorder_hash)?;
    db.append_history(name, block, vtxindex, record.clone())?;
    db.put_name(record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemDb, NameRecord, NamespaceRecord};
    use crate::types::hash::Hash160;
    use crate::types::ids::{Address, ScriptPubkey};

    fn ctx() -> TxContext {
        TxContext {
            block_number: 111,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: ScriptPubkey(vec![1]),
            sender_address: Address("S".into()),
            sender_pubkey: None,
            recipient_script: None,
            recipient_address: Some(Address("R".into())),
            burn_fee: None,
            aux_update_hash: None,
        }
    }

    fn namespace() -> NamespaceRecord {
        NamespaceRecord {
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
        }
    }

    #[test]
    fn fresh_registration_requires_namespace_ready() {
        let mut db = MemDb::new();
        let mut ns = namespace();
        ns.lifecycle = NamespaceLifecycle::Revealed;
        db.put_namespace(ns).unwrap();

        let name = Name::parse("alice.test").unwrap();
        let c = ctx();
        let preorder_hash = hash_name(name.as_str(), c.sender_script.as_bytes(), "R");
        db.put_pending_preorder(crate::db::PendingPreorder {
            preorder_hash,
            sender: c.sender_script.clone(),
            sender_address: c.sender_address.clone(),
            block_number: 110,
            op_fee: 100_000,
        })
        .unwrap();

        let result = check(&db, 111, &c, &name, 144, 25);
        assert!(matches!(
            result.unwrap_err(),
            EngineError::Check(CheckError::NamespaceNotReady)
        ));
    }

    #[test]
    fn revoked_name_blocks_fresh_registration_until_lifetime_expires() {
        let mut db = MemDb::new();
        let mut ns = namespace();
        ns.lifetime = 100;
        db.put_namespace(ns.clone()).unwrap();

        let name = Name::parse("alice.test").unwrap();
        db.put_name(NameRecord {
            name: name.clone(),
            preorder_hash: None,
            consensus_hash: None,
            sender: ScriptPubkey(vec![9]),
            address: Address("old-owner".into()),
            sender_pubkey: None,
            value_hash: None,
            block_number: 10,
            first_registered: 10,
            last_renewed: 10,
            op_fee: 100,
            revoked: true,
            importer: None,
        })
        .unwrap();

        let c = ctx();
        let preorder_hash = hash_name(name.as_str(), c.sender_script.as_bytes(), "R");
        db.put_pending_preorder(crate::db::PendingPreorder {
            preorder_hash,
            sender: c.sender_script.clone(),
            sender_address: c.sender_address.clone(),
            block_number: c.block_number - 1,
            op_fee: 100_000,
        })
        .unwrap();

        // Still within the namespace lifetime window (10 + 100 > 111): blocked.
        let result = check(&db, 111, &c, &name, 144, 25);
        assert!(matches!(
            result.unwrap_err(),
            EngineError::Check(CheckError::NameAlreadyExists)
        ));

        // Past the lifetime window: a fresh registration is allowed.
        let result = check(&db, 200, &c, &name, 144, 25);
        assert!(result.is_ok());
    }

    #[test]
    fn fresh_registration_commits_and_consumes_preorder() {
        let mut db = MemDb::new();
        db.put_namespace(namespace()).unwrap();
        let name = Name::parse("alice.test").unwrap();
        let c = ctx();
        let preorder_hash = hash_name(name.as_str(), c.sender_script.as_bytes(), "R");
        db.put_pending_preorder(crate::db::PendingPreorder {
            preorder_hash,
            sender: c.sender_script.clone(),
            sender_address: c.sender_address.clone(),
            block_number: 110,
            op_fee: 100,
        })
        .unwrap();

        check(&db, 111, &c, &name, 144, 25).unwrap();
        commit(&mut db, 111, 0, &c, &name).unwrap();

        assert!(db.get_pending_preorder(&preorder_hash).unwrap().is_none());
        let record = db.get_name(&name).unwrap().unwrap();
        assert_eq!(record.last_renewed, 111);
        assert!(record.value_hash.is_none());
    }
}
