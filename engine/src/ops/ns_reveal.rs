//! `NAMESPACE_REVEAL` (spec.md §4.3.8).

use crate::db::{NameDb, NamespaceLifecycle, NamespaceRecord};
use crate::engine::config::ConsensusParams;
use crate::engine::error::{CheckError, EngineError};
use crate::pricing::namespace_price;
use crate::types::hash::hash_name;
use crate::types::ids::NamespaceId;
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &[
    "namespace_id",
    "lifetime",
    "coeff",
    "base",
    "buckets",
    "nonalpha_discount",
    "no_vowel_discount",
    "version",
];

/// The implementation version this engine reveals namespaces at.
pub const NAMESPACE_VERSION: u16 = 1;

/// `namespacereveal_sanity_check` — bounds-checks reveal parameters
/// (spec.md §4.3.8).
pub fn namespacereveal_sanity_check(
    coeff: u8,
    base: u8,
    buckets: &[u8; 16],
    nonalpha_discount: u8,
    no_vowel_discount: u8,
) -> Result<(), CheckError> {
    if base == 0 {
        return Err(CheckError::SanityCheckFailed("base must be nonzero"));
    }
    if buckets.iter().any(|&b| b > 15) {
        return Err(CheckError::SanityCheckFailed("bucket exponent must be 0..15"));
    }
    if !(1..=15).contains(&nonalpha_discount) || !(1..=15).contains(&no_vowel_discount) {
        return Err(CheckError::SanityCheckFailed("discounts must be 1..15"));
    }
    let _ = coeff; // any u8 coefficient is admissible
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn check<D: NameDb>(
    db: &D,
    params: &ConsensusParams,
    block: u64,
    ctx: &TxContext,
    namespace_id: &NamespaceId,
    lifetime: u32,
    coeff: u8,
    base: u8,
    buckets: &[u8; 16],
    nonalpha_discount: u8,
    no_vowel_discount: u8,
    version: u16,
) -> Result<(), EngineError> {
    if version != NAMESPACE_VERSION {
        return Err(CheckError::SanityCheckFailed("unsupported namespace version").into());
    }
    namespacereveal_sanity_check(coeff, base, buckets, nonalpha_discount, no_vowel_discount)?;
    let _ = lifetime;

    if db.get_namespace(namespace_id)?.is_some() {
        return Err(CheckError::NamespaceAlreadyExists.into());
    }

    let reveal_addr = ctx
        .recipient_address
        .as_ref()
        .ok_or(CheckError::NoMatchingPreorder)?;
    let preorder_hash = hash_name(
        namespace_id.as_str(),
        ctx.sender_script.as_bytes(),
        reveal_addr.as_str(),
    );
    let preorder = db
        .get_pending_namespace_preorder(&preorder_hash)?
        .ok_or(CheckError::NoMatchingPreorder)?;
    if preorder.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NoMatchingPreorder.into());
    }
    if preorder.is_expired(block, params.namespace_preorder_expire) {
        return Err(CheckError::PreorderExpired.into());
    }

    let required = namespace_price(namespace_id.as_str().len(), params.testset);
    if preorder.op_fee < required {
        return Err(CheckError::Underpayment {
            required,
            paid: preorder.op_fee,
        }
        .into());
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    params: &ConsensusParams,
    ctx: &TxContext,
    namespace_id: &NamespaceId,
    lifetime: u32,
    coeff: u8,
    base: u8,
    buckets: [u8; 16],
    nonalpha_discount: u8,
    no_vowel_discount: u8,
    version: u16,
) -> Result<(), EngineError> {
    let reveal_addr = ctx
        .recipient_address
        .clone()
        .ok_or(CheckError::NoMatchingPreorder)?;
    let reveal_script = ctx
        .recipient_script
        .clone()
        .ok_or(CheckError::NoMatchingPreorder)?;
    let preorder_hash = hash_name(
        namespace_id.as_str(),
        ctx.sender_script.as_bytes(),
        reveal_addr.as_str(),
    );
    let preorder = db
        .get_pending_namespace_preorder(&preorder_hash)?
        .ok_or(CheckError::NoMatchingPreorder)?;

    db.remove_pending_namespace_preorder(&preorder_hash)?;
    db.put_namespace(NamespaceRecord {
        namespace_id: namespace_id.clone(),
        version,
        lifetime,
        coeff,
        base,
        buckets,
        nonalpha_discount,
        no_vowel_discount,
        preorder_hash,
        sender: ctx.sender_script.clone(),
        recipient: reveal_script,
        address: ctx.sender_address.clone(),
        recipient_address: reveal_addr,
        preorder_block: preorder.block_number,
        reveal_block: Some(block),
        ready_block: None,
        op_fee: preorder.op_fee,
        lifecycle: NamespaceLifecycle::Revealed,
    })?;
    let _ = params.namespace_reveal_expire; // consumed by the engine driver's expiry pass
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemDb;
    use crate::types::ids::{Address, ScriptPubkey};

    #[test]
    fn sanity_check_rejects_zero_base() {
        let err = namespacereveal_sanity_check(4, 0, &[1; 16], 10, 10).unwrap_err();
        assert!(matches!(err, CheckError::SanityCheckFailed(_)));
    }

    #[test]
    fn reveal_without_preorder_is_rejected() {
        let db = MemDb::new();
        let params = ConsensusParams::mainnet();
        let ctx = TxContext {
            block_number: 101,
            vtxindex: 0,
            txid: [0; 32],
            sender_script: ScriptPubkey(vec![1]),
            sender_address: Address("S".into()),
            sender_pubkey: None,
            recipient_script: Some(ScriptPubkey(vec![2])),
            recipient_address: Some(Address("R".into())),
            burn_fee: None,
            aux_update_hash: None,
        };
        let ns_id = NamespaceId::parse("test").unwrap();
        let result = check(
            &db, &params, 101, &ctx, &ns_id, 52596, 4, 4,
            &[1; 16], 10, 10, 1,
        );
        assert!(result.is_err());
    }
}
