//! Current-state record types (spec.md §3.1).

use serde::{Deserialize, Serialize};

use crate::types::hash::{Hash128, Hash160};
use crate::types::ids::{Address, Name, NamespaceId, ScriptPubkey};
use crate::pricing::NamespacePriceParams;

/// Lifecycle state of a namespace (spec.md §3.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum NamespaceLifecycle {
    Preordered,
    Revealed,
    Ready,
}

/// Sentinel `lifetime` value meaning "never expires".
pub const NAMESPACE_LIFE_INFINITE: u32 = 0xffff_ffff;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamespaceRecord {
    pub namespace_id: NamespaceId,
    pub version: u16,
    pub lifetime: u32,
    pub coeff: u8,
    pub base: u8,
    pub buckets: [u8; 16],
    pub nonalpha_discount: u8,
    pub no_vowel_discount: u8,
    pub preorder_hash: Hash160,
    pub sender: ScriptPubkey,
    pub recipient: ScriptPubkey,
    pub address: Address,
    pub recipient_address: Address,
    pub preorder_block: u64,
    pub reveal_block: Option<u64>,
    pub ready_block: Option<u64>,
    pub op_fee: u64,
    pub lifecycle: NamespaceLifecycle,
}

impl NamespaceRecord {
    pub fn price_params(&self) -> NamespacePriceParams {
        NamespacePriceParams {
            coeff: self.coeff,
            base: self.base,
            buckets: self.buckets,
            nonalpha_discount: self.nonalpha_discount,
            no_vowel_discount: self.no_vowel_discount,
        }
    }

    pub fn is_infinite_lifetime(&self) -> bool {
        self.lifetime == NAMESPACE_LIFE_INFINITE
    }
}

/// A name record's full mutable state, as of some block/vtxindex.
///
/// [`crate::db::history`] stores one of these per mutation so that
/// SNV can restore any prior snapshot by linear scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameRecord {
    pub name: Name,
    pub preorder_hash: Option<Hash160>,
    pub consensus_hash: Option<Hash128>,
    pub sender: ScriptPubkey,
    pub address: Address,
    pub sender_pubkey: Option<Vec<u8>>,
    pub value_hash: Option<Hash160>,
    pub block_number: u64,
    pub first_registered: u64,
    pub last_renewed: u64,
    pub op_fee: u64,
    pub revoked: bool,
    pub importer: Option<ScriptPubkey>,
}

impl NameRecord {
    pub fn is_live(&self, current_block: u64, namespace: &NamespaceRecord) -> bool {
        if self.revoked {
            return false;
        }
        if namespace.is_infinite_lifetime() {
            return true;
        }
        current_block < self.last_renewed + namespace.lifetime as u64
    }

    /// Whether the namespace's lifetime has actually elapsed since this
    /// record's last renewal, independent of `revoked`. A revoked name
    /// stays reserved until this is true (spec.md §4.3.5): revocation
    /// alone never frees it for re-registration.
    pub fn expired_by_lifetime(&self, current_block: u64, namespace: &NamespaceRecord) -> bool {
        if namespace.is_infinite_lifetime() {
            return false;
        }
        current_block >= self.last_renewed + namespace.lifetime as u64
    }
}

/// A `NAME_PREORDER` commitment awaiting its matching registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingPreorder {
    pub preorder_hash: Hash160,
    pub sender: ScriptPubkey,
    pub sender_address: Address,
    pub block_number: u64,
    pub op_fee: u64,
}

impl PendingPreorder {
    pub fn expires_at(&self, expire_after: u64) -> u64 {
        self.block_number + expire_after
    }

    pub fn is_expired(&self, current_block: u64, expire_after: u64) -> bool {
        current_block >= self.expires_at(expire_after)
    }
}

/// A `NAMESPACE_PREORDER` commitment awaiting its matching reveal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingNamespacePreorder {
    pub preorder_hash: Hash160,
    pub sender: ScriptPubkey,
    pub sender_address: Address,
    pub block_number: u64,
    pub op_fee: u64,
}

impl PendingNamespacePreorder {
    pub fn expires_at(&self, expire_after: u64) -> u64 {
        self.block_number + expire_after
    }

    pub fn is_expired(&self, current_block: u64, expire_after: u64) -> bool {
        current_block >= self.expires_at(expire_after)
    }
}
