//! The operation tagged-variant: the ten wire opcodes plus the
//! synthetic `VIRTUAL_EXPIRE` pseudo-op emitted once per block.
//!
//! Operations are modeled as a single enum rather than a trait object
//! hierarchy: `check`/`commit` dispatch by `match` in `engine::ops`, per
//! the no-dynamic-dispatch design note.

use serde::{Deserialize, Serialize};

use super::hash::{Hash128, Hash160};
use super::ids::{Address, Name, NamespaceId, ScriptPubkey};

/// Disposition byte carried by `NAME_TRANSFER`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransferDisposition {
    /// `>` — the name keeps its current `value_hash`.
    KeepData,
    /// `~` — the name's `value_hash` is cleared.
    DropData,
}

/// Everything the codec recovers from the surrounding transaction, as
/// opposed to the opcode's own payload bytes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TxContext {
    pub block_number: u64,
    /// Index of this transaction within its block; the tie-breaker for
    /// canonical ordering within one opcode class.
    pub vtxindex: u32,
    pub txid: [u8; 32],
    /// Script and address of the first input (the op's sender).
    pub sender_script: ScriptPubkey,
    pub sender_address: Address,
    /// Recovered from a p2pkh input's signature, when possible.
    pub sender_pubkey: Option<Vec<u8>>,
    /// Script/address of the first non-OP_RETURN output, when the
    /// opcode names a recipient (transfer, reveal, import, registration).
    pub recipient_script: Option<ScriptPubkey>,
    pub recipient_address: Option<Address>,
    /// Value sent to the well-known burn address, if any.
    pub burn_fee: Option<u64>,
    /// `NAME_IMPORT`'s update hash, read from the transaction's
    /// non-OP_RETURN outputs rather than the opcode payload itself
    /// (spec.md §4.1).
    pub aux_update_hash: Option<Hash160>,
}

/// The opcode-specific payload, after wire decoding.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OpPayload {
    NamePreorder {
        preorder_hash: Hash160,
        consensus_hash: Hash128,
    },
    NameRegistration {
        name: Name,
    },
    NameUpdate {
        name_hash: Hash128,
        update_hash: Hash160,
    },
    NameTransfer {
        disposition: TransferDisposition,
        name_hash128: Hash128,
        consensus_hash: Hash128,
    },
    NameRevoke {
        name: Name,
    },
    NameImport {
        name: Name,
    },
    NamespacePreorder {
        preorder_hash: Hash160,
        consensus_hash: Hash128,
    },
    NamespaceReveal {
        namespace_id: NamespaceId,
        lifetime: u32,
        coeff: u8,
        base: u8,
        buckets: [u8; 16],
        nonalpha_discount: u8,
        no_vowel_discount: u8,
        version: u16,
    },
    NamespaceReady {
        namespace_id: NamespaceId,
    },
    Announce {
        message_hash: Hash160,
    },
}

impl OpPayload {
    /// The single-character wire opcode tag (spec.md §4.1).
    pub fn opcode_char(&self) -> char {
        match self {
            OpPayload::NamePreorder { .. } => '?',
            OpPayload::NameRegistration { .. } => ':',
            OpPayload::NameUpdate { .. } => '+',
            OpPayload::NameTransfer { .. } => '>',
            OpPayload::NameRevoke { .. } => '~',
            OpPayload::NameImport { .. } => ';',
            OpPayload::NamespacePreorder { .. } => '*',
            OpPayload::NamespaceReveal { .. } => '&',
            OpPayload::NamespaceReady { .. } => '!',
            OpPayload::Announce { .. } => '#',
        }
    }

    /// Position in the canonical per-block processing order (spec.md
    /// §4.3): lower sorts first. Used both for `check` iteration order
    /// and for the consensus-hash serialization order.
    pub fn canonical_rank(&self) -> u8 {
        match self {
            OpPayload::NamePreorder { .. } => 0,
            OpPayload::NameRevoke { .. } => 1,
            OpPayload::NameRegistration { .. } => 2,
            OpPayload::NameUpdate { .. } => 3,
            OpPayload::NameTransfer { .. } => 4,
            OpPayload::NameImport { .. } => 5,
            OpPayload::NamespacePreorder { .. } => 6,
            OpPayload::NamespaceReveal { .. } => 7,
            OpPayload::NamespaceReady { .. } => 8,
            OpPayload::Announce { .. } => 9,
        }
    }
}

/// A fully-decoded operation, ready for `check`/`commit`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NameOp {
    pub ctx: TxContext,
    pub payload: OpPayload,
}

impl NameOp {
    /// Canonical ordering key: `(canonical_rank, vtxindex)`. Ties are
    /// impossible since `vtxindex` is unique within a block.
    pub fn order_key(&self) -> (u8, u32) {
        (self.payload.canonical_rank(), self.ctx.vtxindex)
    }
}

/// Summary of one block's expirations, serialized into the consensus
/// op-stream as a synthetic pseudo-op after all real operations
/// (spec.md §4.4 step 2). Never parsed off the wire; produced only by
/// `engine::engine` at the end of block processing.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VirtualExpire {
    pub expired_names: Vec<Name>,
    pub expired_preorder_hashes: Vec<Hash160>,
    pub expired_namespace_preorder_hashes: Vec<Hash160>,
    pub expired_namespace_ids: Vec<NamespaceId>,
}

impl VirtualExpire {
    pub fn is_empty(&self) -> bool {
        self.expired_names.is_empty()
            && self.expired_preorder_hashes.is_empty()
            && self.expired_namespace_preorder_hashes.is_empty()
            && self.expired_namespace_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(vtxindex: u32) -> TxContext {
        TxContext {
            block_number: 100,
            vtxindex,
            txid: [0u8; 32],
            sender_script: ScriptPubkey(vec![0x76, 0xa9]),
            sender_address: Address("S".to_string()),
            sender_pubkey: None,
            recipient_script: None,
            recipient_address: None,
            burn_fee: None,
            aux_update_hash: None,
        }
    }

    #[test]
    fn canonical_rank_matches_spec_order() {
        let preorder = OpPayload::NamePreorder {
            preorder_hash: Hash160([0; 20]),
            consensus_hash: Hash128([0; 16]),
        };
        let revoke = OpPayload::NameRevoke {
            name: Name::parse("alice.test").unwrap(),
        };
        let announce = OpPayload::Announce {
            message_hash: Hash160([0; 20]),
        };
        assert!(preorder.canonical_rank() < revoke.canonical_rank());
        assert!(revoke.canonical_rank() < announce.canonical_rank());
    }

    #[test]
    fn order_key_breaks_ties_by_vtxindex() {
        let a = NameOp {
            ctx: ctx(5),
            payload: OpPayload::NameRevoke {
                name: Name::parse("alice.test").unwrap(),
            },
        };
        let b = NameOp {
            ctx: ctx(6),
            payload: OpPayload::NameRevoke {
                name: Name::parse("bob.test").unwrap(),
            },
        };
        assert!(a.order_key() < b.order_key());
    }

    #[test]
    fn virtual_expire_empty_detection() {
        assert!(VirtualExpire::default().is_empty());
        let mut ve = VirtualExpire::default();
        ve.expired_names.push(Name::parse("alice.test").unwrap());
        assert!(!ve.is_empty());
    }
}
