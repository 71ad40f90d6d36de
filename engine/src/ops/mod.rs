//! Per-opcode operation semantics: `check`/`commit` for each of the ten
//! wire opcodes, one module per opcode (spec.md §4.3).
//!
//! Dispatch is a plain `match` over [`crate::types::tx::OpPayload`] in
//! `engine::engine`, not a trait-object hierarchy — consistent with
//! the "no dynamic dispatch" design note.

pub mod announce;
pub mod import;
pub mod ns_preorder;
pub mod ns_ready;
pub mod ns_reveal;
pub mod preorder;
pub mod registration;
pub mod revoke;
pub mod transfer;
pub mod update;

use crate::types::tx::{NameOp, OpPayload, TransferDisposition};

/// Formats one committed operation's consensus-relevant fields into
/// the `opcode_char:field,field,...` line consumed by
/// `engine::consensus_hash` (spec.md §4.4 step 1).
///
/// Field order matches each module's `SERIALIZE_FIELDS` constant.
pub fn serialize_op_line(op: &NameOp) -> String {
    let opcode = op.payload.opcode_char();
    let fields = match &op.payload {
        OpPayload::NamePreorder {
            preorder_hash,
            consensus_hash,
        } => format!("{},{}", preorder_hash.to_hex(), consensus_hash.to_hex()),
        OpPayload::NameRegistration { name } => name.as_str().to_string(),
        OpPayload::NameUpdate {
            name_hash,
            update_hash,
        } => format!("{},{}", name_hash.to_hex(), update_hash.to_hex()),
        OpPayload::NameTransfer {
            disposition,
            name_hash128,
            consensus_hash,
        } => {
            let d = match disposition {
                TransferDisposition::KeepData => '>',
                TransferDisposition::DropData => '~',
            };
            format!("{},{},{}", d, name_hash128.to_hex(), consensus_hash.to_hex())
        }
        OpPayload::NameRevoke { name } => name.as_str().to_string(),
        OpPayload::NameImport { name } => name.as_str().to_string(),
        OpPayload::NamespacePreorder {
            preorder_hash,
            consensus_hash,
        } => format!("{},{}", preorder_hash.to_hex(), consensus_hash.to_hex()),
        OpPayload::NamespaceReveal {
            namespace_id,
            lifetime,
            coeff,
            base,
            buckets,
            nonalpha_discount,
            no_vowel_discount,
            version,
        } => {
            let bucket_str = buckets
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join("-");
            format!(
                "{},{},{},{},{},{},{},{}",
                namespace_id.as_str(),
                lifetime,
                coeff,
                base,
                bucket_str,
                nonalpha_discount,
                no_vowel_discount,
                version
            )
        }
        OpPayload::NamespaceReady { namespace_id } => namespace_id.as_str().to_string(),
        OpPayload::Announce { message_hash } => message_hash.to_hex(),
    };
    format!("{opcode}:{fields}")
}

/// Sorts operations into canonical per-block order: opcode rank, then
/// `vtxindex` (spec.md §4.3).
pub fn sort_canonical(ops: &mut [NameOp]) {
    ops.sort_by_key(|op| op.order_key());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hash::{Hash128, Hash160};
    use crate::types::ids::{Address, Name, ScriptPubkey};
    use crate::types::tx::TxContext;

    fn op(vtxindex: u32, payload: OpPayload) -> NameOp {
        NameOp {
            ctx: TxContext {
                block_number: 1,
                vtxindex,
                txid: [0; 32],
                sender_script: ScriptPubkey(vec![]),
                sender_address: Address("S".into()),
                sender_pubkey: None,
                recipient_script: None,
                recipient_address: None,
                burn_fee: None,
                aux_update_hash: None,
            },
            payload,
        }
    }

    #[test]
    fn serialize_line_starts_with_opcode_char() {
        let o = op(
            0,
            OpPayload::NameRegistration {
                name: Name::parse("alice.test").unwrap(),
            },
        );
        assert_eq!(serialize_op_line(&o), ":alice.test");
    }

    #[test]
    fn sort_canonical_orders_by_rank_then_vtxindex() {
        let mut ops = vec![
            op(
                5,
                OpPayload::Announce {
                    message_hash: Hash160([0; 20]),
                },
            ),
            op(
                1,
                OpPayload::NamePreorder {
                    preorder_hash: Hash160([1; 20]),
                    consensus_hash: Hash128([0; 16]),
                },
            ),
            op(
                0,
                OpPayload::NamePreorder {
                    preorder_hash: Hash160([2; 20]),
                    consensus_hash: Hash128([0; 16]),
                },
            ),
        ];
        sort_canonical(&mut ops);
        assert!(matches!(ops[0].payload, OpPayload::NamePreorder { .. }));
        assert_eq!(ops[0].ctx.vtxindex, 0);
        assert_eq!(ops[1].ctx.vtxindex, 1);
        assert!(matches!(ops[2].payload, OpPayload::Announce { .. }));
    }
}
