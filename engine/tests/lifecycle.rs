//! End-to-end coverage of a full namespace + name lifecycle against the
//! public API, mirroring the testable properties in spec.md §8.

use nameset_engine::db::{MemDb, NameDb};
use nameset_engine::engine::{ConsensusParams, StateEngine};
use nameset_engine::types::hash::{hash_name, Hash128};
use nameset_engine::types::ids::{Address, Name, NamespaceId, ScriptPubkey};
use nameset_engine::types::tx::TxContext;
use nameset_engine::types::{NameOp, OpPayload};

fn ctx(block: u64, vtxindex: u32, sender: u8, recipient: Option<(u8, &str)>) -> TxContext {
    TxContext {
        block_number: block,
        vtxindex,
        txid: [0; 32],
        sender_script: ScriptPubkey(vec![sender]),
        sender_address: Address(format!("sender-{sender}")),
        sender_pubkey: None,
        recipient_script: recipient.map(|(b, _)| ScriptPubkey(vec![b])),
        recipient_address: recipient.map(|(_, a)| Address(a.to_string())),
        burn_fee: None,
        aux_update_hash: None,
    }
}

#[test]
fn namespace_then_name_registration_round_trip_and_verifies_via_snv() {
    let mut engine = StateEngine::new(MemDb::new(), ConsensusParams::mainnet());
    let ns_id = NamespaceId::parse("reg").unwrap();

    let ns_preorder_hash = hash_name("reg", &[9], "owner-9");
    engine
        .process_block(
            200,
            vec![NameOp {
                ctx: ctx(200, 0, 9, Some((9, "owner-9"))),
                payload: OpPayload::NamespacePreorder {
                    preorder_hash: ns_preorder_hash,
                    consensus_hash: Hash128([0; 16]),
                },
            }],
        )
        .unwrap();

    engine
        .process_block(
            201,
            vec![NameOp {
                ctx: ctx(201, 0, 9, Some((9, "owner-9"))),
                payload: OpPayload::NamespaceReveal {
                    namespace_id: ns_id.clone(),
                    lifetime: nameset_engine::db::NAMESPACE_LIFE_INFINITE,
                    coeff: 4,
                    base: 4,
                    buckets: [6, 5, 4, 3, 3, 3, 3, 2, 2, 2, 1, 1, 1, 1, 1, 1],
                    nonalpha_discount: 10,
                    no_vowel_discount: 10,
                    version: 1,
                },
            }],
        )
        .unwrap();

    engine
        .process_block(
            202,
            vec![NameOp {
                ctx: ctx(202, 0, 9, None),
                payload: OpPayload::NamespaceReady {
                    namespace_id: ns_id.clone(),
                },
            }],
        )
        .unwrap();

    let name = Name::parse("alice.reg").unwrap();
    let name_preorder_hash = hash_name(name.as_str(), &[1], "owner-1");
    let consensus_at_202 = engine.db.get_consensus_hash(202).unwrap().unwrap();

    engine
        .process_block(
            203,
            vec![NameOp {
                ctx: ctx(203, 0, 1, Some((1, "owner-1"))),
                payload: OpPayload::NamePreorder {
                    preorder_hash: name_preorder_hash,
                    consensus_hash: consensus_at_202,
                },
            }],
        )
        .unwrap();

    let result = engine
        .process_block(
            204,
            vec![NameOp {
                ctx: ctx(204, 0, 1, Some((1, "owner-1"))),
                payload: OpPayload::NameRegistration { name: name.clone() },
            }],
        )
        .unwrap();
    assert_eq!(result.accepted.len(), 1);

    let record = engine.db.get_name(&name).unwrap().unwrap();
    assert_eq!(record.address, Address("owner-1".to_string()));
    assert!(!record.revoked);

    let (snv_records, computed) = nameset_engine::engine::snv::verify_block(&engine.db, 204).unwrap();
    assert_eq!(snv_records.len(), 1);
    assert_eq!(computed.as_bytes(), result.consensus_hash.as_bytes());
}

#[test]
fn quota_is_enforced_at_registration_not_preorder() {
    let mut engine = StateEngine::new(MemDb::new(), ConsensusParams::mainnet());
    let ns_id = NamespaceId::parse("q").unwrap();

    let ns_preorder_hash = hash_name("q", &[3], "owner-3");
    engine
        .process_block(
            300,
            vec![NameOp {
                ctx: ctx(300, 0, 3, Some((3, "owner-3"))),
                payload: OpPayload::NamespacePreorder {
                    preorder_hash: ns_preorder_hash,
                    consensus_hash: Hash128([0; 16]),
                },
            }],
        )
        .unwrap();
    engine
        .process_block(
            301,
            vec![NameOp {
                ctx: ctx(301, 0, 3, Some((3, "owner-3"))),
                payload: OpPayload::NamespaceReveal {
                    namespace_id: ns_id.clone(),
                    lifetime: nameset_engine::db::NAMESPACE_LIFE_INFINITE,
                    coeff: 1,
                    base: 1,
                    buckets: [0; 16],
                    nonalpha_discount: 1,
                    no_vowel_discount: 1,
                    version: 1,
                },
            }],
        )
        .unwrap();
    engine
        .process_block(
            302,
            vec![NameOp {
                ctx: ctx(302, 0, 3, None),
                payload: OpPayload::NamespaceReady {
                    namespace_id: ns_id.clone(),
                },
            }],
        )
        .unwrap();

    // A preorder with no matching registration never touches the quota:
    // preordering 26 names (over the 25-name cap) should all succeed.
    let mut preorder_ops = Vec::new();
    for i in 0..26u8 {
        let dummy_name = format!("name{i}.q");
        let preorder_hash = hash_name(&dummy_name, &[10], "owner-10");
        preorder_ops.push(NameOp {
            ctx: ctx(310, i as u32, 10, Some((10, "owner-10"))),
            payload: OpPayload::NamePreorder {
                preorder_hash,
                consensus_hash: engine.db.get_consensus_hash(302).unwrap().unwrap(),
            },
        });
    }
    let result = engine.process_block(310, preorder_ops).unwrap();
    assert_eq!(result.accepted.len(), 26);
}
