//! Payload encoding: [`OpPayload`] → bytes. The inverse of `parse.rs`.

use crate::types::tx::{OpPayload, TransferDisposition};

use super::Network;

/// Encodes a payload with the given network's magic prefix.
pub fn encode_payload(network: Network, payload: &OpPayload) -> Vec<u8> {
    let mut out = Vec::with_capacity(40);
    out.extend_from_slice(&network.magic());
    out.push(payload.opcode_char() as u8);
    encode_body(payload, &mut out);
    out
}

/// Packs 16 nibble exponents into 8 bytes.
fn pack_buckets(buckets: &[u8; 16]) -> [u8; 8] {
    let mut packed = [0u8; 8];
    for i in 0..8 {
        packed[i] = (buckets[i * 2] << 4) | (buckets[i * 2 + 1] & 0x0f);
    }
    packed
}

fn encode_body(payload: &OpPayload, out: &mut Vec<u8>) {
    match payload {
        OpPayload::NamePreorder {
            preorder_hash,
            consensus_hash,
        } => {
            out.extend_from_slice(preorder_hash.as_bytes());
            out.extend_from_slice(consensus_hash.as_bytes());
        }
        OpPayload::NameRegistration { name } => {
            out.extend_from_slice(name.as_str().as_bytes());
        }
        OpPayload::NameUpdate {
            name_hash,
            update_hash,
        } => {
            out.extend_from_slice(name_hash.as_bytes());
            out.extend_from_slice(update_hash.as_bytes());
        }
        OpPayload::NameTransfer {
            disposition,
            name_hash128,
            consensus_hash,
        } => {
            out.push(match disposition {
                TransferDisposition::KeepData => b'>',
                TransferDisposition::DropData => b'~',
            });
            out.extend_from_slice(name_hash128.as_bytes());
            out.extend_from_slice(consensus_hash.as_bytes());
        }
        OpPayload::NameRevoke { name } => {
            out.extend_from_slice(name.as_str().as_bytes());
        }
        OpPayload::NameImport { name } => {
            out.extend_from_slice(name.as_str().as_bytes());
        }
        OpPayload::NamespacePreorder {
            preorder_hash,
            consensus_hash,
        } => {
            out.extend_from_slice(preorder_hash.as_bytes());
            out.extend_from_slice(consensus_hash.as_bytes());
        }
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
            out.extend_from_slice(&lifetime.to_be_bytes());
            out.push(*coeff);
            out.push(*base);
            out.extend_from_slice(&pack_buckets(buckets));
            out.push((nonalpha_discount << 4) | (no_vowel_discount & 0x0f));
            out.extend_from_slice(&version.to_be_bytes());
            out.extend_from_slice(namespace_id.as_str().as_bytes());
        }
        OpPayload::NamespaceReady { namespace_id } => {
            out.push(b'.');
            out.extend_from_slice(namespace_id.as_str().as_bytes());
        }
        OpPayload::Announce { message_hash } => {
            out.extend_from_slice(message_hash.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_payload;
    use crate::types::hash::{Hash128, Hash160};
    use crate::types::ids::Name;

    #[test]
    fn preorder_roundtrips_through_parse() {
        let payload = OpPayload::NamePreorder {
            preorder_hash: Hash160::from_data(b"x"),
            consensus_hash: Hash128::from_data(b"y"),
        };
        let encoded = encode_payload(Network::Testset, &payload);
        let (network, decoded) = parse_payload(&encoded).unwrap();
        assert_eq!(network, Network::Testset);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn registration_roundtrips() {
        let payload = OpPayload::NameRegistration {
            name: Name::parse("alice.test").unwrap(),
        };
        let encoded = encode_payload(Network::Mainset, &payload);
        let (_, decoded) = parse_payload(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn total_payload_length_respects_budget() {
        let payload = OpPayload::NamePreorder {
            preorder_hash: Hash160::from_data(b"x"),
            consensus_hash: Hash128::from_data(b"y"),
        };
        let encoded = encode_payload(Network::Mainset, &payload);
        assert!(encoded.len() <= super::super::MAX_PAYLOAD_LEN);
    }
}
