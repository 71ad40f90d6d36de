//! Payload parsing: bytes → [`OpPayload`].
//!
//! The codec is total: every input either decodes to a valid payload
//! or is rejected with a [`CodecError`]. Parse failures never touch
//! state and are logged only at trace level (spec.md §7).

use crate::types::b40::is_b40;
use crate::types::hash::{Hash128, Hash160};
use crate::types::ids::{Name, NamespaceId, NAMESPACE_ID_MAX_LEN};
use crate::types::tx::{OpPayload, TransferDisposition};

use super::{Network, MAX_PAYLOAD_LEN};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    TooShort,
    TooLong,
    BadMagic,
    UnknownOpcode(u8),
    BadLength { expected: &'static str, got: usize },
    NotBase40,
    EmptyName,
    BadDisposition(u8),
    BadNamespaceReadyMarker(u8),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::TooShort => write!(f, "payload shorter than the 3-byte prefix"),
            CodecError::TooLong => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_LEN),
            CodecError::BadMagic => write!(f, "unrecognized magic bytes"),
            CodecError::UnknownOpcode(b) => write!(f, "unknown opcode byte {:#04x}", b),
            CodecError::BadLength { expected, got } => {
                write!(f, "expected {} bytes, got {}", expected, got)
            }
            CodecError::NotBase40 => write!(f, "name contains a byte outside the base-40 alphabet"),
            CodecError::EmptyName => write!(f, "name field is empty"),
            CodecError::BadDisposition(b) => write!(f, "unrecognized disposition byte {:#04x}", b),
            CodecError::BadNamespaceReadyMarker(b) => {
                write!(f, "expected '.' marker byte, got {:#04x}", b)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Parses a raw payload (magic + opcode + body) into an [`OpPayload`].
///
/// Returns the decoded network alongside the payload, since the caller
/// (the state engine) validates it against the node's configured
/// network.
pub fn parse_payload(bytes: &[u8]) -> Result<(Network, OpPayload), CodecError> {
    if bytes.len() > MAX_PAYLOAD_LEN {
        return Err(CodecError::TooLong);
    }
    if bytes.len() < 3 {
        return Err(CodecError::TooShort);
    }
    let magic = [bytes[0], bytes[1]];
    let network = Network::from_magic(magic).ok_or(CodecError::BadMagic)?;
    let opcode = bytes[2];
    let body = &bytes[3..];

    let payload = match opcode {
        b'?' => parse_preorder(body)?,
        b':' => parse_registration(body)?,
        b'+' => parse_update(body)?,
        b'>' => parse_transfer(body)?,
        b'~' => parse_revoke(body)?,
        b';' => parse_import(body)?,
        b'*' => parse_namespace_preorder(body)?,
        b'&' => parse_namespace_reveal(body)?,
        b'!' => parse_namespace_ready(body)?,
        b'#' => parse_announce(body)?,
        other => return Err(CodecError::UnknownOpcode(other)),
    };
    Ok((network, payload))
}

fn expect_len(body: &[u8], expected: usize, label: &'static str) -> Result<(), CodecError> {
    if body.len() != expected {
        return Err(CodecError::BadLength {
            expected: label,
            got: body.len(),
        });
    }
    Ok(())
}

fn parse_name_field(body: &[u8]) -> Result<Name, CodecError> {
    if body.is_empty() {
        return Err(CodecError::EmptyName);
    }
    let s = std::str::from_utf8(body).map_err(|_| CodecError::NotBase40)?;
    if !is_b40(s) {
        return Err(CodecError::NotBase40);
    }
    Name::parse(s).ok_or(CodecError::NotBase40)
}

fn parse_preorder(body: &[u8]) -> Result<OpPayload, CodecError> {
    expect_len(body, 36, "preorder_hash(20)+consensus_hash(16)")?;
    let preorder_hash = Hash160::from_bytes(&body[0..20]).expect("length checked above");
    let consensus_hash = Hash128::from_bytes(&body[20..36]).expect("length checked above");
    Ok(OpPayload::NamePreorder {
        preorder_hash,
        consensus_hash,
    })
}

fn parse_registration(body: &[u8]) -> Result<OpPayload, CodecError> {
    Ok(OpPayload::NameRegistration {
        name: parse_name_field(body)?,
    })
}

fn parse_update(body: &[u8]) -> Result<OpPayload, CodecError> {
    expect_len(body, 36, "name_hash(16)+update_hash(20)")?;
    let name_hash = Hash128::from_bytes(&body[0..16]).expect("length checked above");
    let update_hash = Hash160::from_bytes(&body[16..36]).expect("length checked above");
    Ok(OpPayload::NameUpdate {
        name_hash,
        update_hash,
    })
}

fn parse_transfer(body: &[u8]) -> Result<OpPayload, CodecError> {
    expect_len(body, 33, "disposition(1)+name_hash128(16)+consensus_hash(16)")?;
    let disposition = match body[0] {
        b'>' => TransferDisposition::KeepData,
        b'~' => TransferDisposition::DropData,
        other => return Err(CodecError::BadDisposition(other)),
    };
    let name_hash128 = Hash128::from_bytes(&body[1..17]).expect("length checked above");
    let consensus_hash = Hash128::from_bytes(&body[17..33]).expect("length checked above");
    Ok(OpPayload::NameTransfer {
        disposition,
        name_hash128,
        consensus_hash,
    })
}

fn parse_revoke(body: &[u8]) -> Result<OpPayload, CodecError> {
    Ok(OpPayload::NameRevoke {
        name: parse_name_field(body)?,
    })
}

fn parse_import(body: &[u8]) -> Result<OpPayload, CodecError> {
    Ok(OpPayload::NameImport {
        name: parse_name_field(body)?,
    })
}

fn parse_namespace_preorder(body: &[u8]) -> Result<OpPayload, CodecError> {
    expect_len(body, 36, "preorder_hash(20)+consensus_hash(16)")?;
    let preorder_hash = Hash160::from_bytes(&body[0..20]).expect("length checked above");
    let consensus_hash = Hash128::from_bytes(&body[20..36]).expect("length checked above");
    Ok(OpPayload::NamespacePreorder {
        preorder_hash,
        consensus_hash,
    })
}

fn parse_namespace_id_field(body: &[u8]) -> Result<NamespaceId, CodecError> {
    if body.is_empty() || body.len() > NAMESPACE_ID_MAX_LEN {
        return Err(CodecError::BadLength {
            expected: "namespace_id(1..19)",
            got: body.len(),
        });
    }
    let s = std::str::from_utf8(body).map_err(|_| CodecError::NotBase40)?;
    NamespaceId::parse(s).ok_or(CodecError::NotBase40)
}

/// Unpacks 16 nibble-packed exponents from 8 bytes.
fn unpack_buckets(packed: &[u8; 8]) -> [u8; 16] {
    let mut buckets = [0u8; 16];
    for (i, byte) in packed.iter().enumerate() {
        buckets[i * 2] = byte >> 4;
        buckets[i * 2 + 1] = byte & 0x0f;
    }
    buckets
}

fn parse_namespace_reveal(body: &[u8]) -> Result<OpPayload, CodecError> {
    // lifetime(4) + coeff(1) + base(1) + buckets(8) + discounts(1) + version(2) = 17
    if body.len() <= 17 {
        return Err(CodecError::BadLength {
            expected: "lifetime(4)+coeff(1)+base(1)+buckets(8)+discounts(1)+version(2)+namespace_id(1..19)",
            got: body.len(),
        });
    }
    let lifetime = u32::from_be_bytes(body[0..4].try_into().expect("checked above"));
    let coeff = body[4];
    let base = body[5];
    let packed_buckets: [u8; 8] = body[6..14].try_into().expect("checked above");
    let buckets = unpack_buckets(&packed_buckets);
    let discounts = body[14];
    let nonalpha_discount = discounts >> 4;
    let no_vowel_discount = discounts & 0x0f;
    let version = u16::from_be_bytes(body[15..17].try_into().expect("checked above"));
    let namespace_id = parse_namespace_id_field(&body[17..])?;

    Ok(OpPayload::NamespaceReveal {
        namespace_id,
        lifetime,
        coeff,
        base,
        buckets,
        nonalpha_discount,
        no_vowel_discount,
        version,
    })
}

fn parse_namespace_ready(body: &[u8]) -> Result<OpPayload, CodecError> {
    if body.is_empty() {
        return Err(CodecError::BadLength {
            expected: "'.'(1)+namespace_id(1..19)",
            got: body.len(),
        });
    }
    if body[0] != b'.' {
        return Err(CodecError::BadNamespaceReadyMarker(body[0]));
    }
    let namespace_id = parse_namespace_id_field(&body[1..])?;
    Ok(OpPayload::NamespaceReady { namespace_id })
}

fn parse_announce(body: &[u8]) -> Result<OpPayload, CodecError> {
    expect_len(body, 20, "message_hash(20)")?;
    let message_hash = Hash160::from_bytes(body).expect("length checked above");
    Ok(OpPayload::Announce { message_hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_payload;

    fn with_prefix(opcode: u8, body: &[u8]) -> Vec<u8> {
        let mut v = vec![b'i', b'd', opcode];
        v.extend_from_slice(body);
        v
    }

    #[test]
    fn rejects_short_and_long_payloads() {
        assert_eq!(parse_payload(&[b'i', b'd']), Err(CodecError::TooShort));
        let too_long = vec![0u8; 41];
        assert_eq!(parse_payload(&too_long), Err(CodecError::TooLong));
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = with_prefix(b'#', &[0u8; 20]);
        let mut bad = bytes.clone();
        bad[0] = b'x';
        assert_eq!(parse_payload(&bad), Err(CodecError::BadMagic));
    }

    #[test]
    fn rejects_unknown_opcode() {
        let bytes = vec![b'i', b'd', b'z'];
        assert_eq!(parse_payload(&bytes), Err(CodecError::UnknownOpcode(b'z')));
    }

    #[test]
    fn announce_roundtrips() {
        let bytes = with_prefix(b'#', &[7u8; 20]);
        let (network, payload) = parse_payload(&bytes).unwrap();
        assert_eq!(network, Network::Mainset);
        assert!(matches!(payload, OpPayload::Announce { .. }));
        let encoded = encode_payload(Network::Mainset, &payload);
        assert_eq!(encoded, bytes);
    }

    #[test]
    fn registration_name_bounds() {
        // length 1 and 37 both accepted (spec.md §8 boundary cases).
        let one = with_prefix(b':', b"a");
        assert!(parse_payload(&one).is_ok());

        let thirty_seven = with_prefix(b':', &b"a".repeat(37));
        assert!(parse_payload(&thirty_seven).is_ok());

        let empty = with_prefix(b':', b"");
        assert_eq!(parse_payload(&empty), Err(CodecError::EmptyName));
    }

    #[test]
    fn transfer_disposition_roundtrip() {
        let mut body = vec![b'>'];
        body.extend_from_slice(&[1u8; 16]);
        body.extend_from_slice(&[2u8; 16]);
        let bytes = with_prefix(b'>', &body);
        let (_, payload) = parse_payload(&bytes).unwrap();
        match &payload {
            OpPayload::NameTransfer { disposition, .. } => {
                assert_eq!(*disposition, TransferDisposition::KeepData);
            }
            _ => panic!("wrong variant"),
        }
        let encoded = encode_payload(Network::Mainset, &payload);
        assert_eq!(encoded, bytes);
    }

    #[test]
    fn transfer_rejects_bad_disposition() {
        let mut body = vec![b'?'];
        body.extend_from_slice(&[0u8; 32]);
        let bytes = with_prefix(b'>', &body);
        assert_eq!(parse_payload(&bytes), Err(CodecError::BadDisposition(b'?')));
    }

    #[test]
    fn namespace_reveal_packs_and_unpacks_buckets() {
        let buckets: [u8; 16] = [6, 5, 4, 3, 3, 3, 3, 2, 2, 2, 1, 1, 1, 1, 1, 1];
        let payload = OpPayload::NamespaceReveal {
            namespace_id: NamespaceId::parse("test").unwrap(),
            lifetime: 52596,
            coeff: 4,
            base: 4,
            buckets,
            nonalpha_discount: 10,
            no_vowel_discount: 10,
            version: 1,
        };
        let encoded = encode_payload(Network::Mainset, &payload);
        let (network, decoded) = parse_payload(&encoded).unwrap();
        assert_eq!(network, Network::Mainset);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn namespace_ready_requires_dot_marker() {
        let bytes = with_prefix(b'!', b"test");
        assert_eq!(parse_payload(&bytes), Err(CodecError::BadNamespaceReadyMarker(b't')));

        let mut body = vec![b'.'];
        body.extend_from_slice(b"test");
        let bytes = with_prefix(b'!', &body);
        let (_, payload) = parse_payload(&bytes).unwrap();
        assert!(matches!(payload, OpPayload::NamespaceReady { .. }));
    }
}
