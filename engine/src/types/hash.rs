//! Hash primitives used throughout the wire codec and consensus chain.
//!
//! Two fixed-size digest types are used everywhere instead of naked byte
//! buffers:
//!
//! - [`Hash160`]: a 20-byte `RIPEMD160(SHA256(x))` digest, used for
//!   preorder commitments, update/value hashes, and announce hashes.
//! - [`Hash128`]: a 16-byte truncated-SHA256 digest, used for consensus
//!   hashes and the `name_hash` field bound into `NAME_UPDATE`.

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 20-byte `RIPEMD160(SHA256(data))` digest.
///
/// This is the commitment function used for preorder hashes (see the
/// `hash_name` glossary entry) and for content hashes (`update_hash`,
/// `value_hash`, `message_hash`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Hash160(pub [u8; 20]);

impl Hash160 {
    /// Computes `RIPEMD160(SHA256(data))`.
    pub fn from_data(data: &[u8]) -> Self {
        let sha = Sha256::digest(data);
        let ripe = Ripemd160::digest(sha);
        let mut out = [0u8; 20];
        out.copy_from_slice(&ripe);
        Hash160(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 20 {
            return None;
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(bytes);
        Some(Hash160(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash160({})", self.to_hex())
    }
}

impl std::fmt::Display for Hash160 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 16-byte truncated `SHA256(SHA256(data))` digest.
///
/// Blockstack-style "trunc128" hashes: take the first 16 bytes of a
/// double-SHA256 digest. Used for consensus hashes and for
/// `name_hash = trunc128(sha256(name || consensus_hash))`.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Hash128(pub [u8; 16]);

impl Hash128 {
    /// Computes `trunc128(sha256(sha256(data)))`.
    pub fn from_data(data: &[u8]) -> Self {
        let once = Sha256::digest(data);
        let twice = Sha256::digest(once);
        let mut out = [0u8; 16];
        out.copy_from_slice(&twice[..16]);
        Hash128(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 16 {
            return None;
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(bytes);
        Some(Hash128(out))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Hash128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash128({})", self.to_hex())
    }
}

impl std::fmt::Display for Hash128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Computes the preorder commitment `RIPEMD160(SHA256(name ⧺ sender_script ⧺ owner_addr))`.
///
/// Canonical byte encodings must be used: `sender_script` is the raw
/// script bytes (not hex), and `owner_addr` is the address's canonical
/// string form encoded as UTF-8. Mismatch here is a consensus-fork
/// source (see Design Notes, spec.md §9).
pub fn hash_name(name: &str, sender_script: &[u8], owner_addr: &str) -> Hash160 {
    let mut buf = Vec::with_capacity(name.len() + sender_script.len() + owner_addr.len());
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(sender_script);
    buf.extend_from_slice(owner_addr.as_bytes());
    Hash160::from_data(&buf)
}

/// Computes `name_hash128 = trunc128(sha256(sha256(name ⧺ consensus_hash)))`,
/// the binding field carried by `NAME_UPDATE`.
pub fn hash256_trunc128(name: &str, consensus_hash: Hash128) -> Hash128 {
    let mut buf = Vec::with_capacity(name.len() + 16);
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(consensus_hash.as_bytes());
    Hash128::from_data(&buf)
}

/// Computes `trunc128(sha256(sha256(name)))`, the unsalted name
/// binding carried by `NAME_TRANSFER`'s `name_hash128` field —
/// distinct from [`hash256_trunc128`], which salts with a consensus
/// hash. `NAME_TRANSFER` carries its own separate `consensus_hash`
/// field for freshness checking instead.
pub fn name_hash128(name: &str) -> Hash128 {
    Hash128::from_data(name.as_bytes())
}
