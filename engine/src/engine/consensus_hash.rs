//! The per-block consensus-hash chain (spec.md §4.4).
//!
//! Unlike [`crate::types::hash::Hash128::from_data`] (double-SHA256,
//! used for `name_hash` commitments), the consensus chain truncates a
//! *single* SHA256 pass — the two functions are not interchangeable,
//! despite producing the same digest shape.

use sha2::{Digest, Sha256};

use crate::db::{NameDb, StorageError};
use crate::types::hash::Hash128;

/// `trunc128(sha256(data))` — single pass, as used for `ops_hash` and
/// the consensus-hash chain itself (spec.md §4.4).
pub fn trunc128_sha256(data: &[u8]) -> Hash128 {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    Hash128(out)
}

/// Hashes the block's serialized op-stream lines (each already
/// formatted `opcode_char:field,field,...` plus the trailing
/// `VIRTUAL_EXPIRE` line) into that block's `ops_hash`.
pub fn compute_ops_hash(lines: &[String]) -> Hash128 {
    trunc128_sha256(lines.join("").as_bytes())
}

/// Block offsets sampled for the geometric-lookback commitment:
/// `block-1, block-2, block-4, block-8, ...` while non-negative.
pub fn geometric_lookback_offsets(block: u64) -> Vec<u64> {
    let mut offsets = Vec::new();
    let mut step: u64 = 1;
    while step <= block {
        offsets.push(block - step);
        match step.checked_mul(2) {
            Some(next) => step = next,
            None => break,
        }
    }
    offsets
}

/// Gathers the consensus hashes at the geometric-lookback offsets for
/// `block`, substituting the zero hash for blocks with no recorded
/// consensus hash (i.e. before genesis).
pub fn sample_prior_hashes(
    db: &impl NameDb,
    block: u64,
) -> Result<Vec<Hash128>, StorageError> {
    let mut samples = Vec::new();
    for offset in geometric_lookback_offsets(block) {
        let hash = db.get_consensus_hash(offset)?.unwrap_or(Hash128([0; 16]));
        samples.push(hash);
    }
    Ok(samples)
}

/// Computes `consensus_hash[block] = trunc128(sha256(ops_hash ||
/// geometric_sample))` (spec.md §4.4 step 4).
pub fn compute_consensus_hash(ops_hash: Hash128, prior_samples: &[Hash128]) -> Hash128 {
    let mut buf = Vec::with_capacity(16 + prior_samples.len() * 16);
    buf.extend_from_slice(ops_hash.as_bytes());
    for sample in prior_samples {
        buf.extend_from_slice(sample.as_bytes());
    }
    trunc128_sha256(&buf)
}
