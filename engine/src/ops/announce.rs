//! `ANNOUNCE` (spec.md §4.3.10) — no state transition; the hash is
//! recorded only in the per-block consensus serialization for
//! downstream announcement resolution (an external collaborator).

use crate::types::hash::Hash160;

pub const SERIALIZE_FIELDS: &[&str] = &["message_hash"];

pub fn check(_message_hash: Hash160) -> Result<(), crate::engine::error::EngineError> {
    Ok(())
}
