//! `NAME_REVOKE` (spec.md §4.3.5).

use crate::db::NameDb;
use crate::engine::error::{CheckError, EngineError};
use crate::types::ids::Name;
use crate::types::tx::TxContext;

pub const SERIALIZE_FIELDS: &[&str] = &["name"];

pub fn check<D: NameDb>(db: &D, ctx: &TxContext, name: &Name) -> Result<(), EngineError> {
    let record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    if record.sender.as_bytes() != ctx.sender_script.as_bytes() {
        return Err(CheckError::NotOwner.into());
    }
    Ok(())
}

/// Revocation does not free the name for re-registration until its
/// namespace's normal expiry rule fires (spec.md §4.3.5).
pub fn commit<D: NameDb>(
    db: &mut D,
    block: u64,
    vtxindex: u32,
    name: &Name,
) -> Result<(), EngineError> {
    let mut record = db.get_name(name)?.ok_or(CheckError::NameNotFound)?;
    record.revoked = true;
    record.value_hash = None;
    db.append_history(name, block, vtxindex, record.clone())?;
    db.put_name(record)?;
    Ok(())
}
