//! The state-engine driver: for each block, order operations, check
//! and commit the accepted ones, expire stale records, compute that
//! block's consensus hash, and persist (spec.md §4.3, §4.4, §5).

use tracing::{debug, error, trace};

use crate::db::{NameDb, NamespaceLifecycle};
use crate::metrics::EngineMetrics;
use crate::ops;
use crate::types::hash::Hash128;
use crate::types::ids::{Name, NamespaceId};
use crate::types::tx::{NameOp, OpPayload, VirtualExpire};

use super::config::ConsensusParams;
use super::consensus_hash::{compute_consensus_hash, compute_ops_hash, sample_prior_hashes};
use super::error::EngineError;

/// Result of processing one block: the accepted ops (in canonical
/// order, for `get_records_at`) and the resulting consensus hash.
pub struct BlockResult {
    pub accepted: Vec<NameOp>,
    pub expirations: VirtualExpire,
    pub consensus_hash: Hash128,
}

pub struct StateEngine<D: NameDb> {
    pub db: D,
    pub params: ConsensusParams,
    metrics: Option<EngineMetrics>,
}

impl<D: NameDb> StateEngine<D> {
    pub fn new(db: D, params: ConsensusParams) -> Self {
        StateEngine {
            db,
            params,
            metrics: None,
        }
    }

    /// Attaches a metrics sink: subsequent `process_block` calls record
    /// per-opcode accept/reject counters and refresh the active-name
    /// and active-namespace gauges.
    pub fn with_metrics(mut self, metrics: EngineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Processes one block's candidate operations (already parsed off
    /// the wire) to completion: checked, committed, expired, hashed,
    /// and persisted. Mandatory single-threaded, block-at-a-time
    /// sequencing (spec.md §5) — callers must not call this
    /// concurrently for overlapping block ranges.
    pub fn process_block(
        &mut self,
        block: u64,
        mut candidates: Vec<NameOp>,
    ) -> Result<BlockResult, EngineError> {
        ops::sort_canonical(&mut candidates);

        let mut accepted = Vec::new();
        let mut accepted_preorder_hashes = std::collections::HashSet::new();
        let mut accepted_namespace_preorder_hashes = std::collections::HashSet::new();

        for op in candidates {
            let opcode = op.payload.opcode_char();
            match self.check_and_commit(
                block,
                &op,
                &accepted_preorder_hashes,
                &accepted_namespace_preorder_hashes,
            ) {
                Ok(()) => {
                    trace!(block, opcode = %opcode, "committed operation");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_accepted(opcode);
                    }
                    match &op.payload {
                        OpPayload::NamePreorder { preorder_hash, .. } => {
                            accepted_preorder_hashes.insert(*preorder_hash);
                        }
                        OpPayload::NamespacePreorder { preorder_hash, .. } => {
                            accepted_namespace_preorder_hashes.insert(*preorder_hash);
                        }
                        _ => {}
                    }
                    accepted.push(op);
                }
                Err(EngineError::Check(reason)) => {
                    debug!(block, opcode = %opcode, %reason, "rejected operation");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_rejected(opcode);
                    }
                }
                Err(e) => {
                    error!(block, error = %e, "persistence failure while committing operation");
                    return Err(e);
                }
            }
        }

        let expirations = self.expire_stale_records(block)?;

        if let Some(metrics) = &self.metrics {
            metrics
                .active_names
                .set(self.db.all_name_keys()?.len() as i64);
            metrics
                .active_namespaces
                .set(self.db.all_namespace_keys()?.len() as i64);
        }

        let mut lines: Vec<String> = accepted.iter().map(ops::serialize_op_line).collect();
        if !expirations.is_empty() {
            lines.push(serialize_virtual_expire(&expirations));
        }
        let ops_hash = compute_ops_hash(&lines);
        let prior_samples = sample_prior_hashes(&self.db, block)?;
        let consensus_hash = compute_consensus_hash(ops_hash, &prior_samples);

        self.db.put_consensus_hash(block, consensus_hash)?;
        self.db.put_block_records(block, accepted.clone())?;
        self.db.set_last_block(block)?;

        Ok(BlockResult {
            accepted,
            expirations,
            consensus_hash,
        })
    }

    fn check_and_commit(
        &mut self,
        block: u64,
        op: &NameOp,
        accepted_preorder_hashes: &std::collections::HashSet<crate::types::hash::Hash160>,
        accepted_namespace_preorder_hashes: &std::collections::HashSet<crate::types::hash::Hash160>,
    ) -> Result<(), EngineError> {
        let ctx = &op.ctx;
        match &op.payload {
            OpPayload::NamePreorder {
                preorder_hash,
                consensus_hash,
            } => {
                ops::preorder::check(
                    &self.db,
                    &self.params,
                    block,
                    ctx,
                    *preorder_hash,
                    *consensus_hash,
                    accepted_preorder_hashes,
                )?;
                ops::preorder::commit(&mut self.db, block, ctx, *preorder_hash)
            }
            OpPayload::NameRegistration { name } => {
                ops::registration::check(
                    &self.db,
                    block,
                    ctx,
                    name,
                    self.params.name_preorder_expire,
                    self.params.max_names_per_sender,
                )?;
                ops::registration::commit(&mut self.db, block, ctx.vtxindex, ctx, name)
            }
            OpPayload::NameUpdate {
                name_hash,
                update_hash,
            } => {
                let name = self.name_for_update(ctx, *name_hash)?;
                ops::update::check(&self.db, &self.params, block, ctx, &name, *name_hash)?;
                ops::update::commit(&mut self.db, block, ctx.vtxindex, &name, *update_hash)
            }
            OpPayload::NameTransfer {
                disposition,
                name_hash128,
                consensus_hash,
            } => {
                let name = self.name_for_transfer(*name_hash128)?;
                ops::transfer::check(&self.db, &self.params, block, ctx, &name, *consensus_hash)?;
                ops::transfer::commit(
                    &mut self.db,
                    block,
                    ctx.vtxindex,
                    ctx,
                    &name,
                    *disposition,
                    *consensus_hash,
                )
            }
            OpPayload::NameRevoke { name } => {
                ops::revoke::check(&self.db, ctx, name)?;
                ops::revoke::commit(&mut self.db, block, ctx.vtxindex, name)
            }
            OpPayload::NameImport { name } => {
                ops::import::check(&self.db, &self.params, ctx, name)?;
                ops::import::commit(&mut self.db, block, ctx.vtxindex, ctx, name)
            }
            OpPayload::NamespacePreorder {
                preorder_hash,
                consensus_hash,
            } => {
                ops::ns_preorder::check(
                    &self.db,
                    &self.params,
                    block,
                    ctx,
                    *preorder_hash,
                    *consensus_hash,
                    accepted_namespace_preorder_hashes,
                )?;
                ops::ns_preorder::commit(&mut self.db, block, ctx, *preorder_hash)
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
                ops::ns_reveal::check(
                    &self.db,
                    &self.params,
                    block,
                    ctx,
                    namespace_id,
                    *lifetime,
                    *coeff,
                    *base,
                    buckets,
                    *nonalpha_discount,
                    *no_vowel_discount,
                    *version,
                )?;
                ops::ns_reveal::commit(
                    &mut self.db,
                    block,
                    &self.params,
                    ctx,
                    namespace_id,
                    *lifetime,
                    *coeff,
                    *base,
                    *buckets,
                    *nonalpha_discount,
                    *no_vowel_discount,
                    *version,
                )
            }
            OpPayload::NamespaceReady { namespace_id } => {
                ops::ns_ready::check(&self.db, ctx, namespace_id)?;
                ops::ns_ready::commit(&mut self.db, block, namespace_id)
            }
            OpPayload::Announce { message_hash } => ops::announce::check(*message_hash),
        }
    }

    /// `NAME_UPDATE` carries `name_hash = trunc128(name || consensus_hash)`
    /// rather than the name itself; resolve it by scanning live names
    /// owned by the sender (bounded by the 25-name quota).
    fn name_for_update(
        &self,
        ctx: &crate::types::tx::TxContext,
        name_hash: Hash128,
    ) -> Result<Name, EngineError> {
        for name in self.db.names_owned_by_address(&ctx.sender_address)? {
            for b in block_window(ctx.block_number, self.params.consensus_hash_max_age) {
                if let Some(ch) = self.db.get_consensus_hash(b)? {
                    if crate::types::hash::hash256_trunc128(name.as_str(), ch).as_bytes()
                        == name_hash.as_bytes()
                    {
                        return Ok(name);
                    }
                }
            }
        }
        Err(super::error::CheckError::NameNotFound.into())
    }

    fn name_for_transfer(&self, name_hash128: Hash128) -> Result<Name, EngineError> {
        for name in self.db.all_name_keys()? {
            if crate::types::hash::name_hash128(name.as_str()).as_bytes()
                == name_hash128.as_bytes()
            {
                return Ok(name);
            }
        }
        Err(super::error::CheckError::NameNotFound.into())
    }

    fn expire_stale_records(&mut self, block: u64) -> Result<VirtualExpire, EngineError> {
        let mut expired_names = Vec::new();
        let mut expired_preorder_hashes = Vec::new();
        let mut expired_namespace_preorder_hashes = Vec::new();
        let mut expired_namespace_ids = Vec::new();

        for preorder in self.db.all_pending_preorders()? {
            if preorder.is_expired(block, self.params.name_preorder_expire) {
                expired_preorder_hashes.push(preorder.preorder_hash);
                self.db.remove_pending_preorder(&preorder.preorder_hash)?;
            }
        }
        for preorder in self.db.all_pending_namespace_preorders()? {
            if preorder.is_expired(block, self.params.namespace_preorder_expire) {
                expired_namespace_preorder_hashes.push(preorder.preorder_hash);
                self.db
                    .remove_pending_namespace_preorder(&preorder.preorder_hash)?;
            }
        }

        let mut namespace_ids = self.db.all_namespace_keys()?;
        namespace_ids.sort();
        for ns_id in namespace_ids {
            if let Some(ns) = self.db.get_namespace(&ns_id)? {
                if ns.lifecycle == NamespaceLifecycle::Revealed {
                    let reveal_block = ns.reveal_block.unwrap_or(ns.preorder_block);
                    if block >= reveal_block + self.params.namespace_reveal_expire {
                        expired_namespace_ids.push(ns_id);
                    }
                }
            }
        }

        let mut names = self.db.all_name_keys()?;
        names.sort();
        for name in names {
            let Some(record) = self.db.get_name(&name)? else {
                continue;
            };
            let Some(ns_id) = NamespaceId::parse(name.namespace_id()) else {
                continue;
            };
            let Some(ns) = self.db.get_namespace(&ns_id)? else {
                continue;
            };
            if !record.is_live(block, &ns) && !record.revoked {
                expired_names.push(name.clone());
                self.db.remove_name(&name)?;
            }
        }

        Ok(VirtualExpire {
            expired_names,
            expired_preorder_hashes,
            expired_namespace_preorder_hashes,
            expired_namespace_ids,
        })
    }
}

fn block_window(block: u64, max_age: u64) -> impl Iterator<Item = u64> {
    let earliest = block.saturating_sub(max_age);
    earliest..=block
}

/// Formats the synthetic `VIRTUAL_EXPIRE` pseudo-op line (spec.md
/// §4.4 step 2).
fn serialize_virtual_expire(expirations: &VirtualExpire) -> String {
    format!(
        "VIRTUAL_EXPIRE:{},{},{},{},{},{}",
        expirations.expired_names.len(),
        expirations
            .expired_names
            .iter()
            .map(|n| n.as_str().to_string())
            .collect::<Vec<_>>()
            .join("-"),
        expirations
            .expired_preorder_hashes
            .iter()
            .map(|h| h.to_hex())
            .collect::<Vec<_>>()
            .join("-"),
        expirations.expired_namespace_preorder_hashes.len(),
        expirations
            .expired_namespace_preorder_hashes
            .iter()
            .map(|h| h.to_hex())
            .collect::<Vec<_>>()
            .join("-"),
        expirations
            .expired_namespace_ids
            .iter()
            .map(|n| n.as_str().to_string())
            .collect::<Vec<_>>()
            .join("-"),
    )
}
