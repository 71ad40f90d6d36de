//! An in-process stand-in for a real chain client, used by `start` and
//! `rebuilddb` in this workspace since the actual chain client is an
//! external collaborator out of this crate's scope (spec.md §1).
//!
//! Mirrors the shape a real client would have: a fixed index range and
//! an always-empty `tx_iter`. Useful for exercising the block-driver
//! loop end to end without a live node.

use nameset_engine::chain_client::{ChainClient, RawTx, CONFIRMATIONS};

pub struct MockChainClient {
    pub tip: u64,
}

impl ChainClient for MockChainClient {
    type Error = std::convert::Infallible;

    fn get_index_range(&self) -> Result<(u64, u64), Self::Error> {
        Ok((0, self.tip.saturating_sub(CONFIRMATIONS)))
    }

    fn tx_iter(&self, _block_id: u64) -> Result<Vec<RawTx>, Self::Error> {
        Ok(vec![])
    }
}
