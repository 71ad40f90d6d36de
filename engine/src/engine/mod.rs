//! The state engine: configuration, error taxonomy, the consensus-hash
//! chain, the block-processing driver, and SNV reconstruction.

pub mod config;
pub mod consensus_hash;
pub mod engine;
pub mod error;
pub mod snv;

pub use config::{ConsensusParams, DbConfig, EngineConfig, MetricsConfig};
pub use engine::{BlockResult, StateEngine};
pub use error::{CheckError, EngineError};
