//! Protocol constants and the engine's runtime configuration.

/// Protocol-level constants (spec.md §3, §4, derived from
/// `blockstack/lib/config.py`). Carried as a struct (rather than bare
/// `const`s) so `--testset` can select a different parameter set.
#[derive(Clone, Copy, Debug)]
pub struct ConsensusParams {
    pub blocks_per_day: u64,
    pub blocks_per_year: u64,
    pub max_names_per_sender: usize,
    pub name_preorder_expire: u64,
    pub namespace_preorder_expire: u64,
    pub namespace_reveal_expire: u64,
    pub name_import_keyring_size: usize,
    pub confirmations: u64,
    /// Width of the consensus-hash age window a preorder/update/transfer
    /// may reference (resolves the spec's open question: "accept any
    /// consensus hash from the last 12 blocks").
    pub consensus_hash_max_age: u64,
    pub testset: bool,
}

impl ConsensusParams {
    pub fn mainnet() -> Self {
        ConsensusParams {
            blocks_per_day: 144,
            blocks_per_year: 52596,
            max_names_per_sender: 25,
            name_preorder_expire: 144,
            namespace_preorder_expire: 144,
            namespace_reveal_expire: 52596,
            name_import_keyring_size: 300,
            confirmations: 6,
            consensus_hash_max_age: 12,
            testset: false,
        }
    }

    pub fn testnet() -> Self {
        ConsensusParams {
            testset: true,
            ..Self::mainnet()
        }
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub path: std::path::PathBuf,
}

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub bind_addr: std::net::SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            enabled: true,
            bind_addr: ([127, 0, 0, 1], 9153).into(),
        }
    }
}

/// Aggregate configuration for one engine instance, mirroring the
/// teacher's `ChainConfig` aggregate-of-aggregates shape.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub consensus: ConsensusParams,
    pub db: DbConfig,
    pub metrics: MetricsConfig,
    pub working_dir: std::path::PathBuf,
}

impl EngineConfig {
    pub fn new(working_dir: impl Into<std::path::PathBuf>, testset: bool) -> Self {
        let working_dir = working_dir.into();
        EngineConfig {
            consensus: if testset {
                ConsensusParams::testnet()
            } else {
                ConsensusParams::mainnet()
            },
            db: DbConfig {
                path: working_dir.join("db"),
            },
            metrics: MetricsConfig::default(),
            working_dir,
        }
    }
}
