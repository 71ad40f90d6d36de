//! Subcommand implementations (spec.md §6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nameset_engine::{
    chain_client::ChainClient, db::RocksDb, engine::ConsensusParams, engine::StateEngine,
};

use crate::mock_chain::MockChainClient;

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Storage(nameset_engine::db::StorageError),
    Engine(nameset_engine::engine::EngineError),
    ConsensusMismatch {
        block: u64,
        expected: String,
        computed: String,
    },
    BadHash(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Json(e) => write!(f, "{e}"),
            CliError::Storage(e) => write!(f, "{e}"),
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::ConsensusMismatch {
                block,
                expected,
                computed,
            } => write!(
                f,
                "consensus mismatch at block {block}: expected {expected}, computed {computed}"
            ),
            CliError::BadHash(s) => write!(f, "not a valid consensus hash: {s}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<nameset_engine::db::StorageError> for CliError {
    fn from(e: nameset_engine::db::StorageError) -> Self {
        CliError::Storage(e)
    }
}

impl From<nameset_engine::engine::EngineError> for CliError {
    fn from(e: nameset_engine::engine::EngineError) -> Self {
        CliError::Engine(e)
    }
}

const LASTBLOCK_FILE: &str = "lastblock";
const PID_FILE: &str = "nameset.pid";
const INDEXING_FILE: &str = "indexing";

fn read_lastblock(working_dir: &Path) -> std::io::Result<Option<u64>> {
    match std::fs::read_to_string(working_dir.join(LASTBLOCK_FILE)) {
        Ok(s) => Ok(s.trim().parse().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn write_lastblock(working_dir: &Path, block: u64) -> std::io::Result<()> {
    std::fs::write(working_dir.join(LASTBLOCK_FILE), block.to_string())
}

/// Starts indexing: opens (or creates) the database under
/// `working_dir`, processes every block the chain client reports as
/// confirmed since `lastblock`, and persists `lastblock` as it goes.
///
/// Mandatory single-threaded, block-at-a-time processing (spec.md
/// §5): this loop never overlaps calls to `process_block`.
pub fn start(
    working_dir: &Path,
    foreground: bool,
    testset: bool,
    check_snapshots: Option<PathBuf>,
) -> Result<(), CliError> {
    std::fs::create_dir_all(working_dir)?;
    std::fs::write(working_dir.join(INDEXING_FILE), b"1")?;
    std::fs::write(working_dir.join(PID_FILE), std::process::id().to_string())?;

    let snapshots: HashMap<u64, String> = match &check_snapshots {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let parsed: serde_json::Value = serde_json::from_str(&raw)?;
            parsed["snapshots"]
                .as_object()
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| {
                            Some((k.parse().ok()?, v.as_str()?.to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
        None => HashMap::new(),
    };

    let params = if testset {
        ConsensusParams::testnet()
    } else {
        ConsensusParams::mainnet()
    };
    let db = RocksDb::open(working_dir.join("db"))?;
    let metrics = nameset_engine::EngineMetrics::default();
    spawn_metrics_exporter(metrics.clone());
    let mut engine = StateEngine::new(db, params).with_metrics(metrics);

    let client = MockChainClient { tip: 0 };
    let (first_block, last_safe_block) = client
        .get_index_range()
        .map_err(|e: std::convert::Infallible| match e {})?;
    let resume_from = read_lastblock(working_dir)?.map(|b| b + 1).unwrap_or(first_block);

    for block in resume_from..=last_safe_block {
        let txs = client
            .tx_iter(block)
            .map_err(|e: std::convert::Infallible| match e {})?;
        let candidates = txs.into_iter().filter_map(decode_candidate).collect();
        let result = engine.process_block(block, candidates)?;

        if let Some(expected) = snapshots.get(&block) {
            let computed = result.consensus_hash.to_hex();
            if expected != &computed {
                return Err(CliError::ConsensusMismatch {
                    block,
                    expected: expected.clone(),
                    computed,
                });
            }
        }
        write_lastblock(working_dir, block)?;
    }

    std::fs::remove_file(working_dir.join(INDEXING_FILE)).ok();

    if foreground {
        tracing::info!("caught up to tip; exiting foreground run");
    }
    Ok(())
}

/// Runs the `/metrics` HTTP endpoint on its own thread with a
/// single-threaded Tokio runtime, so `start` itself stays synchronous.
fn spawn_metrics_exporter(metrics: nameset_engine::EngineMetrics) {
    let config = nameset_engine::engine::MetricsConfig::default();
    if !config.enabled {
        return;
    }
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start metrics runtime");
                return;
            }
        };
        if let Err(e) =
            rt.block_on(nameset_engine::metrics::prometheus_exporter::serve(metrics, config.bind_addr))
        {
            tracing::error!(error = %e, "metrics exporter stopped");
        }
    });
}

fn decode_candidate(
    tx: nameset_engine::chain_client::RawTx,
) -> Option<nameset_engine::types::NameOp> {
    let payload = tx.op_return_payload?;
    let (_network, op_payload) = nameset_engine::parse_payload(&payload).ok()?;
    let sender = tx.inputs.first()?;
    let recipient = tx.outputs.first();
    let ctx = nameset_engine::types::tx::TxContext {
        block_number: 0,
        vtxindex: tx.vtxindex,
        txid: tx.txid,
        sender_script: sender.script_pubkey.clone(),
        sender_address: sender.addresses.first()?.clone(),
        sender_pubkey: None,
        recipient_script: recipient.map(|o| o.script_pubkey.clone()),
        recipient_address: recipient.and_then(|o| o.addresses.first().cloned()),
        burn_fee: None,
        aux_update_hash: None,
    };
    Some(nameset_engine::types::NameOp {
        ctx,
        payload: op_payload,
    })
}

pub fn stop(working_dir: &Path, clean: bool, kill: bool) -> Result<(), CliError> {
    let pid_path = working_dir.join(PID_FILE);
    if pid_path.exists() {
        if kill {
            tracing::warn!("kill requested; no process supervision in this build, removing pidfile only");
        }
        std::fs::remove_file(&pid_path)?;
    }
    if clean {
        std::fs::remove_file(working_dir.join(INDEXING_FILE)).ok();
    }
    Ok(())
}

pub fn reconfigure(working_dir: &Path) -> Result<(), CliError> {
    tracing::info!(?working_dir, "reconfigure requested; no running process to signal in this build");
    Ok(())
}

pub fn clean(working_dir: &Path, force: bool) -> Result<(), CliError> {
    if !force && working_dir.join(PID_FILE).exists() {
        return Err(CliError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "refusing to clean while a pidfile is present; pass --force",
        )));
    }
    if working_dir.exists() {
        std::fs::remove_dir_all(working_dir)?;
    }
    Ok(())
}

pub fn restore(working_dir: &Path, block_number: Option<u64>) -> Result<(), CliError> {
    match block_number {
        Some(block) => write_lastblock(working_dir, block)?,
        None => {
            std::fs::remove_file(working_dir.join(LASTBLOCK_FILE)).ok();
        }
    }
    Ok(())
}

pub fn rebuilddb(
    db_path: &Path,
    start_block: u64,
    end_block: u64,
    resume_dir: Option<&Path>,
) -> Result<(), CliError> {
    let resume_from = match resume_dir {
        Some(dir) => read_lastblock(dir)?.map(|b| b + 1).unwrap_or(start_block),
        None => start_block,
    };

    let db = RocksDb::open(db_path)?;
    let mut engine = StateEngine::new(db, ConsensusParams::mainnet());
    let client = MockChainClient { tip: end_block + nameset_engine::chain_client::CONFIRMATIONS };

    for block in resume_from.max(start_block)..=end_block {
        let txs = client
            .tx_iter(block)
            .map_err(|e: std::convert::Infallible| match e {})?;
        let candidates = txs.into_iter().filter_map(decode_candidate).collect();
        engine.process_block(block, candidates)?;
        if let Some(dir) = resume_dir {
            std::fs::create_dir_all(dir)?;
            write_lastblock(dir, block)?;
        }
    }
    Ok(())
}

pub fn verifydb(block_id: u64, consensus_hash: &str, db_path: &Path) -> Result<(), CliError> {
    let expected_bytes = hex::decode(consensus_hash)
        .map_err(|_| CliError::BadHash(consensus_hash.to_string()))?;
    let expected = nameset_engine::types::hash::Hash128::from_bytes(&expected_bytes)
        .ok_or_else(|| CliError::BadHash(consensus_hash.to_string()))?;

    let db = RocksDb::open(db_path)?;
    let (_records, computed) = nameset_engine::engine::snv::verify_block(&db, block_id)?;
    if computed.as_bytes() != expected.as_bytes() {
        return Err(CliError::ConsensusMismatch {
            block: block_id,
            expected: expected.to_hex(),
            computed: computed.to_hex(),
        });
    }
    println!("ok: block {block_id} matches {consensus_hash}");
    Ok(())
}

pub fn importdb(working_dir: &Path, db_path: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(working_dir)?;
    let dest = working_dir.join("db");
    if dest.exists() {
        std::fs::remove_dir_all(&dest)?;
    }
    copy_dir_recursive(db_path, &dest)?;
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let dest_path = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            std::fs::copy(entry.path(), dest_path)?;
        }
    }
    Ok(())
}
