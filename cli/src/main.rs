//! `nameset`: the command-line node for the name-registry state engine
//! (spec.md §6).
//!
//! Subcommands against a single working directory: start/stop an
//! indexing loop, rebuild and verify the database against a trusted
//! consensus-hash snapshot.

mod commands;
mod mock_chain;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nameset", version, about = "Name-registry state engine node")]
struct Cli {
    /// Directory holding the database, lastblock file, and snapshots.
    #[arg(long, global = true, default_value = "./nameset-data")]
    working_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the indexing loop.
    Start {
        #[arg(long)]
        foreground: bool,
        #[arg(long)]
        testset: bool,
        #[arg(long, value_name = "PATH")]
        check_snapshots: Option<PathBuf>,
    },
    /// Stop a running node.
    Stop {
        #[arg(long)]
        clean: bool,
        #[arg(long)]
        kill: bool,
    },
    /// Reload configuration in a running node.
    Reconfigure,
    /// Remove all persisted state.
    Clean {
        #[arg(long)]
        force: bool,
    },
    /// Roll the database, snapshot, and lastblock files back to a checkpoint.
    Restore { block_number: Option<u64> },
    /// Replay blocks `[start_block, end_block]` into a fresh database.
    Rebuilddb {
        db_path: PathBuf,
        start_block: u64,
        end_block: u64,
        #[arg(long, value_name = "DIR")]
        resume_dir: Option<PathBuf>,
    },
    /// Verify a database's consensus hash at a block against a trusted value.
    Verifydb {
        block_id: u64,
        consensus_hash: String,
        db_path: PathBuf,
    },
    /// Import a snapshot database into the working directory.
    Importdb { db_path: PathBuf },
    /// Print version information.
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start {
            foreground,
            testset,
            check_snapshots,
        } => commands::start(&cli.working_dir, foreground, testset, check_snapshots),
        Command::Stop { clean, kill } => commands::stop(&cli.working_dir, clean, kill),
        Command::Reconfigure => commands::reconfigure(&cli.working_dir),
        Command::Clean { force } => commands::clean(&cli.working_dir, force),
        Command::Restore { block_number } => commands::restore(&cli.working_dir, block_number),
        Command::Rebuilddb {
            db_path,
            start_block,
            end_block,
            resume_dir,
        } => commands::rebuilddb(&db_path, start_block, end_block, resume_dir.as_deref()),
        Command::Verifydb {
            block_id,
            consensus_hash,
            db_path,
        } => commands::verifydb(block_id, &consensus_hash, &db_path),
        Command::Importdb { db_path } => commands::importdb(&cli.working_dir, &db_path),
        Command::Version => {
            println!("nameset {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
