//! Document ledger node binary.
//!
//! Transport (HTTP, consensus sockets) lives outside this binary; the
//! subcommands here initialize and inspect the persistent ledger state.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod config;
mod node;

use config::NodeConfig;
use node::Node;

/// Document ledger node.
#[derive(Parser, Debug)]
#[command(name = "ledger-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "ledger-node.toml")]
    config: PathBuf,

    /// Data directory (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the data directory and record the chain id.
    Init {
        /// Chain identifier (overrides the config file)
        #[arg(long)]
        chain_id: Option<String>,
    },
    /// Report the committed state: entry count, app hash, chain id.
    Status,
    /// Print the current commit hash.
    Hash,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut config = NodeConfig::load(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    match args.command {
        Command::Init { chain_id } => {
            if let Some(chain_id) = chain_id {
                config.chain_id = chain_id;
            }
            Node::init(&config)
        }
        Command::Status => {
            let node = Node::open_read_only(&config)?;
            node.report_status()
        }
        Command::Hash => {
            let node = Node::open_read_only(&config)?;
            println!("{}", hex::encode(node.app_hash()?));
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let level: Level = level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
