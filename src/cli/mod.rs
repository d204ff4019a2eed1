use clap::{Parser, Subcommand};
use timelock::vault::Address;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod duration_parse;
pub mod replay;
pub mod txid;
pub mod version;

#[derive(Parser)]
#[command(name = "timelock")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for the timelock transaction vault", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the transaction id of a call
    Txid {
        /// Target address (0x-prefixed hex)
        #[arg(long)]
        target: Address,

        /// Entry point selector (empty for a bare value transfer)
        #[arg(long, default_value = "")]
        selector: String,

        /// Payload as UTF-8 text
        #[arg(long, default_value = "", conflicts_with = "payload_hex")]
        payload: String,

        /// Payload as hex bytes
        #[arg(long)]
        payload_hex: Option<String>,

        /// Attached value
        #[arg(long, default_value_t = 0)]
        value: u128,

        /// Earliest execution time (ledger seconds)
        #[arg(long)]
        eta: u64,
    },

    /// Write a sample replay file
    Init {
        /// Output path for the replay file
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run a replay file against an in-memory vault
    Replay {
        /// Path to the replay file
        path: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

pub fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Txid {
            target,
            selector,
            payload,
            payload_hex,
            value,
            eta,
        } => txid::execute(target, selector, payload, payload_hex, value, eta),
        Commands::Init { path, force } => replay::init(path, force),
        Commands::Replay { path, json } => replay::execute(path, json),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so stdout stays
/// clean for reports.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Already installed (e.g. by a test harness) is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
