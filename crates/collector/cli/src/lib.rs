//! Collector CLI - command-line interface for the Collector engine
//!
//! Gives members and relayers a terminal interface to:
//! - Compute proposal ids and description hashes
//! - Build, sign and verify EIP-712 ballots off-line
//! - Encode marketplace purchase call data
//! - Run a complete join, propose, vote, execute round in memory

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};
use collector_crypto::Eip712Domain;
use collector_types::{
    Address, BallotSignature, Calldata, DescriptionHash, ProposalId, VoteType, Wei, Word,
};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;
mod settings;

use commands::{ballot, config, proposal, simulate};
pub use error::{CliError, CliResult};
pub use settings::{CliConfig, LoggingConfig};

/// Collector CLI application
#[derive(Parser)]
#[command(name = "collector")]
#[command(about = "Collector - pooled treasury governance by signed ballot", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, global = true, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "COLLECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the engine address bound into the signing domain
    #[arg(long, global = true)]
    engine_address: Option<Address>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Compute the content-derived id of an action batch
    HashProposal {
        /// Call target, once per action
        #[arg(long = "target")]
        targets: Vec<Address>,

        /// Value in wei, once per action
        #[arg(long = "value")]
        values: Vec<Wei>,

        /// Hex call data, once per action (`0x` for none)
        #[arg(long = "payload")]
        payloads: Vec<Calldata>,

        /// Free-text description; hashed with Keccak-256
        #[arg(long)]
        description: Option<String>,

        /// Precomputed description hash
        #[arg(long)]
        description_hash: Option<DescriptionHash>,
    },

    /// Keccak-256 of a description text
    DescriptionHash {
        text: String,
    },

    /// Show the EIP-712 digest a member signs for a ballot
    BallotDigest {
        #[arg(long)]
        proposal_id: ProposalId,

        /// 0 = against, 1 = for, 2 = abstain
        #[arg(long)]
        support: u8,
    },

    /// Sign a ballot with a secp256k1 secret key
    SignBallot {
        /// Hex secret key
        #[arg(long, env = "COLLECTOR_SIGNER_KEY", hide_env_values = true)]
        key: String,

        #[arg(long)]
        proposal_id: ProposalId,

        /// 0 = against, 1 = for, 2 = abstain
        #[arg(long)]
        support: u8,
    },

    /// Recover the signer of a ballot
    Recover {
        #[arg(long)]
        proposal_id: ProposalId,

        #[arg(long)]
        support: u8,

        /// 65-byte `r ‖ s ‖ v` signature
        #[arg(long, conflicts_with_all = ["v", "r", "s"])]
        signature: Option<BallotSignature>,

        #[arg(long, requires_all = ["r", "s"])]
        v: Option<u8>,

        #[arg(long)]
        r: Option<Word>,

        #[arg(long)]
        s: Option<Word>,
    },

    /// Encode a self-call that buys an asset from a marketplace
    EncodeBuy {
        #[arg(long)]
        marketplace: Address,

        #[arg(long)]
        collection: Address,

        #[arg(long)]
        asset_id: u128,

        /// Refuse to pay more than this many wei
        #[arg(long)]
        max_price: Wei,
    },

    /// Show the resolved configuration
    Config,

    /// Run a complete round against an in-memory engine
    Simulate {
        /// Number of members that join and vote
        #[arg(long, default_value_t = 2)]
        members: usize,

        /// How every member votes
        #[arg(long, default_value = "for")]
        support: VoteType,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut settings = CliConfig::load(cli.config.as_deref())?;
    if let Some(address) = cli.engine_address {
        settings.engine_address = address;
    }

    init_tracing(cli.verbose, &settings.logging);
    debug!(engine = %settings.engine_address, chain_id = settings.engine.chain_id, "Configuration loaded");

    let domain = Eip712Domain::for_engine(&settings.engine, settings.engine_address);

    match cli.command {
        Commands::HashProposal {
            targets,
            values,
            payloads,
            description,
            description_hash,
        } => proposal::hash(targets, values, payloads, description, description_hash, cli.output),
        Commands::DescriptionHash { text } => proposal::describe(&text, cli.output),
        Commands::BallotDigest {
            proposal_id,
            support,
        } => ballot::digest(&domain, proposal_id, support, cli.output),
        Commands::SignBallot {
            key,
            proposal_id,
            support,
        } => ballot::sign(&domain, &key, proposal_id, support, cli.output),
        Commands::Recover {
            proposal_id,
            support,
            signature,
            v,
            r,
            s,
        } => {
            let signature = match (signature, v, r, s) {
                (Some(sig), _, _, _) => sig,
                (None, Some(v), Some(r), Some(s)) => BallotSignature::new(v, r, s),
                _ => {
                    return Err(CliError::InvalidArgument(
                        "pass --signature, or all of --v, --r and --s".into(),
                    ))
                }
            };
            ballot::recover(&domain, proposal_id, support, signature, cli.output)
        }
        Commands::EncodeBuy {
            marketplace,
            collection,
            asset_id,
            max_price,
        } => proposal::encode_buy(marketplace, collection, asset_id, max_price, cli.output),
        Commands::Config => config::show(&settings, cli.output),
        Commands::Simulate { members, support } => {
            simulate::run(&settings, members, support, cli.output)
        }
    }
}

/// Logs go to stderr so `-o json` output stays machine-readable
fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (plain, json) = if logging.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().without_time().with_writer(std::io::stderr)),
            None,
        )
    };

    // A subscriber may already be installed when called repeatedly in-process
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .try_init();
}
