//! Select a Proof-of-Coverage challengee from a ledger snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use coverage_core::PubkeyBin;
use coverage_crypto::GatewayIdentity;
use coverage_ledger::MemoryLedger;
use coverage_node::selection::{load_config, run_selection};

/// Command-line configuration.
#[derive(Debug, Clone, Default)]
struct CliConfig {
    /// Path to the JSON ledger snapshot.
    snapshot_path: Option<PathBuf>,
    /// Path to the targeting config (JSON).
    config_path: Option<PathBuf>,
    /// Path to the challenger's identity key file.
    identity_path: Option<PathBuf>,
    /// Challenger address, overrides the identity file.
    challenger: Option<String>,
    /// Hex-encoded challenge entropy (block hash).
    entropy: Option<String>,
}

fn parse_args() -> CliConfig {
    let mut config = CliConfig::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--snapshot" | "-s" => {
                config.snapshot_path = args.next().map(PathBuf::from);
            }
            "--config" | "-c" => {
                config.config_path = args.next().map(PathBuf::from);
            }
            "--identity" | "-i" => {
                config.identity_path = args.next().map(PathBuf::from);
            }
            "--challenger" => {
                config.challenger = args.next();
            }
            "--entropy" | "-e" => {
                config.entropy = args.next();
            }
            "--help" | "-h" => {
                eprintln!("PoC target selection");
                eprintln!();
                eprintln!("USAGE:");
                eprintln!("  coverage-node --snapshot <PATH> --entropy <HEX> [OPTIONS]");
                eprintln!();
                eprintln!("OPTIONS:");
                eprintln!("  -s, --snapshot <PATH>    Ledger snapshot (JSON)");
                eprintln!("  -e, --entropy <HEX>      Challenge entropy, hex-encoded");
                eprintln!("  -c, --config <PATH>      Targeting config (JSON)");
                eprintln!("  -i, --identity <PATH>    Challenger key file (32-byte seed)");
                eprintln!("  --challenger <ADDR>      Challenger address, hex-encoded");
                eprintln!("  -h, --help               Show this help");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

fn load_challenger(config: &CliConfig) -> Result<PubkeyBin> {
    if let Some(addr) = &config.challenger {
        return addr
            .parse()
            .with_context(|| format!("Invalid challenger address {addr}"));
    }

    let identity = if let Some(path) = &config.identity_path {
        if path.exists() {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read identity from {}", path.display()))?;
            let seed: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("Identity file must be exactly 32 bytes"))?;
            let id = GatewayIdentity::from_seed(&seed);
            info!(challenger = %id.address(), path = %path.display(), "Loaded identity");
            id
        } else {
            let id = GatewayIdentity::generate();
            std::fs::write(path, id.seed_bytes())
                .with_context(|| format!("Failed to write identity to {}", path.display()))?;
            info!(challenger = %id.address(), path = %path.display(), "Generated new identity");
            id
        }
    } else {
        let id = GatewayIdentity::generate();
        info!(challenger = %id.address(), "Generated ephemeral identity (use --identity to persist)");
        id
    };

    Ok(identity.address())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,coverage=debug".into()),
        )
        .init();

    let config = parse_args();

    let snapshot_path = config
        .snapshot_path
        .clone()
        .context("--snapshot is required")?;
    let entropy = config.entropy.as_deref().context("--entropy is required")?;
    let entropy = hex::decode(entropy).context("--entropy must be hex-encoded")?;

    let targeting = load_config(config.config_path.as_deref())?;
    let challenger = load_challenger(&config)?;
    let ledger = MemoryLedger::load(&snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;

    match run_selection(&ledger, &targeting, &challenger, &entropy)? {
        Some(selection) => println!("{}", serde_json::to_string_pretty(&selection)?),
        None => println!("null"),
    }

    Ok(())
}
