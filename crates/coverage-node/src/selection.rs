//! One target selection over a loaded snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use coverage_core::{Height, PubkeyBin};
use coverage_crypto::challenge_streams;
use coverage_ledger::{Ledger, Vars};
use coverage_targeting::{TargetError, Targeter, TargetingConfig};

/// Outcome of a successful selection, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub height: Height,
    pub challenger: PubkeyBin,
    pub challengee: PubkeyBin,
}

/// Load targeting settings, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<TargetingConfig> {
    let Some(path) = path else {
        return Ok(TargetingConfig::default());
    };
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid targeting config in {}", path.display()))
}

/// Select a challengee for `challenger` using block `entropy`.
///
/// An empty pool is the normal "nothing to challenge" outcome and yields
/// `Ok(None)`; every other failure is an error.
pub fn run_selection<L: Ledger + ?Sized>(
    ledger: &L,
    config: &TargetingConfig,
    challenger: &PubkeyBin,
    entropy: &[u8],
) -> Result<Option<Selection>> {
    let vars = Vars::from_chain_vars(ledger.chain_vars()).context("Invalid chain variables")?;
    let streams = challenge_streams(entropy, challenger);
    let targeter = Targeter::new(config);

    match targeter.select_target(challenger, &streams.target, &streams.zone, ledger, &vars) {
        Ok((challengee, _)) => {
            info!(%challenger, %challengee, "Challenge target chosen");
            Ok(Some(Selection {
                height: ledger.current_height(),
                challenger: *challenger,
                challengee,
            }))
        }
        Err(TargetError::EmptyPool) => {
            warn!(%challenger, "No eligible target, skipping challenge");
            Ok(None)
        }
        Err(e) => Err(anyhow::Error::new(e).context("Target selection failed")),
    }
}
