//! Read-only ledger interface used by targeting.
//!
//! Implementations are snapshots at a fixed height: every method must return
//! the same answer for the same arguments for the lifetime of the value.

use std::collections::BTreeMap;

use coverage_core::{Height, Hex, PubkeyBin, RandState};

use crate::gateway::{Capability, GatewayInfo, GatewayMode};
use crate::vars::{capability_mask, ChainVars};

pub trait Ledger {
    fn current_height(&self) -> Height;

    fn chain_vars(&self) -> &ChainVars;

    /// Draw one hex, biased towards cells in proportion to their gateway
    /// count, returning the hex, its gateway count and the advanced state.
    ///
    /// `None` when the ledger has no populated hexes at all.
    fn draw_weighted_random_hex(&self, state: &RandState) -> Option<(Hex, u64, RandState)>;

    fn count_gateways_in_hex(&self, hex: Hex) -> u64;

    /// Gateways registered in `hex`, bucketed by sub-cell.
    fn lookup_gateways_in_hex(&self, hex: Hex) -> BTreeMap<Hex, Vec<PubkeyBin>>;

    fn find_gateway(&self, address: &PubkeyBin) -> Option<GatewayInfo>;

    /// Whether `mode` holds `capability` under the chain's capability masks.
    fn is_capability_valid(
        &self,
        mode: GatewayMode,
        capability: Capability,
    ) -> Result<bool, LedgerError> {
        let mask = capability_mask(self.chain_vars(), mode)?;
        Ok(capability.granted_by(mask))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Gateway {0} is indexed but has no ledger record")]
    GatewayNotFound(PubkeyBin),

    #[error("Duplicate gateway {0} in snapshot")]
    DuplicateGateway(PubkeyBin),

    #[error("Missing chain variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid chain variable {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
