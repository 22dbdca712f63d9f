//! In-memory ledger snapshot.
//!
//! Backs the command-line tool and the test suites. Gateways are indexed by
//! targeting hex and then by sub-cell; within a sub-cell, snapshot order is
//! kept so lookups reproduce the order gateways were registered in.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coverage_core::{icdf_select, Height, Hex, PubkeyBin, RandState};

use crate::gateway::GatewayInfo;
use crate::ledger::{Ledger, LedgerError};
use crate::vars::{ChainVars, VarValue};

/// On-disk form of a ledger snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub height: Height,
    #[serde(default)]
    pub vars: ChainVars,
    #[serde(default)]
    pub gateways: Vec<GatewayInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    height: Height,
    vars: ChainVars,
    gateways: HashMap<PubkeyBin, GatewayInfo>,
    /// Registration order, for stable snapshots.
    order: Vec<PubkeyBin>,
    hexes: BTreeMap<Hex, BTreeMap<Hex, Vec<PubkeyBin>>>,
}

impl MemoryLedger {
    pub fn new(height: Height, vars: ChainVars) -> Self {
        Self {
            height,
            vars,
            ..Default::default()
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(snapshot.height, snapshot.vars);
        for gateway in snapshot.gateways {
            ledger.add_gateway(gateway)?;
        }
        Ok(ledger)
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let bytes = std::fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        let ledger = Self::from_snapshot(snapshot)?;
        info!(
            path = %path.display(),
            height = ledger.height,
            gateways = ledger.gateways.len(),
            hexes = ledger.hexes.len(),
            "Loaded ledger snapshot"
        );
        Ok(ledger)
    }

    /// Write the ledger as a JSON snapshot.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = serde_json::to_vec_pretty(&self.to_snapshot())?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved ledger snapshot");
        Ok(())
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            height: self.height,
            vars: self.vars.clone(),
            gateways: self
                .order
                .iter()
                .filter_map(|addr| self.gateways.get(addr).cloned())
                .collect(),
        }
    }

    pub fn add_gateway(&mut self, gateway: GatewayInfo) -> Result<(), LedgerError> {
        if self.gateways.contains_key(&gateway.address) {
            return Err(LedgerError::DuplicateGateway(gateway.address));
        }
        self.hexes
            .entry(gateway.location)
            .or_default()
            .entry(gateway.cell())
            .or_default()
            .push(gateway.address);
        self.order.push(gateway.address);
        self.gateways.insert(gateway.address, gateway);
        Ok(())
    }

    pub fn set_height(&mut self, height: Height) {
        self.height = height;
    }

    pub fn set_var(&mut self, name: &str, value: impl Into<VarValue>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        self.hexes.keys().copied()
    }
}

impl Ledger for MemoryLedger {
    fn current_height(&self) -> Height {
        self.height
    }

    fn chain_vars(&self) -> &ChainVars {
        &self.vars
    }

    fn draw_weighted_random_hex(&self, state: &RandState) -> Option<(Hex, u64, RandState)> {
        let population: Vec<(Hex, f64)> = self
            .hexes()
            .map(|hex| (hex, self.count_gateways_in_hex(hex) as f64))
            .filter(|(_, weight)| *weight > 0.0)
            .collect();
        let (rnd, next) = state.uniform();
        let hex = *icdf_select(&population, rnd).ok()?;
        Some((hex, self.count_gateways_in_hex(hex), next))
    }

    fn count_gateways_in_hex(&self, hex: Hex) -> u64 {
        self.hexes
            .get(&hex)
            .map(|cells| cells.values().map(|gws| gws.len() as u64).sum())
            .unwrap_or(0)
    }

    fn lookup_gateways_in_hex(&self, hex: Hex) -> BTreeMap<Hex, Vec<PubkeyBin>> {
        self.hexes.get(&hex).cloned().unwrap_or_default()
    }

    fn find_gateway(&self, address: &PubkeyBin) -> Option<GatewayInfo> {
        self.gateways.get(address).cloned()
    }
}
