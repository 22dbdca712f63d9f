//! Scriptable ledger for unit tests.
//!
//! Unlike `MemoryLedger`, the hex oracle here draws uniformly over every
//! registered hex, including empty ones, so the sampler's discard paths get
//! exercised.

use std::collections::{BTreeMap, HashMap};

use coverage_core::constants::*;
use coverage_core::{Height, Hex, PubkeyBin, RandState};
use coverage_crypto::GatewayIdentity;
use coverage_ledger::{ChainVars, GatewayInfo, GatewayMode, Ledger, VarValue, Vars};

pub(crate) fn addr(n: u8) -> PubkeyBin {
    GatewayIdentity::from_seed(&[n; 32]).address()
}

pub(crate) fn state(label: &str) -> RandState {
    RandState::from_hash(label.as_bytes())
}

#[derive(Debug, Clone)]
pub(crate) struct FakeLedger {
    height: Height,
    vars: ChainVars,
    hexes: BTreeMap<Hex, Vec<PubkeyBin>>,
    gateways: HashMap<PubkeyBin, GatewayInfo>,
}

impl FakeLedger {
    pub(crate) fn new() -> Self {
        let mut vars = ChainVars::new();
        vars.insert(POC_TARGET_POOL_SIZE.into(), VarValue::Int(2));
        vars.insert(POC_V4_PROB_RANDOMNESS_WT.into(), VarValue::Float(1.0));
        Self {
            height: 1_000,
            vars,
            hexes: BTreeMap::new(),
            gateways: HashMap::new(),
        }
    }

    pub(crate) fn var(mut self, name: &str, value: impl Into<VarValue>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Register `hex` with the given gateways (possibly none).
    pub(crate) fn hex(mut self, hex: Hex, gateways: &[(PubkeyBin, GatewayMode)]) -> Self {
        let entry = self.hexes.entry(hex).or_default();
        for (address, mode) in gateways {
            entry.push(*address);
            self.gateways
                .insert(*address, GatewayInfo::new(*address, *mode, hex));
        }
        self
    }

    /// `count` full-mode gateways with addresses derived from `first..`.
    pub(crate) fn populated_hex(self, hex: Hex, first: u8, count: u8) -> Self {
        let gateways: Vec<_> = (first..first + count)
            .map(|n| (addr(n), GatewayMode::Full))
            .collect();
        self.hex(hex, &gateways)
    }

    /// Index `address` in `hex` without a ledger record.
    pub(crate) fn dangling(mut self, hex: Hex, address: PubkeyBin) -> Self {
        self.hexes.entry(hex).or_default().push(address);
        self
    }

    pub(crate) fn activity(mut self, address: PubkeyBin, height: Height) -> Self {
        if let Some(info) = self.gateways.get_mut(&address) {
            info.last_activity = Some(height);
        }
        self
    }

    pub(crate) fn vars(&self) -> Vars {
        Vars::from_chain_vars(&self.vars).unwrap()
    }
}

impl Ledger for FakeLedger {
    fn current_height(&self) -> Height {
        self.height
    }

    fn chain_vars(&self) -> &ChainVars {
        &self.vars
    }

    fn draw_weighted_random_hex(&self, state: &RandState) -> Option<(Hex, u64, RandState)> {
        if self.hexes.is_empty() {
            return None;
        }
        let (rnd, next) = state.uniform();
        let idx = ((rnd * self.hexes.len() as f64) as usize).min(self.hexes.len() - 1);
        let (hex, gateways) = self.hexes.iter().nth(idx)?;
        Some((*hex, gateways.len() as u64, next))
    }

    fn count_gateways_in_hex(&self, hex: Hex) -> u64 {
        self.hexes.get(&hex).map(|gws| gws.len() as u64).unwrap_or(0)
    }

    fn lookup_gateways_in_hex(&self, hex: Hex) -> BTreeMap<Hex, Vec<PubkeyBin>> {
        self.hexes
            .get(&hex)
            .map(|gws| BTreeMap::from([(hex, gws.clone())]))
            .unwrap_or_default()
    }

    fn find_gateway(&self, address: &PubkeyBin) -> Option<GatewayInfo> {
        self.gateways.get(address).cloned()
    }
}
