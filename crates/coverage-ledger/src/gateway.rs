//! Gateway records, operating modes and capabilities.

use serde::{Deserialize, Serialize};

use coverage_core::constants::*;
use coverage_core::{Height, Hex, PubkeyBin};

/// Registered operating mode of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Full,
    Light,
    #[serde(rename = "dataonly")]
    DataOnly,
}

impl GatewayMode {
    /// Chain variable holding this mode's capability mask.
    pub fn mask_var(self) -> &'static str {
        match self {
            GatewayMode::Full => FULL_GATEWAY_CAPABILITIES_MASK,
            GatewayMode::Light => LIGHT_GATEWAY_CAPABILITIES_MASK,
            GatewayMode::DataOnly => DATAONLY_GATEWAY_CAPABILITIES_MASK,
        }
    }

    /// Mask applied when the chain does not set `mask_var`.
    pub fn default_mask(self) -> u32 {
        match self {
            GatewayMode::Full => DEFAULT_FULL_CAPABILITIES_MASK,
            GatewayMode::Light => DEFAULT_LIGHT_CAPABILITIES_MASK,
            GatewayMode::DataOnly => DEFAULT_DATAONLY_CAPABILITIES_MASK,
        }
    }
}

/// A protocol role a gateway's mode may or may not permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    RoutePackets,
    PocChallenger,
    PocChallengee,
    PocWitness,
    PocReceipt,
    ConsensusGroup,
}

impl Capability {
    pub fn bit(self) -> u32 {
        match self {
            Capability::RoutePackets => GW_CAPABILITY_ROUTE_PACKETS,
            Capability::PocChallenger => GW_CAPABILITY_POC_CHALLENGER,
            Capability::PocChallengee => GW_CAPABILITY_POC_CHALLENGEE,
            Capability::PocWitness => GW_CAPABILITY_POC_WITNESS,
            Capability::PocReceipt => GW_CAPABILITY_POC_RECEIPT,
            Capability::ConsensusGroup => GW_CAPABILITY_CONSENSUS_GROUP,
        }
    }

    /// Whether `mask` grants this capability.
    pub fn granted_by(self, mask: u32) -> bool {
        mask & self.bit() == self.bit()
    }
}

/// Ledger record for one gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    pub address: PubkeyBin,
    pub mode: GatewayMode,
    /// Targeting hex the gateway is registered in.
    pub location: Hex,
    /// Finer cell within `location`; defaults to `location` itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_cell: Option<Hex>,
    /// Height of the gateway's last PoC activity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<Height>,
}

impl GatewayInfo {
    pub fn new(address: PubkeyBin, mode: GatewayMode, location: Hex) -> Self {
        Self {
            address,
            mode,
            location,
            sub_cell: None,
            last_activity: None,
        }
    }

    pub fn with_sub_cell(mut self, sub_cell: Hex) -> Self {
        self.sub_cell = Some(sub_cell);
        self
    }

    pub fn with_last_activity(mut self, height: Height) -> Self {
        self.last_activity = Some(height);
        self
    }

    pub fn cell(&self) -> Hex {
        self.sub_cell.unwrap_or(self.location)
    }
}
