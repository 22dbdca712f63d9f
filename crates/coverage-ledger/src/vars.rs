//! Chain variables consumed by targeting.
//!
//! The raw map is whatever the ledger stores; `Vars` is the validated, typed
//! view. Required variables that are absent or out of range are errors, never
//! silently defaulted, since every node must agree on them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use coverage_core::constants::*;
use coverage_core::Height;

use crate::gateway::GatewayMode;
use crate::ledger::LedgerError;

/// A single chain variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for VarValue {
    fn from(v: bool) -> Self {
        VarValue::Bool(v)
    }
}

impl From<i64> for VarValue {
    fn from(v: i64) -> Self {
        VarValue::Int(v)
    }
}

impl From<f64> for VarValue {
    fn from(v: f64) -> Self {
        VarValue::Float(v)
    }
}

impl From<&str> for VarValue {
    fn from(v: &str) -> Self {
        VarValue::Str(v.to_string())
    }
}

/// Raw chain variables keyed by name.
pub type ChainVars = BTreeMap<String, VarValue>;

/// Rule deciding whether a sampled hex enters the targeting pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HexAcceptance {
    /// Gateway count must equal the number of pool slots still open.
    #[default]
    BudgetMatch,
    /// Any hex with at least one gateway.
    NonEmpty,
}

impl HexAcceptance {
    pub fn accepts(self, gateway_count: u64, remaining: usize) -> bool {
        if gateway_count == 0 {
            return false;
        }
        match self {
            HexAcceptance::BudgetMatch => gateway_count == remaining as u64,
            HexAcceptance::NonEmpty => true,
        }
    }
}

impl FromStr for HexAcceptance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_match" => Ok(HexAcceptance::BudgetMatch),
            "non_empty" => Ok(HexAcceptance::NonEmpty),
            other => Err(format!("unknown hex acceptance rule {other:?}")),
        }
    }
}

impl fmt::Display for HexAcceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexAcceptance::BudgetMatch => f.write_str("budget_match"),
            HexAcceptance::NonEmpty => f.write_str("non_empty"),
        }
    }
}

/// Validated variables for zone resolution and the final pick.
///
/// Pool size and the acceptance rule belong to the zone phase, which reads
/// them straight from the ledger through [`pool_size`] and
/// [`hex_acceptance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vars {
    pub prob_randomness_wt: f64,
    /// Cap on gateways considered per zone.
    pub consideration_limit: Option<usize>,
    /// Set only when the activity filter is enabled.
    pub max_activity_age: Option<Height>,
}

impl Vars {
    pub fn from_chain_vars(vars: &ChainVars) -> Result<Self, LedgerError> {
        let prob_randomness_wt = get_float(vars, POC_V4_PROB_RANDOMNESS_WT)?
            .ok_or(LedgerError::MissingVar(POC_V4_PROB_RANDOMNESS_WT))?;
        if !prob_randomness_wt.is_finite() || prob_randomness_wt <= 0.0 {
            return Err(invalid(POC_V4_PROB_RANDOMNESS_WT, "must be a positive finite number"));
        }

        let consideration_limit = get_int(vars, POC_WITNESS_CONSIDERATION_LIMIT)?
            .map(|limit| positive(POC_WITNESS_CONSIDERATION_LIMIT, limit))
            .transpose()?;

        let activity_enabled = get_bool(vars, POC_ACTIVITY_FILTER_ENABLED)?.unwrap_or(false);
        let max_activity_age = if activity_enabled {
            let age = get_int(vars, POC_V4_TARGET_CHALLENGE_AGE)?
                .ok_or(LedgerError::MissingVar(POC_V4_TARGET_CHALLENGE_AGE))?;
            Some(positive(POC_V4_TARGET_CHALLENGE_AGE, age)? as Height)
        } else {
            None
        };

        Ok(Self {
            prob_randomness_wt,
            consideration_limit,
            max_activity_age,
        })
    }
}

/// Number of hexes to sample into the targeting pool.
pub fn pool_size(vars: &ChainVars) -> Result<usize, LedgerError> {
    let size = get_int(vars, POC_TARGET_POOL_SIZE)?
        .ok_or(LedgerError::MissingVar(POC_TARGET_POOL_SIZE))?;
    positive(POC_TARGET_POOL_SIZE, size)
}

/// Hex pool acceptance rule; `BudgetMatch` when unset.
pub fn hex_acceptance(vars: &ChainVars) -> Result<HexAcceptance, LedgerError> {
    match vars.get(POC_HEX_ACCEPTANCE) {
        None => Ok(HexAcceptance::default()),
        Some(VarValue::Str(s)) => s.parse().map_err(|reason| invalid(POC_HEX_ACCEPTANCE, reason)),
        Some(other) => Err(invalid(POC_HEX_ACCEPTANCE, format!("expected string, got {other:?}"))),
    }
}

/// Capability mask for `mode`, falling back to the built-in default.
pub fn capability_mask(vars: &ChainVars, mode: GatewayMode) -> Result<u32, LedgerError> {
    let name = mode.mask_var();
    match get_int(vars, name)? {
        None => Ok(mode.default_mask()),
        Some(mask) => u32::try_from(mask).map_err(|_| invalid(name, "mask out of range")),
    }
}

fn get_int(vars: &ChainVars, name: &'static str) -> Result<Option<i64>, LedgerError> {
    match vars.get(name) {
        None => Ok(None),
        Some(VarValue::Int(v)) => Ok(Some(*v)),
        Some(other) => Err(invalid(name, format!("expected integer, got {other:?}"))),
    }
}

fn get_float(vars: &ChainVars, name: &'static str) -> Result<Option<f64>, LedgerError> {
    match vars.get(name) {
        None => Ok(None),
        Some(VarValue::Float(v)) => Ok(Some(*v)),
        Some(VarValue::Int(v)) => Ok(Some(*v as f64)),
        Some(other) => Err(invalid(name, format!("expected number, got {other:?}"))),
    }
}

fn get_bool(vars: &ChainVars, name: &'static str) -> Result<Option<bool>, LedgerError> {
    match vars.get(name) {
        None => Ok(None),
        Some(VarValue::Bool(v)) => Ok(Some(*v)),
        Some(other) => Err(invalid(name, format!("expected bool, got {other:?}"))),
    }
}

fn positive(name: &'static str, value: i64) -> Result<usize, LedgerError> {
    if value <= 0 {
        return Err(invalid(name, format!("must be positive, got {value}")));
    }
    usize::try_from(value).map_err(|_| invalid(name, "value out of range"))
}

fn invalid(name: &'static str, reason: impl Into<String>) -> LedgerError {
    LedgerError::InvalidVar {
        name,
        reason: reason.into(),
    }
}
