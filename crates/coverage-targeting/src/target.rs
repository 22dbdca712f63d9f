//! Challengee selection: zone resolution followed by the final weighted pick.
//!
//! Two random streams are threaded through a selection. The zone stream
//! drives hex sampling, zone choice and zone fallback; the target stream is
//! consumed by exactly one draw, the final pick. Keeping them apart means the
//! zone outcome never depends on the target stream and vice versa.

use tracing::info;

use coverage_core::{icdf_select, normalize_float, Hex, PubkeyBin, RandState};
use coverage_ledger::{vars, Ledger, Vars};

use crate::config::TargetingConfig;
use crate::error::TargetError;
use crate::hex_pool::{sample_hex_pool, HexPool};
use crate::resolver::{self, AttemptHistory};
use crate::zone::choose_zone;

/// Entry point for target selection.
///
/// The default value retries without bound, which is the consensus
/// behaviour; a configured attempt limit only adds an error exit.
#[derive(Debug, Clone, Default)]
pub struct Targeter {
    max_attempts: Option<u64>,
}

impl Targeter {
    pub fn new(config: &TargetingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
        }
    }

    /// Sample the hex pool and choose the initial zone.
    ///
    /// Pool size and acceptance rule are read from the ledger's chain
    /// variables.
    pub fn target_zone<L: Ledger + ?Sized>(
        &self,
        zone_state: &RandState,
        ledger: &L,
    ) -> Result<(HexPool, Hex, RandState), TargetError> {
        let chain_vars = ledger.chain_vars();
        let count = vars::pool_size(chain_vars)?;
        let acceptance = vars::hex_acceptance(chain_vars)?;

        let (pool, state) =
            sample_hex_pool(ledger, zone_state, count, acceptance, self.max_attempts)?;
        let (hex, hex_state) = choose_zone(&state, &pool, self.max_attempts)?;
        Ok((pool, hex, hex_state))
    }

    pub fn resolve_zone_gateways<L: Ledger + ?Sized>(
        &self,
        challenger: &PubkeyBin,
        ledger: &L,
        vars: &Vars,
        pool: &HexPool,
        history: &mut AttemptHistory,
    ) -> Result<Vec<PubkeyBin>, TargetError> {
        resolver::resolve_zone_gateways(challenger, ledger, vars, pool, history, self.max_attempts)
    }

    /// Select the challengee for `challenger`.
    ///
    /// Returns the target and the target stream advanced past its one draw.
    pub fn select_target<L: Ledger + ?Sized>(
        &self,
        challenger: &PubkeyBin,
        target_state: &RandState,
        zone_state: &RandState,
        ledger: &L,
        vars: &Vars,
    ) -> Result<(PubkeyBin, RandState), TargetError> {
        let (pool, hex, hex_state) = self.target_zone(zone_state, ledger)?;
        let mut history = AttemptHistory::new(hex, hex_state);
        let gateways = self.resolve_zone_gateways(challenger, ledger, vars, &pool, &mut history)?;

        // Every candidate carries the same weight; sorting by address makes
        // the cumulative walk independent of lookup order.
        let weight = normalize_float(vars.prob_randomness_wt);
        let mut weighted: Vec<(PubkeyBin, f64)> =
            gateways.into_iter().map(|gw| (gw, weight)).collect();
        weighted.sort_by(|a, b| a.0.cmp(&b.0));

        let (rnd, next) = target_state.uniform();
        let target = *icdf_select(&weighted, rnd)?;

        info!(
            %challenger,
            %target,
            zone = %history.current_hex(),
            zones_tried = history.tried(),
            pool = pool.len(),
            candidates = weighted.len(),
            "Selected PoC target"
        );
        Ok((target, next))
    }
}
