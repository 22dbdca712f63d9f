//! Zone gateway resolution with fallback to other zones.

use tracing::debug;

use coverage_core::{deterministic_subset, Hex, PubkeyBin, RandState};
use coverage_ledger::{Ledger, Vars};

use crate::config::Attempts;
use crate::error::{Stage, TargetError};
use crate::filter::{filter_active, filter_eligible};
use crate::hex_pool::HexPool;
use crate::zone::choose_zone;

/// Zones tried during one resolution, each with the random state it was
/// chosen with. Never empty; lives only for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptHistory {
    current: (Hex, RandState),
    previous: Vec<(Hex, RandState)>,
}

impl AttemptHistory {
    pub fn new(hex: Hex, state: RandState) -> Self {
        Self {
            current: (hex, state),
            previous: Vec::new(),
        }
    }

    /// Make `hex` the current attempt.
    pub fn push(&mut self, hex: Hex, state: RandState) {
        let prior = std::mem::replace(&mut self.current, (hex, state));
        self.previous.push(prior);
    }

    pub fn current(&self) -> (Hex, &RandState) {
        (self.current.0, &self.current.1)
    }

    pub fn current_hex(&self) -> Hex {
        self.current.0
    }

    /// Number of zones tried, including the current one.
    pub fn tried(&self) -> usize {
        self.previous.len() + 1
    }

    /// Tried zones, most recent first.
    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        std::iter::once(self.current.0).chain(self.previous.iter().rev().map(|(hex, _)| *hex))
    }
}

/// Resolve the eligible gateways of the history's current zone.
///
/// When the zone has none, another zone is chosen from the unmodified `pool`
/// using the state left over from this attempt, appended to `history`, and
/// tried in turn. Rejected zones stay in the pool and may be chosen again.
pub fn resolve_zone_gateways<L: Ledger + ?Sized>(
    challenger: &PubkeyBin,
    ledger: &L,
    vars: &Vars,
    pool: &HexPool,
    history: &mut AttemptHistory,
    max_attempts: Option<u64>,
) -> Result<Vec<PubkeyBin>, TargetError> {
    let height = ledger.current_height();
    let mut attempts = Attempts::new(Stage::ZoneResolution, max_attempts);

    loop {
        let (hex, hex_state) = history.current();
        let gateways: Vec<PubkeyBin> = ledger
            .lookup_gateways_in_hex(hex)
            .into_values()
            .flatten()
            .collect();
        let found = gateways.len();

        let (hex_state, gateways) = limit_addrs(vars, hex_state, gateways);
        let gateways = filter_active(gateways, ledger, height, vars.max_activity_age)?;
        let eligible = filter_eligible(gateways, ledger, height)?;
        if !eligible.is_empty() {
            debug!(%hex, found, eligible = eligible.len(), tried = history.tried(), "Resolved zone gateways");
            return Ok(eligible);
        }

        debug!(%challenger, %hex, found, "No eligible gateways in zone, choosing another");
        attempts.record()?;
        let (next_hex, next_state) = choose_zone(&hex_state, pool, max_attempts)?;
        history.push(next_hex, next_state);
    }
}

/// Apply the per-zone consideration cap, if one is configured.
fn limit_addrs(
    vars: &Vars,
    state: &RandState,
    gateways: Vec<PubkeyBin>,
) -> (RandState, Vec<PubkeyBin>) {
    match vars.consideration_limit {
        Some(limit) => deterministic_subset(limit, state, gateways),
        None => (state.clone(), gateways),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{addr, state, FakeLedger};
    use coverage_core::constants::*;
    use coverage_ledger::GatewayMode;

    const H1: Hex = Hex::new(0x8c01);
    const H2: Hex = Hex::new(0x8c02);
    const H3: Hex = Hex::new(0x8c03);

    fn challenger() -> PubkeyBin {
        addr(200)
    }

    fn resolve(
        ledger: &FakeLedger,
        pool: &HexPool,
        start: Hex,
        max_attempts: Option<u64>,
    ) -> (Result<Vec<PubkeyBin>, TargetError>, AttemptHistory) {
        let mut history = AttemptHistory::new(start, state("resolve"));
        let result = resolve_zone_gateways(
            &challenger(),
            ledger,
            &ledger.vars(),
            pool,
            &mut history,
            max_attempts,
        );
        (result, history)
    }

    #[test]
    fn returns_all_eligible_gateways_in_lookup_order() {
        let ledger = FakeLedger::new().populated_hex(H1, 1, 2);
        let pool = HexPool::from([(H1, 2)]);
        let (result, history) = resolve(&ledger, &pool, H1, None);
        assert_eq!(result.unwrap(), vec![addr(1), addr(2)]);
        assert_eq!(history.tried(), 1);
    }

    #[test]
    fn cap_larger_than_zone_keeps_every_gateway() {
        let ledger = FakeLedger::new()
            .var(POC_WITNESS_CONSIDERATION_LIMIT, 5i64)
            .populated_hex(H1, 1, 2);
        let pool = HexPool::from([(H1, 2)]);
        let (result, _) = resolve(&ledger, &pool, H1, None);
        let mut gateways = result.unwrap();
        gateways.sort();
        let mut expected = vec![addr(1), addr(2)];
        expected.sort();
        assert_eq!(gateways, expected);
    }

    #[test]
    fn cap_limits_candidates() {
        let ledger = FakeLedger::new()
            .var(POC_WITNESS_CONSIDERATION_LIMIT, 2i64)
            .populated_hex(H1, 1, 6);
        let pool = HexPool::from([(H1, 6)]);
        let (result, _) = resolve(&ledger, &pool, H1, None);
        let gateways = result.unwrap();
        assert_eq!(gateways.len(), 2);
        assert!(gateways.iter().all(|gw| (1..7).map(addr).any(|a| a == *gw)));
    }

    #[test]
    fn ineligible_gateways_filtered_out() {
        let ledger = FakeLedger::new().hex(
            H1,
            &[(addr(1), GatewayMode::Full), (addr(2), GatewayMode::DataOnly)],
        );
        let pool = HexPool::from([(H1, 2)]);
        let (result, _) = resolve(&ledger, &pool, H1, None);
        assert_eq!(result.unwrap(), vec![addr(1)]);
    }

    #[test]
    fn falls_back_to_another_zone() {
        let ledger = FakeLedger::new()
            .hex(H1, &[(addr(1), GatewayMode::DataOnly), (addr(2), GatewayMode::DataOnly)])
            .hex(H2, &[(addr(3), GatewayMode::Light)]);
        let pool = HexPool::from([(H1, 2), (H2, 1)]);
        let (result, history) = resolve(&ledger, &pool, H1, None);
        assert_eq!(result.unwrap(), vec![addr(3)]);
        assert_eq!(history.current_hex(), H2);
        assert!(history.tried() >= 2);
        assert_eq!(history.hexes().last(), Some(H1));
    }

    #[test]
    fn fallback_draws_from_state_advanced_by_cap() {
        let ledger = FakeLedger::new()
            .var(POC_WITNESS_CONSIDERATION_LIMIT, 2i64)
            .hex(
                H1,
                &[
                    (addr(1), GatewayMode::DataOnly),
                    (addr(2), GatewayMode::DataOnly),
                    (addr(3), GatewayMode::DataOnly),
                ],
            )
            .hex(H2, &[(addr(4), GatewayMode::Light)]);
        let pool = HexPool::from([(H1, 3), (H2, 1)]);
        let (result, history) = resolve(&ledger, &pool, H1, None);
        assert_eq!(result.unwrap(), vec![addr(4)]);

        // Each rejected zone's cap consumes one draw per gateway before the
        // next zone is chosen
        let mut expected = vec![(H1, state("resolve"))];
        loop {
            let (hex, hex_state) = expected[expected.len() - 1].clone();
            if hex == H2 {
                break;
            }
            let gateways: Vec<PubkeyBin> =
                ledger.lookup_gateways_in_hex(hex).into_values().flatten().collect();
            let (advanced, _) = deterministic_subset(2, &hex_state, gateways);
            expected.push(choose_zone(&advanced, &pool, None).unwrap());
        }

        let mut tried = history.previous.clone();
        tried.push(history.current.clone());
        assert_eq!(tried, expected);

        let (_, unadvanced) = choose_zone(&state("resolve"), &pool, None).unwrap();
        assert_ne!(expected[1].1, unadvanced);
    }

    #[test]
    fn no_eligible_zone_trips_guard() {
        let ledger = FakeLedger::new()
            .hex(H1, &[(addr(1), GatewayMode::DataOnly)])
            .hex(H3, &[(addr(2), GatewayMode::DataOnly)]);
        let pool = HexPool::from([(H1, 1), (H3, 1)]);
        let (result, history) = resolve(&ledger, &pool, H1, Some(10));
        assert!(matches!(
            result,
            Err(TargetError::AttemptLimit { stage: Stage::ZoneResolution, attempts: 10 })
        ));
        assert_eq!(history.tried(), 11);
    }

    #[test]
    fn empty_pool_fallback_is_empty_pool() {
        let ledger = FakeLedger::new().hex(H1, &[(addr(1), GatewayMode::DataOnly)]);
        let (result, _) = resolve(&ledger, &HexPool::new(), H1, None);
        assert!(matches!(result, Err(TargetError::EmptyPool)));
    }

    #[test]
    fn dangling_index_entry_is_a_ledger_error() {
        let ledger = FakeLedger::new().dangling(H1, addr(9));
        let pool = HexPool::from([(H1, 1)]);
        let (result, _) = resolve(&ledger, &pool, H1, None);
        assert!(matches!(result, Err(TargetError::Ledger(_))));
    }

    #[test]
    fn activity_filter_applies_during_resolution() {
        let ledger = FakeLedger::new()
            .var(POC_ACTIVITY_FILTER_ENABLED, true)
            .var(POC_V4_TARGET_CHALLENGE_AGE, 100i64)
            .populated_hex(H1, 1, 3)
            .activity(addr(2), 990);
        let pool = HexPool::from([(H1, 3)]);
        let (result, _) = resolve(&ledger, &pool, H1, None);
        assert_eq!(result.unwrap(), vec![addr(2)]);
    }

    #[test]
    fn history_orders_newest_first() {
        let mut history = AttemptHistory::new(H1, state("a"));
        history.push(H2, state("b"));
        history.push(H3, state("c"));
        assert_eq!(history.hexes().collect::<Vec<_>>(), vec![H3, H2, H1]);
        assert_eq!(history.current(), (H3, &state("c")));
        assert_eq!(history.tried(), 3);
    }
}
