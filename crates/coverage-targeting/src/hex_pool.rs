//! Hex pool sampling.
//!
//! The pool is the set of candidate zones for one challenge: `count` distinct
//! hexes drawn from the ledger's gateway-density distribution, each carrying
//! its gateway count as its weight.

use std::collections::BTreeMap;

use tracing::debug;

use coverage_core::{Hex, RandState};
use coverage_ledger::{HexAcceptance, Ledger};

use crate::config::Attempts;
use crate::error::{Stage, TargetError};

/// Candidate zones in canonical hex order, weighted by gateway count.
/// Every weight is nonzero.
pub type HexPool = BTreeMap<Hex, u64>;

/// Draw `count` distinct hexes accepted by `acceptance`.
///
/// Rejected and duplicate draws are retried without bound unless
/// `max_attempts` is set. Fails with `EmptyPool` when the ledger has no
/// populated hexes to draw from.
pub fn sample_hex_pool<L: Ledger + ?Sized>(
    ledger: &L,
    state: &RandState,
    count: usize,
    acceptance: HexAcceptance,
    max_attempts: Option<u64>,
) -> Result<(HexPool, RandState), TargetError> {
    let mut pool = HexPool::new();
    let mut state = state.clone();
    let mut attempts = Attempts::new(Stage::HexSampling, max_attempts);

    while pool.len() < count {
        let remaining = count - pool.len();
        let (hex, gateway_count, next) = ledger
            .draw_weighted_random_hex(&state)
            .ok_or(TargetError::EmptyPool)?;
        state = next;

        if acceptance.accepts(gateway_count, remaining) && !pool.contains_key(&hex) {
            pool.insert(hex, gateway_count);
            continue;
        }

        debug!(%hex, gateway_count, remaining, %acceptance, "Discarded sampled hex");
        attempts.record()?;
    }

    Ok((pool, state))
}
