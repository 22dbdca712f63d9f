//! Zone choice: one weighted pick from the hex pool.

use tracing::debug;

use coverage_core::{icdf_select, Hex, RandState, SelectError};

use crate::config::Attempts;
use crate::error::{Stage, TargetError};
use crate::hex_pool::HexPool;

/// Pick a hex from `pool` with probability proportional to its gateway count.
///
/// A zero-weight pool is redrawn from the advanced state until it succeeds
/// (or `max_attempts` is exceeded). The returned state is advanced past the
/// successful draw.
pub fn choose_zone(
    state: &RandState,
    pool: &HexPool,
    max_attempts: Option<u64>,
) -> Result<(Hex, RandState), TargetError> {
    if pool.is_empty() {
        return Err(TargetError::EmptyPool);
    }

    let population: Vec<(Hex, f64)> = pool
        .iter()
        .map(|(hex, count)| (*hex, *count as f64))
        .collect();
    let mut state = state.clone();
    let mut attempts = Attempts::new(Stage::ZoneChoice, max_attempts);

    loop {
        let (rnd, next) = state.uniform();
        state = next;
        match icdf_select(&population, rnd) {
            Ok(hex) => return Ok((*hex, state)),
            Err(SelectError::ZeroWeight) => {
                debug!(pool = pool.len(), "Hex pool has zero total weight, redrawing");
                attempts.record()?;
            }
            Err(SelectError::EmptyList) => return Err(TargetError::EmptyPool),
        }
    }
}
