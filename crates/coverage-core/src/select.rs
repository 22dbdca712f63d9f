//! Weighted selection primitives shared by every targeting stage.
//!
//! All arithmetic here feeds consensus, so floats are re-normalized to a fixed
//! number of decimal places after every multiply or subtract. Two nodes on
//! different platforms walk the cumulative distribution with identical
//! intermediate values.

use crate::rand_state::RandState;
use crate::types::constants::FLOAT_NORMALIZATION_DECIMALS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("Cannot select from an empty population")]
    EmptyList,

    #[error("Population has zero total weight")]
    ZeroWeight,
}

/// Round a float to `FLOAT_NORMALIZATION_DECIMALS` decimal places.
///
/// Goes through the shortest decimal rendering so the result depends only on
/// the IEEE-754 value, not on the platform's math library.
pub fn normalize_float(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", FLOAT_NORMALIZATION_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Inverse-CDF selection over an ordered weighted population.
///
/// `rnd` is a uniform value in [0, 1). The walk subtracts each weight from
/// `rnd × total` in list order and returns the first item whose interval
/// contains the point; the last item absorbs any rounding remainder. The
/// result depends on list order, so callers must sort canonically first.
pub fn icdf_select<T>(population: &[(T, f64)], rnd: f64) -> Result<&T, SelectError> {
    let Some(((last, _), init)) = population.split_last() else {
        return Err(SelectError::EmptyList);
    };

    let total: f64 = population.iter().map(|(_, weight)| weight).sum();
    if total == 0.0 {
        return Err(SelectError::ZeroWeight);
    }

    let mut remaining = normalize_float(rnd * total);
    for (item, weight) in init {
        if remaining - weight <= 0.0 {
            return Ok(item);
        }
        remaining = normalize_float(remaining - weight);
    }
    Ok(last)
}

/// Deterministically pick at most `limit` items from `items`.
///
/// Every item is tagged with one uniform draw in list order, the tagged list
/// is sorted by (draw, item) and the first `limit` entries are kept. The
/// state is advanced once per item even when no truncation happens, so the
/// returned state depends only on the input length.
pub fn deterministic_subset<T: Ord>(
    limit: usize,
    state: &RandState,
    items: Vec<T>,
) -> (RandState, Vec<T>) {
    let mut state = state.clone();
    let mut tagged: Vec<(f64, T)> = Vec::with_capacity(items.len());
    for item in items {
        let (value, next) = state.uniform();
        state = next;
        tagged.push((value, item));
    }

    tagged.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    tagged.truncate(limit);

    (state, tagged.into_iter().map(|(_, item)| item).collect())
}
