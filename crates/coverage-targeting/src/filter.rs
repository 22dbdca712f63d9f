//! Challengee eligibility filters. Both are order-preserving.

use coverage_core::{Height, PubkeyBin};
use coverage_ledger::{Capability, GatewayInfo, Ledger, LedgerError};

/// Keep the gateways whose registered mode holds the challengee capability.
///
/// `height` is not consulted by the current capability rules.
pub fn filter_eligible<L: Ledger + ?Sized>(
    gateways: Vec<PubkeyBin>,
    ledger: &L,
    _height: Height,
) -> Result<Vec<PubkeyBin>, LedgerError> {
    let mut eligible = Vec::with_capacity(gateways.len());
    for address in gateways {
        let info = lookup(ledger, &address)?;
        if ledger.is_capability_valid(info.mode, Capability::PocChallengee)? {
            eligible.push(address);
        }
    }
    Ok(eligible)
}

/// Keep gateways active within `max_age` blocks of `height`.
///
/// `None` disables the filter. A gateway with no recorded activity is
/// inactive while the filter is on.
pub fn filter_active<L: Ledger + ?Sized>(
    gateways: Vec<PubkeyBin>,
    ledger: &L,
    height: Height,
    max_age: Option<Height>,
) -> Result<Vec<PubkeyBin>, LedgerError> {
    let Some(max_age) = max_age else {
        return Ok(gateways);
    };

    let mut active = Vec::with_capacity(gateways.len());
    for address in gateways {
        let info = lookup(ledger, &address)?;
        if info
            .last_activity
            .is_some_and(|last| height.saturating_sub(last) < max_age)
        {
            active.push(address);
        }
    }
    Ok(active)
}

fn lookup<L: Ledger + ?Sized>(ledger: &L, address: &PubkeyBin) -> Result<GatewayInfo, LedgerError> {
    ledger
        .find_gateway(address)
        .ok_or(LedgerError::GatewayNotFound(*address))
}
