use std::fmt;

use coverage_core::SelectError;
use coverage_ledger::LedgerError;

/// Retry loop an attempt limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    HexSampling,
    ZoneChoice,
    ZoneResolution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::HexSampling => f.write_str("hex sampling"),
            Stage::ZoneChoice => f.write_str("zone choice"),
            Stage::ZoneResolution => f.write_str("zone resolution"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Nothing to target: the hex pool is (or would be) empty.
    #[error("No candidate hexes available for targeting")]
    EmptyPool,

    /// The snapshot is inconsistent or its chain variables are unusable.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Weighted selection failed: {0}")]
    Select(#[from] SelectError),

    /// Operational guard tripped; only possible when a limit is configured.
    #[error("{stage} gave up after {attempts} retries")]
    AttemptLimit { stage: Stage, attempts: u64 },
}
