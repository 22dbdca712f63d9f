//! Random streams for a single challenge.
//!
//! A challenge consumes two streams: the zone stream drives hex sampling and
//! zone resolution, the target stream drives the final challengee pick. Both
//! come from one root seeded with SHA-256(entropy || challenger); the zone
//! stream is split off the root, so the two never share draws.

use coverage_core::{PubkeyBin, RandState};
use sha2::{Digest, Sha256};

/// The pair of independent random states used by one target selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeStreams {
    pub target: RandState,
    pub zone: RandState,
}

/// Derive the target and zone streams for `challenger` from block entropy.
pub fn challenge_streams(entropy: &[u8], challenger: &PubkeyBin) -> ChallengeStreams {
    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update(challenger.as_bytes());
    let digest = hasher.finalize();

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    let (target, zone) = RandState::from_seed(seed).split();

    ChallengeStreams { target, zone }
}
