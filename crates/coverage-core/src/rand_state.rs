//! Explicitly threaded deterministic random state.
//!
//! A `RandState` is never advanced in place. Every draw borrows a state and
//! returns the value together with the successor state, so replaying a
//! computation from the same seed reproduces every draw exactly. There is no
//! global or thread-local generator anywhere in the targeting pipeline.
//!
//! The generator is ChaCha20 with a 32-byte seed; uniform floats take the top
//! 53 bits of one 64-bit output, giving values in [0, 1).

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandState(ChaCha20Rng);

impl RandState {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(ChaCha20Rng::from_seed(seed))
    }

    /// Seed from the SHA-256 digest of arbitrary bytes (block hash, entropy, ...).
    pub fn from_hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        Self::from_seed(seed)
    }

    /// Draw a uniform float in [0, 1).
    #[must_use]
    pub fn uniform(&self) -> (f64, Self) {
        let (bits, next) = self.next_u64();
        let value = (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
        (value, next)
    }

    /// Draw a raw 64-bit value.
    #[must_use]
    pub fn next_u64(&self) -> (u64, Self) {
        let mut rng = self.0.clone();
        let bits = rng.next_u64();
        (bits, Self(rng))
    }

    /// Derive an independent child stream, advancing the parent.
    ///
    /// The child is seeded from 32 bytes drawn from the parent, so its draws
    /// never overlap the parent's subsequent output.
    #[must_use]
    pub fn split(&self) -> (Self, Self) {
        let mut rng = self.0.clone();
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        (Self(rng), Self::from_seed(seed))
    }
}
