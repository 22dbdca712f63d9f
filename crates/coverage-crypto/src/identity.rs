//! Gateway identity: Ed25519 keypair and its ledger address.

use coverage_core::PubkeyBin;
use ed25519_dalek::{SigningKey, VerifyingKey};

/// A gateway's (or challenger's) identity keypair.
#[derive(Clone)]
pub struct GatewayIdentity {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl GatewayIdentity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut rng);
        let verifying_key = signing_key.verifying_key();
        Self { signing_key, verifying_key }
    }

    /// Create from a 32-byte seed (deterministic).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = signing_key.verifying_key();
        Self { signing_key, verifying_key }
    }

    /// Fixed-width ledger address derived from the public key.
    pub fn address(&self) -> PubkeyBin {
        PubkeyBin::from_ed25519(self.verifying_key.as_bytes())
    }

    /// Get the raw public key bytes.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Secret seed, for persisting the identity to a key file.
    pub fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}
