//! Gateway identities and challenge entropy.

pub mod entropy;
pub mod identity;

pub use entropy::{challenge_streams, ChallengeStreams};
pub use identity::GatewayIdentity;
