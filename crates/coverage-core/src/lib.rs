//! Primitive types and deterministic sampling for Proof-of-Coverage targeting.

pub mod rand_state;
pub mod select;
pub mod types;

pub use rand_state::RandState;
pub use select::{deterministic_subset, icdf_select, normalize_float, SelectError};
pub use types::{constants, Height, Hex, PubkeyBin};
