//! Proof-of-Coverage target selection.
//!
//! Given a read-only ledger snapshot and two random streams, picks a zone
//! (hex) and then a challengee gateway inside it. Every step is a pure
//! function of its inputs, so all nodes reach the same target.
//!
//! Pipeline: [`hex_pool`] samples candidate zones, [`zone`] picks one,
//! [`resolver`] turns it into eligible gateways (falling back to other zones)
//! using [`filter`], and [`target`] makes the final weighted pick.

pub mod config;
pub mod error;
pub mod filter;
pub mod hex_pool;
pub mod resolver;
pub mod target;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;

pub use config::TargetingConfig;
pub use error::{Stage, TargetError};
pub use hex_pool::{sample_hex_pool, HexPool};
pub use resolver::AttemptHistory;
pub use target::Targeter;
pub use zone::choose_zone;
