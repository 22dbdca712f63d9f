//! Ledger-facing collaborators for PoC targeting: the read-only `Ledger`
//! interface, gateway records, chain variables and an in-memory snapshot.

pub mod gateway;
pub mod ledger;
pub mod memory;
pub mod vars;

pub use gateway::{Capability, GatewayInfo, GatewayMode};
pub use ledger::{Ledger, LedgerError};
pub use memory::{MemoryLedger, Snapshot};
pub use vars::{ChainVars, HexAcceptance, VarValue, Vars};
