//! PoC target selection node tooling.

pub mod selection;
