//! Core types for Proof-of-Coverage targeting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ledger height (block number).
pub type Height = u64;

/// Opaque geospatial cell identifier.
///
/// The grid scheme is external; the only property relied on here is the
/// total order of the raw index, which is the canonical hex ordering.
/// Serialized as a lowercase hex string, the usual textual form of grid
/// indexes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hex(u64);

impl Hex {
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::Debug for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hex({:x})", self.0)
    }
}

impl FromStr for Hex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseError::Hex(s.to_string()))
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed-width gateway address: one key-type byte followed by the 32-byte
/// public key.
///
/// The derived `Ord` is plain byte order, which is the canonical order used
/// when sorting candidates before the final weighted pick.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PubkeyBin([u8; PubkeyBin::LEN]);

impl PubkeyBin {
    pub const LEN: usize = 33;
    pub const ED25519_KEY_TYPE: u8 = 0x01;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Address for an Ed25519 public key.
    pub fn from_ed25519(public_key: &[u8; 32]) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[0] = Self::ED25519_KEY_TYPE;
        bytes[1..].copy_from_slice(public_key);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PubkeyBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PubkeyBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubkeyBin({})", self.to_hex())
    }
}

impl FromStr for PubkeyBin {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseError::Address(s.to_string()))?;
        let bytes: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| ParseError::Address(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for PubkeyBin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PubkeyBin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid hex index: {0}")]
    Hex(String),

    #[error("Invalid gateway address (expected 33 hex-encoded bytes): {0}")]
    Address(String),
}

/// Chain variable names and node-local defaults.
pub mod constants {
    /// Number of distinct hexes sampled into the targeting pool.
    pub const POC_TARGET_POOL_SIZE: &str = "poc_target_pool_size";
    /// Selection weight assigned to every candidate challengee.
    pub const POC_V4_PROB_RANDOMNESS_WT: &str = "poc_v4_prob_randomness_wt";
    /// Optional cap on the number of gateways considered within a zone.
    pub const POC_WITNESS_CONSIDERATION_LIMIT: &str = "poc_witness_consideration_limit";
    /// Excludes gateways without recent activity when true.
    pub const POC_ACTIVITY_FILTER_ENABLED: &str = "poc_activity_filter_enabled";
    /// Maximum age (in blocks) of a gateway's last activity when the activity filter is on.
    pub const POC_V4_TARGET_CHALLENGE_AGE: &str = "poc_v4_target_challenge_age";
    /// Hex pool acceptance rule: "budget_match" or "non_empty".
    pub const POC_HEX_ACCEPTANCE: &str = "poc_hex_acceptance";

    pub const FULL_GATEWAY_CAPABILITIES_MASK: &str = "full_gateway_capabilities_mask";
    pub const LIGHT_GATEWAY_CAPABILITIES_MASK: &str = "light_gateway_capabilities_mask";
    pub const DATAONLY_GATEWAY_CAPABILITIES_MASK: &str = "dataonly_gateway_capabilities_mask";

    // Capability bits
    pub const GW_CAPABILITY_ROUTE_PACKETS: u32 = 0x01;
    pub const GW_CAPABILITY_POC_CHALLENGER: u32 = 0x02;
    pub const GW_CAPABILITY_POC_CHALLENGEE: u32 = 0x04;
    pub const GW_CAPABILITY_POC_WITNESS: u32 = 0x08;
    pub const GW_CAPABILITY_POC_RECEIPT: u32 = 0x10;
    pub const GW_CAPABILITY_CONSENSUS_GROUP: u32 = 0x20;

    // Capability masks used when the chain does not define one for a mode
    pub const DEFAULT_FULL_CAPABILITIES_MASK: u32 = 0x3F;
    pub const DEFAULT_LIGHT_CAPABILITIES_MASK: u32 = GW_CAPABILITY_ROUTE_PACKETS
        | GW_CAPABILITY_POC_CHALLENGEE
        | GW_CAPABILITY_POC_WITNESS
        | GW_CAPABILITY_POC_RECEIPT;
    pub const DEFAULT_DATAONLY_CAPABILITIES_MASK: u32 = GW_CAPABILITY_ROUTE_PACKETS;

    /// Decimal places kept by float normalization.
    pub const FLOAT_NORMALIZATION_DECIMALS: usize = 15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_and_displays_lowercase() {
        let hex: Hex = "8c2a1072b59a5ff".parse().unwrap();
        assert_eq!(hex.index(), 0x8c2a1072b59a5ff);
        assert_eq!(hex.to_string(), "8c2a1072b59a5ff");
        assert!("not-a-hex".parse::<Hex>().is_err());
    }

    #[test]
    fn hex_orders_by_index() {
        assert!(Hex::new(1) < Hex::new(2));
        assert!(Hex::new(0xff) < Hex::new(0x100));
    }

    #[test]
    fn pubkey_bin_from_ed25519_prefixes_key_type() {
        let addr = PubkeyBin::from_ed25519(&[7u8; 32]);
        assert_eq!(addr.as_bytes()[0], PubkeyBin::ED25519_KEY_TYPE);
        assert_eq!(&addr.as_bytes()[1..], &[7u8; 32]);
    }

    #[test]
    fn pubkey_bin_rejects_wrong_width() {
        assert!("01ab".parse::<PubkeyBin>().is_err());
        let addr = PubkeyBin::from_ed25519(&[3u8; 32]);
        assert_eq!(addr.to_hex().parse::<PubkeyBin>().unwrap(), addr);
    }

    #[test]
    fn pubkey_bin_orders_bytewise() {
        let a = PubkeyBin::from_ed25519(&[1u8; 32]);
        let mut b_key = [1u8; 32];
        b_key[31] = 2;
        let b = PubkeyBin::from_ed25519(&b_key);
        assert!(a < b);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let addr = PubkeyBin::from_ed25519(&[0xab; 32]);
        let json = serde_json::to_string(&(Hex::new(0x8c2a), addr)).unwrap();
        assert_eq!(json, format!("[\"8c2a\",\"01{}\"]", "ab".repeat(32)));
        let back: (Hex, PubkeyBin) = serde_json::from_str(&json).unwrap();
        assert_eq!(back, (Hex::new(0x8c2a), addr));
    }
}
