/// Named-group identifiers exchanged in `supported_groups` and `key_share`.
///
/// The id → algorithm bindings are wire-visible and must stay bit-exact.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u16);

// ── Hybrid / post-quantum KEM groups ────────────────────────────────────────

pub const X25519_KYBER512_DRAFT00: GroupId = GroupId(0xfe30);
pub const X25519_KYBER768_DRAFT00: GroupId = GroupId(0x6399);
/// Pre-codepoint id of `X25519_KYBER768_DRAFT00`; resolves to the same scheme.
pub const X25519_KYBER768_DRAFT00_OLD: GroupId = GroupId(0xfe31);
pub const P256_KYBER768_DRAFT00: GroupId = GroupId(0xfe32);

pub const X25519_MLKEM768: GroupId = GroupId(0x11EC);
pub const SECP256R1_MLKEM768: GroupId = GroupId(0x11EB);
pub const MLKEM768: GroupId = GroupId(0x11ED);

/// Similar in size to X25519 but deliberately incompatible with it. No
/// compliant peer supports this id, so offering it forces a retry request.
pub const DUMMY_KEX: GroupId = GroupId(0xfe33);

// ── Classical ECDHE groups (named only, handled by the classical path) ──────

pub const SECP256R1: GroupId = GroupId(0x0017);
pub const SECP384R1: GroupId = GroupId(0x0018);
pub const X25519: GroupId = GroupId(0x001d);

const NAMES: &[(GroupId, &str)] = &[
    (X25519_KYBER512_DRAFT00, "X25519Kyber512Draft00"),
    (X25519_KYBER768_DRAFT00, "X25519Kyber768Draft00"),
    (X25519_KYBER768_DRAFT00_OLD, "X25519Kyber768Draft00Old"),
    (P256_KYBER768_DRAFT00, "P256Kyber768Draft00"),
    (X25519_MLKEM768, "X25519MLKEM768"),
    (SECP256R1_MLKEM768, "SecP256r1MLKEM768"),
    (MLKEM768, "MLKEM768"),
    (DUMMY_KEX, "DummyKex"),
    (SECP256R1, "secp256r1"),
    (SECP384R1, "secp384r1"),
    (X25519, "x25519"),
];

impl GroupId {
    pub const fn new(id: u16) -> Self {
        GroupId(id)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Registered name, if this id is one we know about.
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|(id, _)| *id == self).map(|(_, name)| *name)
    }

    /// Big-endian wire encoding.
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        GroupId(u16::from_be_bytes(bytes))
    }
}

impl From<u16> for GroupId {
    fn from(v: u16) -> Self {
        GroupId(v)
    }
}

impl From<GroupId> for u16 {
    fn from(g: GroupId) -> Self {
        g.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:04x})", name, self.0),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

impl std::str::FromStr for GroupId {
    type Err = ConfigError;

    /// Accepts a registered name (case-insensitive) or a `0x`-prefixed hex id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex_id) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u16::from_str_radix(hex_id, 16)
                .map(GroupId)
                .map_err(|_| ConfigError::UnknownGroupName(s.to_string()));
        }
        NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(id, _)| *id)
            .ok_or_else(|| ConfigError::UnknownGroupName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(X25519_KYBER512_DRAFT00.value(), 0xfe30);
        assert_eq!(X25519_KYBER768_DRAFT00.value(), 0x6399);
        assert_eq!(X25519_KYBER768_DRAFT00_OLD.value(), 0xfe31);
        assert_eq!(P256_KYBER768_DRAFT00.value(), 0xfe32);
        assert_eq!(X25519_MLKEM768.value(), 0x11EC);
        assert_eq!(SECP256R1_MLKEM768.value(), 0x11EB);
        assert_eq!(MLKEM768.value(), 0x11ED);
        assert_eq!(DUMMY_KEX.value(), 0xfe33);
    }

    #[test]
    fn test_be_bytes() {
        assert_eq!(X25519_MLKEM768.to_be_bytes(), [0x11, 0xec]);
        assert_eq!(GroupId::from_be_bytes([0x63, 0x99]), X25519_KYBER768_DRAFT00);
    }

    #[test]
    fn test_display() {
        assert_eq!(X25519_MLKEM768.to_string(), "X25519MLKEM768 (0x11ec)");
        assert_eq!(GroupId(0x1234).to_string(), "0x1234");
    }

    #[test]
    fn test_parse_names_and_hex() {
        assert_eq!("x25519mlkem768".parse::<GroupId>().unwrap(), X25519_MLKEM768);
        assert_eq!("DummyKex".parse::<GroupId>().unwrap(), DUMMY_KEX);
        assert_eq!("0xfe31".parse::<GroupId>().unwrap(), X25519_KYBER768_DRAFT00_OLD);
        assert_eq!("0x1234".parse::<GroupId>().unwrap(), GroupId(0x1234));
        assert!(matches!(
            "kyber9000".parse::<GroupId>(),
            Err(ConfigError::UnknownGroupName(_))
        ));
        assert!("0xzz".parse::<GroupId>().is_err());
    }

    #[test]
    fn test_serde_as_bare_u16() {
        let json = serde_json::to_string(&X25519_MLKEM768).unwrap();
        assert_eq!(json, "4588");
        let back: GroupId = serde_json::from_str("25497").unwrap();
        assert_eq!(back, X25519_KYBER768_DRAFT00);
    }
}
