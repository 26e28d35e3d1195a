/// Group id → KEM scheme table.
///
/// Resolution is a pure `match` over `'static` scheme instances: no mutable
/// state, safe to call from any number of handshakes at once. Aliased ids
/// resolve to the very same instance.
///
/// The draft-00 groups pair the classical half with round-3 Kyber; the
/// standardized groups use ML-KEM. Both share sizes but not outputs.
use super::types::*;
use crate::kem::{
    DhKemX25519HkdfSha256, HybridKem, KemScheme, Kyber512Kem, Kyber768Kem, MlKem768Kem, P256Kem,
    X25519Kem,
};

static X25519_COMPONENT: X25519Kem = X25519Kem;
static P256_COMPONENT: P256Kem = P256Kem;
static KYBER512_COMPONENT: Kyber512Kem = Kyber512Kem;
static KYBER768_COMPONENT: Kyber768Kem = Kyber768Kem;
static MLKEM768_COMPONENT: MlKem768Kem = MlKem768Kem;

static X25519_KYBER512: HybridKem =
    HybridKem::new("X25519Kyber512Draft00", &X25519_COMPONENT, &KYBER512_COMPONENT);
static X25519_KYBER768: HybridKem =
    HybridKem::new("X25519Kyber768Draft00", &X25519_COMPONENT, &KYBER768_COMPONENT);
static P256_KYBER768: HybridKem =
    HybridKem::new("P256Kyber768Draft00", &P256_COMPONENT, &KYBER768_COMPONENT);
static X25519_MLKEM768_HYBRID: HybridKem =
    HybridKem::new("X25519MLKEM768", &MLKEM768_COMPONENT, &X25519_COMPONENT);
static SECP256R1_MLKEM768_HYBRID: HybridKem =
    HybridKem::new("SecP256r1MLKEM768", &P256_COMPONENT, &MLKEM768_COMPONENT);
static DUMMY: DhKemX25519HkdfSha256 = DhKemX25519HkdfSha256;

/// Every group id that resolves to a KEM scheme.
pub const KEM_GROUPS: &[GroupId] = &[
    X25519_KYBER512_DRAFT00,
    X25519_KYBER768_DRAFT00,
    X25519_KYBER768_DRAFT00_OLD,
    P256_KYBER768_DRAFT00,
    X25519_MLKEM768,
    SECP256R1_MLKEM768,
    MLKEM768,
    DUMMY_KEX,
];

/// Returns the KEM scheme registered for `group`, or `None` if the group is
/// not a KEM group (the caller then falls back to classical handling).
pub fn resolve(group: GroupId) -> Option<&'static dyn KemScheme> {
    let scheme: &'static dyn KemScheme = match group {
        X25519_KYBER512_DRAFT00 => &X25519_KYBER512,
        X25519_KYBER768_DRAFT00 | X25519_KYBER768_DRAFT00_OLD => &X25519_KYBER768,
        P256_KYBER768_DRAFT00 => &P256_KYBER768,
        X25519_MLKEM768 => &X25519_MLKEM768_HYBRID,
        SECP256R1_MLKEM768 => &SECP256R1_MLKEM768_HYBRID,
        MLKEM768 => &MLKEM768_COMPONENT,
        DUMMY_KEX => &DUMMY,
        _ => return None,
    };
    Some(scheme)
}

pub fn is_kem_group(group: GroupId) -> bool {
    resolve(group).is_some()
}

pub fn registered_groups() -> &'static [GroupId] {
    KEM_GROUPS
}
