use std::io::Read;

use zeroize::Zeroizing;

use super::key_share::KemPrivateKey;
use crate::error::{AlertError, KemError};
use crate::kem::{KemScheme, SharedSecret};

/// Generate a fresh shared secret and encapsulate it for the packed public
/// key `peer_public_key`, drawing the encapsulation seed from `rng`.
///
/// Alerts:
/// - peer key fails to unpack → `illegal_parameter`
/// - randomness runs short → `internal_error`
/// - the scheme's encapsulation fails → `illegal_parameter`, even when the
///   fault is local; peers rely on this alert choice.
pub fn encapsulate_for_kem(
    scheme: &dyn KemScheme,
    rng: &mut impl Read,
    peer_public_key: &[u8],
) -> Result<(Vec<u8>, SharedSecret), AlertError> {
    let pk = scheme.unmarshal_public_key(peer_public_key).map_err(|e| {
        log::warn!("Rejected {} peer key share: {}", scheme.name(), e);
        AlertError::illegal_parameter(match e {
            KemError::MalformedPeerKey(_) => e,
            other => KemError::MalformedPeerKey(other.to_string()),
        })
    })?;

    let needed = scheme.encapsulation_seed_size();
    let mut seed = Zeroizing::new(vec![0u8; needed]);
    rng.read_exact(&mut seed).map_err(|source| {
        AlertError::internal_error(KemError::RandomSourceExhausted { needed, source })
    })?;

    scheme
        .encapsulate_deterministically(&pk, &seed)
        .map_err(AlertError::illegal_parameter)
}

/// Recover the shared secret from the peer's `ciphertext` with a stored key.
pub fn decapsulate_for_kem(
    scheme: &dyn KemScheme,
    private_key: &KemPrivateKey,
    ciphertext: &[u8],
) -> Result<SharedSecret, AlertError> {
    if private_key.secret_key.scheme() != scheme.name() {
        return Err(AlertError::internal_error(KemError::SchemeMismatch {
            expected: scheme.name(),
            actual: private_key.secret_key.scheme(),
        }));
    }
    scheme
        .decapsulate(&private_key.secret_key, ciphertext)
        .map_err(|e| {
            log::warn!("{} decapsulation failed for group {}: {}", scheme.name(), private_key.group, e);
            AlertError::illegal_parameter(e)
        })
}
