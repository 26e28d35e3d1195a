/// X25519 Diffie-Hellman presented as a KEM (RFC 7748).
///
/// Key generation expands the seed with SHAKE256 into the scalar; encapsulation
/// derives an ephemeral key from its seed, sends the ephemeral public key as
/// the ciphertext and returns the raw DH output as the shared secret.
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, shake_expand,
    KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

pub const X25519_KEY_BYTES: usize = 32;

#[derive(Debug, Default, Clone, Copy)]
pub struct X25519Kem;

pub(crate) fn secret_from_seed(seed: &[u8]) -> StaticSecret {
    let [scalar] = shake_expand(seed, [X25519_KEY_BYTES]);
    let mut bytes = Zeroizing::new([0u8; X25519_KEY_BYTES]);
    bytes.copy_from_slice(&scalar);
    StaticSecret::from(*bytes)
}

pub(crate) fn to_array(bytes: &[u8]) -> Option<[u8; X25519_KEY_BYTES]> {
    bytes.try_into().ok()
}

impl KemScheme for X25519Kem {
    fn name(&self) -> &'static str {
        "X25519"
    }

    fn seed_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn encapsulation_seed_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn public_key_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn secret_key_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn ciphertext_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn shared_key_size(&self) -> usize {
        X25519_KEY_BYTES
    }

    fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)> {
        check_seed(seed, self.seed_size())?;
        let secret = secret_from_seed(seed);
        let public = PublicKey::from(&secret);
        Ok((
            KemPublicKey::new(self.name(), public.to_bytes().to_vec()),
            KemSecretKey::new(self.name(), secret.to_bytes().to_vec()),
        ))
    }

    fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
        if bytes.len() != X25519_KEY_BYTES {
            return Err(KemError::MalformedPeerKey(format!(
                "X25519 public key must be {} bytes, got {}",
                X25519_KEY_BYTES,
                bytes.len()
            )));
        }
        Ok(KemPublicKey::new(self.name(), bytes.to_vec()))
    }

    fn encapsulate_deterministically(
        &self,
        public_key: &KemPublicKey,
        seed: &[u8],
    ) -> Result<(Vec<u8>, SharedSecret)> {
        check_public_key_scheme(self.name(), public_key)?;
        check_seed(seed, self.encapsulation_seed_size())?;

        let peer = to_array(public_key.as_bytes())
            .map(PublicKey::from)
            .ok_or_else(|| KemError::EncapsulationFailed("bad X25519 public key".into()))?;

        let ephemeral = secret_from_seed(seed);
        let ephemeral_public = PublicKey::from(&ephemeral);
        let shared = ephemeral.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(KemError::EncapsulationFailed(
                "X25519 produced an all-zero shared secret".into(),
            ));
        }

        Ok((
            ephemeral_public.to_bytes().to_vec(),
            SharedSecret::new(shared.as_bytes().to_vec()),
        ))
    }

    fn decapsulate(&self, secret_key: &KemSecretKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        check_secret_key_scheme(self.name(), secret_key)?;
        check_ciphertext(ciphertext, self.ciphertext_size())?;

        let sk = Zeroizing::new(
            to_array(secret_key.as_bytes())
                .ok_or_else(|| KemError::DecapsulationFailed("bad X25519 secret key".into()))?,
        );
        let secret = StaticSecret::from(*sk);

        let peer = to_array(ciphertext)
            .map(PublicKey::from)
            .ok_or(KemError::MalformedCiphertext {
                expected: X25519_KEY_BYTES,
                actual: ciphertext.len(),
            })?;
        let shared = secret.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(KemError::DecapsulationFailed(
                "X25519 produced an all-zero shared secret".into(),
            ));
        }
        Ok(SharedSecret::new(shared.as_bytes().to_vec()))
    }
}
