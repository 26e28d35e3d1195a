use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

/// Capability handle for one key-encapsulation mechanism.
///
/// All randomness enters through explicit seeds: `derive_key_pair` and
/// `encapsulate_deterministically` must be pure functions of their inputs.
/// Implementations reject seeds whose length differs from the declared size.
pub trait KemScheme: Send + Sync {
    /// Human-readable scheme name, also used to tag keys.
    fn name(&self) -> &'static str;

    /// Seed length consumed by `derive_key_pair`.
    fn seed_size(&self) -> usize;

    /// Seed length consumed by `encapsulate_deterministically`.
    fn encapsulation_seed_size(&self) -> usize;

    fn public_key_size(&self) -> usize;
    fn secret_key_size(&self) -> usize;
    fn ciphertext_size(&self) -> usize;
    fn shared_key_size(&self) -> usize;

    fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)>;

    /// Validate and unpack a peer's packed public key.
    fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey>;

    /// Returns `(ciphertext, shared_secret)`.
    fn encapsulate_deterministically(
        &self,
        public_key: &KemPublicKey,
        seed: &[u8],
    ) -> Result<(Vec<u8>, SharedSecret)>;

    fn decapsulate(&self, secret_key: &KemSecretKey, ciphertext: &[u8]) -> Result<SharedSecret>;
}

impl std::fmt::Debug for dyn KemScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KemScheme({})", self.name())
    }
}

pub(crate) fn check_seed(seed: &[u8], expected: usize) -> Result<()> {
    if seed.len() != expected {
        return Err(KemError::InvalidSeedLength {
            expected,
            actual: seed.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_public_key_scheme(scheme: &'static str, pk: &KemPublicKey) -> Result<()> {
    if pk.scheme() != scheme {
        return Err(KemError::SchemeMismatch {
            expected: scheme,
            actual: pk.scheme(),
        });
    }
    Ok(())
}

pub(crate) fn check_secret_key_scheme(scheme: &'static str, sk: &KemSecretKey) -> Result<()> {
    if sk.scheme() != scheme {
        return Err(KemError::SchemeMismatch {
            expected: scheme,
            actual: sk.scheme(),
        });
    }
    Ok(())
}

pub(crate) fn check_ciphertext(ciphertext: &[u8], expected: usize) -> Result<()> {
    if ciphertext.len() != expected {
        return Err(KemError::MalformedCiphertext {
            expected,
            actual: ciphertext.len(),
        });
    }
    Ok(())
}

/// Expand `seed` with SHAKE256 into `N` independent outputs of the given lengths.
pub(crate) fn shake_expand<const N: usize>(seed: &[u8], lens: [usize; N]) -> [Vec<u8>; N] {
    use sha3::digest::{ExtendableOutput, Update, XofReader};

    let mut hasher = sha3::Shake256::default();
    hasher.update(seed);
    let mut reader = hasher.finalize_xof();
    lens.map(|len| {
        let mut out = vec![0u8; len];
        reader.read(&mut out);
        out
    })
}
