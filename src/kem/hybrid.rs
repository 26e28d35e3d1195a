/// Hybrid KEM combiner: runs two component KEMs side by side.
///
/// - The seed is expanded with SHAKE256 into the first component's seed,
///   followed by the second component's seed.
/// - Public keys, secret keys, ciphertexts and shared secrets are the
///   concatenation `first ‖ second`.
/// - Seed sizes are the larger of the two components' sizes.
///
/// The result is secure as long as either component remains unbroken.
use zeroize::Zeroizing;

use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, shake_expand,
    KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

pub struct HybridKem {
    name: &'static str,
    first: &'static dyn KemScheme,
    second: &'static dyn KemScheme,
}

impl HybridKem {
    pub const fn new(
        name: &'static str,
        first: &'static dyn KemScheme,
        second: &'static dyn KemScheme,
    ) -> Self {
        Self {
            name,
            first,
            second,
        }
    }

    pub fn components(&self) -> (&'static dyn KemScheme, &'static dyn KemScheme) {
        (self.first, self.second)
    }

    fn split_seed(&self, seed: &[u8], first_len: usize, second_len: usize) -> [Zeroizing<Vec<u8>>; 2] {
        shake_expand(seed, [first_len, second_len]).map(Zeroizing::new)
    }
}

impl std::fmt::Debug for HybridKem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridKem")
            .field("name", &self.name)
            .field("first", &self.first.name())
            .field("second", &self.second.name())
            .finish()
    }
}

impl KemScheme for HybridKem {
    fn name(&self) -> &'static str {
        self.name
    }

    fn seed_size(&self) -> usize {
        self.first.seed_size().max(self.second.seed_size())
    }

    fn encapsulation_seed_size(&self) -> usize {
        self.first
            .encapsulation_seed_size()
            .max(self.second.encapsulation_seed_size())
    }

    fn public_key_size(&self) -> usize {
        self.first.public_key_size() + self.second.public_key_size()
    }

    fn secret_key_size(&self) -> usize {
        self.first.secret_key_size() + self.second.secret_key_size()
    }

    fn ciphertext_size(&self) -> usize {
        self.first.ciphertext_size() + self.second.ciphertext_size()
    }

    fn shared_key_size(&self) -> usize {
        self.first.shared_key_size() + self.second.shared_key_size()
    }

    fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)> {
        check_seed(seed, self.seed_size())?;
        let [seed1, seed2] =
            self.split_seed(seed, self.first.seed_size(), self.second.seed_size());

        let (pk1, sk1) = self.first.derive_key_pair(&seed1)?;
        let (pk2, sk2) = self.second.derive_key_pair(&seed2)?;

        let mut pk = pk1.to_vec();
        pk.extend_from_slice(pk2.as_bytes());
        let mut sk = Vec::with_capacity(self.secret_key_size());
        sk.extend_from_slice(sk1.as_bytes());
        sk.extend_from_slice(sk2.as_bytes());

        Ok((
            KemPublicKey::new(self.name, pk),
            KemSecretKey::new(self.name, sk),
        ))
    }

    fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
        if bytes.len() != self.public_key_size() {
            return Err(KemError::MalformedPeerKey(format!(
                "{} public key must be {} bytes, got {}",
                self.name,
                self.public_key_size(),
                bytes.len()
            )));
        }
        let (b1, b2) = bytes.split_at(self.first.public_key_size());
        self.first.unmarshal_public_key(b1)?;
        self.second.unmarshal_public_key(b2)?;
        Ok(KemPublicKey::new(self.name, bytes.to_vec()))
    }

    fn encapsulate_deterministically(
        &self,
        public_key: &KemPublicKey,
        seed: &[u8],
    ) -> Result<(Vec<u8>, SharedSecret)> {
        check_public_key_scheme(self.name, public_key)?;
        check_seed(seed, self.encapsulation_seed_size())?;
        if public_key.as_bytes().len() != self.public_key_size() {
            return Err(KemError::EncapsulationFailed(format!(
                "{} public key has wrong length",
                self.name
            )));
        }

        let (b1, b2) = public_key.as_bytes().split_at(self.first.public_key_size());
        let pk1 = self.first.unmarshal_public_key(b1)?;
        let pk2 = self.second.unmarshal_public_key(b2)?;

        let [seed1, seed2] = self.split_seed(
            seed,
            self.first.encapsulation_seed_size(),
            self.second.encapsulation_seed_size(),
        );
        let (ct1, ss1) = self.first.encapsulate_deterministically(&pk1, &seed1)?;
        let (ct2, ss2) = self.second.encapsulate_deterministically(&pk2, &seed2)?;

        let mut ct = ct1;
        ct.extend_from_slice(&ct2);
        let mut ss = Vec::with_capacity(self.shared_key_size());
        ss.extend_from_slice(ss1.as_bytes());
        ss.extend_from_slice(ss2.as_bytes());

        Ok((ct, SharedSecret::new(ss)))
    }

    fn decapsulate(&self, secret_key: &KemSecretKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        check_secret_key_scheme(self.name, secret_key)?;
        check_ciphertext(ciphertext, self.ciphertext_size())?;
        if secret_key.as_bytes().len() != self.secret_key_size() {
            return Err(KemError::DecapsulationFailed(format!(
                "{} secret key has wrong length",
                self.name
            )));
        }

        let (s1, s2) = secret_key.as_bytes().split_at(self.first.secret_key_size());
        let sk1 = KemSecretKey::new(self.first.name(), s1.to_vec());
        let sk2 = KemSecretKey::new(self.second.name(), s2.to_vec());
        let (c1, c2) = ciphertext.split_at(self.first.ciphertext_size());

        let ss1 = self.first.decapsulate(&sk1, c1)?;
        let ss2 = self.second.decapsulate(&sk2, c2)?;

        let mut ss = Vec::with_capacity(self.shared_key_size());
        ss.extend_from_slice(ss1.as_bytes());
        ss.extend_from_slice(ss2.as_bytes());
        Ok(SharedSecret::new(ss))
    }
}
