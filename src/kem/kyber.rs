/// Kyber (NIST PQC round 3) schemes backed by `libcrux-ml-kem`, used by the
/// draft-00 hybrid groups.
///
/// Same sizes and seed layout as ML-KEM of the same strength, but key
/// generation hashes `G(d)` instead of `G(d ‖ k)`, encapsulation hashes the
/// seed before use, and the shared secret is `SHAKE256(K̄ ‖ H(c))`. The two
/// families do not interoperate.
use libcrux_ml_kem::{kyber512, kyber768, mlkem512, mlkem768};

use super::mlkem::{
    MLKEM512_CT_BYTES, MLKEM512_DK_BYTES, MLKEM512_EK_BYTES, MLKEM768_CT_BYTES,
    MLKEM768_DK_BYTES, MLKEM768_EK_BYTES, MLKEM_ENCAPS_SEED_BYTES, MLKEM_KEYGEN_SEED_BYTES,
    MLKEM_SHARED_SECRET_BYTES,
};
use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

macro_rules! kyber_scheme {
    (
        $scheme:ident, $kyber:ident, $mlkem:ident,
        $pk:ident, $sk:ident, $ct_ty:ident,
        $name:literal, $ek:expr, $dk:expr, $ct:expr
    ) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $scheme;

        impl $scheme {
            fn public_key(bytes: &[u8]) -> Option<$mlkem::$pk> {
                let bytes: [u8; $ek] = bytes.try_into().ok()?;
                let pk = $mlkem::$pk::from(bytes);
                $mlkem::validate_public_key(&pk).then_some(pk)
            }
        }

        impl KemScheme for $scheme {
            fn name(&self) -> &'static str {
                $name
            }

            fn seed_size(&self) -> usize {
                MLKEM_KEYGEN_SEED_BYTES
            }

            fn encapsulation_seed_size(&self) -> usize {
                MLKEM_ENCAPS_SEED_BYTES
            }

            fn public_key_size(&self) -> usize {
                $ek
            }

            fn secret_key_size(&self) -> usize {
                $dk
            }

            fn ciphertext_size(&self) -> usize {
                $ct
            }

            fn shared_key_size(&self) -> usize {
                MLKEM_SHARED_SECRET_BYTES
            }

            fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)> {
                check_seed(seed, self.seed_size())?;
                let mut randomness = [0u8; MLKEM_KEYGEN_SEED_BYTES];
                randomness.copy_from_slice(seed);
                let key_pair = $kyber::generate_key_pair(randomness);
                zeroize::Zeroize::zeroize(&mut randomness);
                Ok((
                    KemPublicKey::new(self.name(), key_pair.public_key().as_slice().to_vec()),
                    KemSecretKey::new(self.name(), key_pair.private_key().as_slice().to_vec()),
                ))
            }

            fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
                if bytes.len() != $ek {
                    return Err(KemError::MalformedPeerKey(format!(
                        "{} public key must be {} bytes, got {}",
                        $name,
                        $ek,
                        bytes.len()
                    )));
                }
                if Self::public_key(bytes).is_none() {
                    return Err(KemError::MalformedPeerKey(format!(
                        "{} public key has unreduced coefficients",
                        $name
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

                let pk = Self::public_key(public_key.as_bytes()).ok_or_else(|| {
                    KemError::EncapsulationFailed(concat!($name, " public key").into())
                })?;
                let mut randomness = [0u8; MLKEM_ENCAPS_SEED_BYTES];
                randomness.copy_from_slice(seed);
                let (ct, ss) = $kyber::encapsulate(&pk, randomness);
                zeroize::Zeroize::zeroize(&mut randomness);

                Ok((ct.as_slice().to_vec(), SharedSecret::new(ss.to_vec())))
            }

            fn decapsulate(
                &self,
                secret_key: &KemSecretKey,
                ciphertext: &[u8],
            ) -> Result<SharedSecret> {
                check_secret_key_scheme(self.name(), secret_key)?;
                check_ciphertext(ciphertext, $ct)?;

                let sk: [u8; $dk] = secret_key.as_bytes().try_into().map_err(|_| {
                    KemError::DecapsulationFailed(concat!($name, " secret key").into())
                })?;
                let sk = zeroize::Zeroizing::new(sk);
                let sk = $mlkem::$sk::from(*sk);
                let ct: [u8; $ct] = ciphertext.try_into().map_err(|_| {
                    KemError::MalformedCiphertext {
                        expected: $ct,
                        actual: ciphertext.len(),
                    }
                })?;
                let ct = $mlkem::$ct_ty::from(ct);
                let ss = $kyber::decapsulate(&sk, &ct);
                Ok(SharedSecret::new(ss.to_vec()))
            }
        }
    };
}

kyber_scheme!(
    Kyber512Kem,
    kyber512,
    mlkem512,
    MlKem512PublicKey,
    MlKem512PrivateKey,
    MlKem512Ciphertext,
    "Kyber512",
    MLKEM512_EK_BYTES,
    MLKEM512_DK_BYTES,
    MLKEM512_CT_BYTES
);

kyber_scheme!(
    Kyber768Kem,
    kyber768,
    mlkem768,
    MlKem768PublicKey,
    MlKem768PrivateKey,
    MlKem768Ciphertext,
    "Kyber768",
    MLKEM768_EK_BYTES,
    MLKEM768_DK_BYTES,
    MLKEM768_CT_BYTES
);
