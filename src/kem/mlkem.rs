/// ML-KEM (NIST FIPS 203) backed by the RustCrypto `ml-kem` crate.
///
/// Key generation consumes the 64-byte FIPS 203 seed `d ‖ z`; encapsulation
/// consumes the 32-byte message seed `m`.
///
/// Sizes:
///
/// | Parameter set | Public key | Secret key | Ciphertext | Shared secret |
/// |---------------|-----------:|-----------:|-----------:|--------------:|
/// | ML-KEM-768    |       1184 |       2400 |       1088 |            32 |
///
/// The 512 sizes below are only used by Kyber-512, which shares them.
use ml_kem::kem::{Decapsulate, DecapsulationKey, EncapsulationKey};
use ml_kem::{
    Ciphertext, EncapsulateDeterministic, Encoded, EncodedSizeUser, KemCore, MlKem768,
    MlKem768Params, B32,
};

use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

pub const MLKEM_KEYGEN_SEED_BYTES: usize = 64;
pub const MLKEM_ENCAPS_SEED_BYTES: usize = 32;
pub const MLKEM_SHARED_SECRET_BYTES: usize = 32;

pub const MLKEM512_EK_BYTES: usize = 800;
pub const MLKEM512_DK_BYTES: usize = 1632;
pub const MLKEM512_CT_BYTES: usize = 768;

pub const MLKEM768_EK_BYTES: usize = 1184;
pub const MLKEM768_DK_BYTES: usize = 2400;
pub const MLKEM768_CT_BYTES: usize = 1088;

fn b32(bytes: &[u8]) -> Result<B32> {
    B32::try_from(bytes).map_err(|_| KemError::InvalidSeedLength {
        expected: 32,
        actual: bytes.len(),
    })
}

macro_rules! ml_kem_scheme {
    ($scheme:ident, $kem:ty, $params:ty, $name:literal, $ek:expr, $dk:expr, $ct:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $scheme;

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
                let d = b32(&seed[..32])?;
                let z = b32(&seed[32..])?;
                let (dk, ek) = <$kem>::generate_deterministic(&d, &z);
                Ok((
                    KemPublicKey::new(self.name(), ek.as_bytes().to_vec()),
                    KemSecretKey::new(self.name(), dk.as_bytes().to_vec()),
                ))
            }

            fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
                let encoded = Encoded::<EncapsulationKey<$params>>::try_from(bytes).map_err(|_| {
                    KemError::MalformedPeerKey(format!(
                        "{} public key must be {} bytes, got {}",
                        $name,
                        $ek,
                        bytes.len()
                    ))
                })?;
                // FIPS 203 modulus check: decoding reduces mod q, so a key
                // with any coefficient >= q does not re-encode to itself.
                let ek = EncapsulationKey::<$params>::from_bytes(&encoded);
                if ek.as_bytes().as_slice() != bytes {
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

                let encoded =
                    Encoded::<EncapsulationKey<$params>>::try_from(public_key.as_bytes())
                        .map_err(|_| {
                            KemError::EncapsulationFailed(concat!($name, " public key").into())
                        })?;
                let ek = EncapsulationKey::<$params>::from_bytes(&encoded);
                let m = b32(seed)?;
                let (ct, ss) = ek
                    .encapsulate_deterministic(&m)
                    .map_err(|e| KemError::EncapsulationFailed(format!("{:?}", e)))?;

                Ok((ct.to_vec(), SharedSecret::new(ss.to_vec())))
            }

            fn decapsulate(
                &self,
                secret_key: &KemSecretKey,
                ciphertext: &[u8],
            ) -> Result<SharedSecret> {
                check_secret_key_scheme(self.name(), secret_key)?;
                check_ciphertext(ciphertext, $ct)?;

                let encoded =
                    Encoded::<DecapsulationKey<$params>>::try_from(secret_key.as_bytes())
                        .map_err(|_| {
                            KemError::DecapsulationFailed(concat!($name, " secret key").into())
                        })?;
                let dk = DecapsulationKey::<$params>::from_bytes(&encoded);
                let ct = Ciphertext::<$kem>::try_from(ciphertext).map_err(|_| {
                    KemError::MalformedCiphertext {
                        expected: $ct,
                        actual: ciphertext.len(),
                    }
                })?;
                let ss = dk
                    .decapsulate(&ct)
                    .map_err(|e| KemError::DecapsulationFailed(format!("{:?}", e)))?;
                Ok(SharedSecret::new(ss.to_vec()))
            }
        }
    };
}

ml_kem_scheme!(
    MlKem768Kem,
    MlKem768,
    MlKem768Params,
    "ML-KEM-768",
    MLKEM768_EK_BYTES,
    MLKEM768_DK_BYTES,
    MLKEM768_CT_BYTES
);

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> [u8; MLKEM_KEYGEN_SEED_BYTES] {
        [byte; MLKEM_KEYGEN_SEED_BYTES]
    }

    #[test]
    fn test_ml_kem_768_sizes() {
        let kem = MlKem768Kem;
        let (pk, sk) = kem.derive_key_pair(&seed(1)).unwrap();
        assert_eq!(pk.as_bytes().len(), MLKEM768_EK_BYTES);
        assert_eq!(sk.as_bytes().len(), MLKEM768_DK_BYTES);

        let (ct, ss) = kem.encapsulate_deterministically(&pk, &[2u8; 32]).unwrap();
        assert_eq!(ct.len(), MLKEM768_CT_BYTES);
        assert_eq!(ss.len(), MLKEM_SHARED_SECRET_BYTES);
    }

    #[test]
    fn test_ml_kem_768_roundtrip() {
        let kem = MlKem768Kem;
        let (pk, sk) = kem.derive_key_pair(&seed(5)).unwrap();
        let (ct, ss) = kem.encapsulate_deterministically(&pk, &[6u8; 32]).unwrap();
        assert_eq!(kem.decapsulate(&sk, &ct).unwrap(), ss);
    }

    #[test]
    fn test_deterministic_generation() {
        let kem = MlKem768Kem;
        let (pk1, _) = kem.derive_key_pair(&seed(9)).unwrap();
        let (pk2, _) = kem.derive_key_pair(&seed(9)).unwrap();
        let (pk3, _) = kem.derive_key_pair(&seed(10)).unwrap();
        assert_eq!(pk1, pk2);
        assert_ne!(pk1, pk3);
    }

    #[test]
    fn test_parameter_sets_do_not_mix() {
        let (pk512, _) = crate::kem::Kyber512Kem.derive_key_pair(&seed(1)).unwrap();
        assert!(matches!(
            MlKem768Kem.encapsulate_deterministically(&pk512, &[0u8; 32]),
            Err(KemError::SchemeMismatch { .. })
        ));
        assert!(matches!(
            MlKem768Kem.unmarshal_public_key(pk512.as_bytes()),
            Err(KemError::MalformedPeerKey(_))
        ));
    }

    #[test]
    fn test_ml_kem_768_known_answer() {
        use sha2::{Digest, Sha256};

        let kem = MlKem768Kem;
        let seed: Vec<u8> = (0u8..64).collect();
        let (pk, sk) = kem.derive_key_pair(&seed).unwrap();
        assert_eq!(
            hex::encode(Sha256::digest(pk.as_bytes())),
            "0b7934c83125c788995e2ba6bd761e33046b3e40571be53e023309a29f398cc9"
        );
        let (ct, ss) = kem.encapsulate_deterministically(&pk, &[0x2a; 32]).unwrap();
        assert_eq!(
            hex::encode(Sha256::digest(&ct)),
            "9308837aed3c0c5519ca76de5e08312276bb1914a9c752918233fe281450a099"
        );
        assert_eq!(
            hex::encode(ss.as_bytes()),
            "f40e35e69783d6e5a257bf2408d52a59fb40327c38b1959a9c1bfbd2fb6326ee"
        );
        assert_eq!(kem.decapsulate(&sk, &ct).unwrap(), ss);
    }

    #[test]
    fn test_unreduced_public_key_rejected() {
        // 0xFF.. decodes to coefficients 4095 >= q.
        assert!(matches!(
            MlKem768Kem.unmarshal_public_key(&[0xff; MLKEM768_EK_BYTES]),
            Err(KemError::MalformedPeerKey(_))
        ));

        let (pk, _) = MlKem768Kem.derive_key_pair(&seed(4)).unwrap();
        assert!(MlKem768Kem.unmarshal_public_key(pk.as_bytes()).is_ok());
        let mut bytes = pk.as_bytes().to_vec();
        // First coefficient set to 0xfff.
        bytes[0] = 0xff;
        bytes[1] |= 0x0f;
        assert!(matches!(
            MlKem768Kem.unmarshal_public_key(&bytes),
            Err(KemError::MalformedPeerKey(_))
        ));
    }

    #[test]
    fn test_invalid_ciphertext_length() {
        let kem = MlKem768Kem;
        let (_, sk) = kem.derive_key_pair(&seed(1)).unwrap();
        assert!(matches!(
            kem.decapsulate(&sk, &[0u8; MLKEM768_CT_BYTES - 1]),
            Err(KemError::MalformedCiphertext { .. })
        ));
    }
}
