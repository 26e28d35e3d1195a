/// NIST P-256 ECDH presented as a KEM.
///
/// Points travel in SEC1 uncompressed form (0x04 ‖ x ‖ y, 65 bytes). Scalars
/// are drawn from a SHAKE256 stream over the seed, rejecting candidates that
/// are zero or not below the group order.
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use zeroize::Zeroizing;

use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use crate::error::{KemError, Result};

pub const P256_SCALAR_BYTES: usize = 32;
pub const P256_POINT_BYTES: usize = 65;

#[derive(Debug, Default, Clone, Copy)]
pub struct P256Kem;

fn secret_from_seed(seed: &[u8]) -> SecretKey {
    let mut hasher = sha3::Shake256::default();
    hasher.update(seed);
    let mut reader = hasher.finalize_xof();
    let mut candidate = Zeroizing::new([0u8; P256_SCALAR_BYTES]);
    loop {
        reader.read(&mut candidate[..]);
        if let Ok(sk) = SecretKey::from_slice(&candidate[..]) {
            return sk;
        }
    }
}

fn encode_point(pk: &PublicKey) -> Vec<u8> {
    pk.to_encoded_point(false).as_bytes().to_vec()
}

fn parse_point(bytes: &[u8]) -> std::result::Result<PublicKey, String> {
    if bytes.len() != P256_POINT_BYTES {
        return Err(format!(
            "P-256 point must be {} bytes, got {}",
            P256_POINT_BYTES,
            bytes.len()
        ));
    }
    PublicKey::from_sec1_bytes(bytes).map_err(|_| "P-256 point is not on the curve".to_string())
}

impl KemScheme for P256Kem {
    fn name(&self) -> &'static str {
        "P-256"
    }

    fn seed_size(&self) -> usize {
        P256_SCALAR_BYTES
    }

    fn encapsulation_seed_size(&self) -> usize {
        P256_SCALAR_BYTES
    }

    fn public_key_size(&self) -> usize {
        P256_POINT_BYTES
    }

    fn secret_key_size(&self) -> usize {
        P256_SCALAR_BYTES
    }

    fn ciphertext_size(&self) -> usize {
        P256_POINT_BYTES
    }

    fn shared_key_size(&self) -> usize {
        P256_SCALAR_BYTES
    }

    fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)> {
        check_seed(seed, self.seed_size())?;
        let secret = secret_from_seed(seed);
        let public = secret.public_key();
        Ok((
            KemPublicKey::new(self.name(), encode_point(&public)),
            KemSecretKey::new(self.name(), secret.to_bytes().to_vec()),
        ))
    }

    fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
        parse_point(bytes).map_err(KemError::MalformedPeerKey)?;
        Ok(KemPublicKey::new(self.name(), bytes.to_vec()))
    }

    fn encapsulate_deterministically(
        &self,
        public_key: &KemPublicKey,
        seed: &[u8],
    ) -> Result<(Vec<u8>, SharedSecret)> {
        check_public_key_scheme(self.name(), public_key)?;
        check_seed(seed, self.encapsulation_seed_size())?;

        let peer = parse_point(public_key.as_bytes()).map_err(KemError::EncapsulationFailed)?;
        let ephemeral = secret_from_seed(seed);
        let shared = diffie_hellman(ephemeral.to_nonzero_scalar(), peer.as_affine());

        Ok((
            encode_point(&ephemeral.public_key()),
            SharedSecret::new(shared.raw_secret_bytes().to_vec()),
        ))
    }

    fn decapsulate(&self, secret_key: &KemSecretKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        check_secret_key_scheme(self.name(), secret_key)?;
        check_ciphertext(ciphertext, self.ciphertext_size())?;

        let secret = SecretKey::from_slice(secret_key.as_bytes())
            .map_err(|_| KemError::DecapsulationFailed("bad P-256 secret key".into()))?;
        let peer = parse_point(ciphertext).map_err(KemError::DecapsulationFailed)?;
        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        Ok(SharedSecret::new(shared.raw_secret_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let kem = P256Kem;
        let (pk, sk) = kem.derive_key_pair(&[5u8; 32]).unwrap();
        assert_eq!(pk.as_bytes().len(), P256_POINT_BYTES);
        assert_eq!(pk.as_bytes()[0], 0x04);

        let (ct, ss) = kem.encapsulate_deterministically(&pk, &[6u8; 32]).unwrap();
        assert_eq!(ct.len(), P256_POINT_BYTES);
        assert_eq!(ss.len(), 32);
        assert_eq!(kem.decapsulate(&sk, &ct).unwrap(), ss);
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let kem = P256Kem;
        let mut bogus = vec![0x04];
        bogus.extend_from_slice(&[0x11; 64]);
        assert!(matches!(
            kem.unmarshal_public_key(&bogus),
            Err(KemError::MalformedPeerKey(_))
        ));
        assert!(matches!(
            kem.unmarshal_public_key(&[]),
            Err(KemError::MalformedPeerKey(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let kem = P256Kem;
        let (pk, _) = kem.derive_key_pair(&[8u8; 32]).unwrap();
        let a = kem.encapsulate_deterministically(&pk, &[1u8; 32]).unwrap();
        let b = kem.encapsulate_deterministically(&pk, &[1u8; 32]).unwrap();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }
}
