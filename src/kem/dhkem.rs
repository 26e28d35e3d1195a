/// DHKEM(X25519, HKDF-SHA256) from RFC 9180 (HPKE), KEM id 0x0020.
///
/// Registered locally under the reserved test group. It is a perfectly valid
/// KEM, but no compliant peer advertises it under that group id.
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::scheme::{
    check_ciphertext, check_public_key_scheme, check_secret_key_scheme, check_seed, KemScheme,
};
use super::types::{KemPublicKey, KemSecretKey, SharedSecret};
use super::x25519::{to_array, X25519_KEY_BYTES};
use crate::error::{KemError, Result};

const HPKE_VERSION: &[u8] = b"HPKE-v1";
/// "KEM" ‖ I2OSP(0x0020, 2)
const SUITE_ID: &[u8] = b"KEM\x00\x20";
const SHARED_SECRET_BYTES: usize = 32;

#[derive(Debug, Default, Clone, Copy)]
pub struct DhKemX25519HkdfSha256;

/// LabeledExtract("", label, ikm) followed by LabeledExpand(prk, label2, info, L).
fn labeled_extract_expand(
    extract_label: &[u8],
    ikm: &[u8],
    expand_label: &[u8],
    info: &[u8],
    out: &mut [u8],
) -> Result<()> {
    let mut labeled_ikm = Zeroizing::new(Vec::with_capacity(
        HPKE_VERSION.len() + SUITE_ID.len() + extract_label.len() + ikm.len(),
    ));
    labeled_ikm.extend_from_slice(HPKE_VERSION);
    labeled_ikm.extend_from_slice(SUITE_ID);
    labeled_ikm.extend_from_slice(extract_label);
    labeled_ikm.extend_from_slice(ikm);
    let (_, hk) = Hkdf::<Sha256>::extract(None, &labeled_ikm);

    let len = u16::try_from(out.len())
        .map_err(|_| KemError::EncapsulationFailed("HKDF output too long".into()))?;
    let mut labeled_info = Vec::with_capacity(2 + HPKE_VERSION.len() + SUITE_ID.len() + 32);
    labeled_info.extend_from_slice(&len.to_be_bytes());
    labeled_info.extend_from_slice(HPKE_VERSION);
    labeled_info.extend_from_slice(SUITE_ID);
    labeled_info.extend_from_slice(expand_label);
    labeled_info.extend_from_slice(info);

    hk.expand(&labeled_info, out)
        .map_err(|_| KemError::EncapsulationFailed("HKDF expansion failed".into()))
}

fn derive_secret(ikm: &[u8]) -> Result<StaticSecret> {
    let mut sk = Zeroizing::new([0u8; X25519_KEY_BYTES]);
    labeled_extract_expand(b"dkp_prk", ikm, b"sk", b"", &mut sk[..])?;
    Ok(StaticSecret::from(*sk))
}

fn extract_and_expand(dh: &[u8], enc: &[u8], pk_r: &[u8]) -> Result<SharedSecret> {
    let mut kem_context = Vec::with_capacity(enc.len() + pk_r.len());
    kem_context.extend_from_slice(enc);
    kem_context.extend_from_slice(pk_r);

    let mut ss = vec![0u8; SHARED_SECRET_BYTES];
    labeled_extract_expand(b"eae_prk", dh, b"shared_secret", &kem_context, &mut ss)?;
    Ok(SharedSecret::new(ss))
}

impl KemScheme for DhKemX25519HkdfSha256 {
    fn name(&self) -> &'static str {
        "DHKEM(X25519, HKDF-SHA256)"
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
        SHARED_SECRET_BYTES
    }

    fn derive_key_pair(&self, seed: &[u8]) -> Result<(KemPublicKey, KemSecretKey)> {
        check_seed(seed, self.seed_size())?;
        let secret = derive_secret(seed)?;
        let public = PublicKey::from(&secret);
        Ok((
            KemPublicKey::new(self.name(), public.to_bytes().to_vec()),
            KemSecretKey::new(self.name(), secret.to_bytes().to_vec()),
        ))
    }

    fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<KemPublicKey> {
        if bytes.len() != X25519_KEY_BYTES {
            return Err(KemError::MalformedPeerKey(format!(
                "DHKEM X25519 public key must be {} bytes, got {}",
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

        let pk_r = to_array(public_key.as_bytes())
            .ok_or_else(|| KemError::EncapsulationFailed("bad DHKEM public key".into()))?;
        let sk_e = derive_secret(seed)?;
        let enc = PublicKey::from(&sk_e).to_bytes();

        let dh = sk_e.diffie_hellman(&PublicKey::from(pk_r));
        if !dh.was_contributory() {
            return Err(KemError::EncapsulationFailed(
                "DHKEM produced an all-zero DH output".into(),
            ));
        }
        let ss = extract_and_expand(dh.as_bytes(), &enc, &pk_r)?;
        Ok((enc.to_vec(), ss))
    }

    fn decapsulate(&self, secret_key: &KemSecretKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        check_secret_key_scheme(self.name(), secret_key)?;
        check_ciphertext(ciphertext, self.ciphertext_size())?;

        let sk = Zeroizing::new(
            to_array(secret_key.as_bytes())
                .ok_or_else(|| KemError::DecapsulationFailed("bad DHKEM secret key".into()))?,
        );
        let sk_r = StaticSecret::from(*sk);
        let pk_r = PublicKey::from(&sk_r).to_bytes();
        let enc = to_array(ciphertext).ok_or(KemError::MalformedCiphertext {
            expected: X25519_KEY_BYTES,
            actual: ciphertext.len(),
        })?;

        let dh = sk_r.diffie_hellman(&PublicKey::from(enc));
        if !dh.was_contributory() {
            return Err(KemError::DecapsulationFailed(
                "DHKEM produced an all-zero DH output".into(),
            ));
        }
        extract_and_expand(dh.as_bytes(), &enc, &pk_r)
            .map_err(|e| KemError::DecapsulationFailed(e.to_string()))
    }
}
