use std::io::Read;

use zeroize::Zeroizing;

use super::key_share::KemPrivateKey;
use crate::error::{KemError, Result};
use crate::groups::GroupId;
use crate::kem::{KemPublicKey, KemScheme};

/// Generate a key pair for `group` using exactly `scheme.seed_size()` bytes
/// from `rng`.
///
/// A short read fails the call with `RandomSourceExhausted`; the key is never
/// derived from a truncated or padded seed. Derivation is deterministic in the
/// seed, and the returned private key is tagged with `group`.
pub fn generate_kem_key_pair(
    scheme: &dyn KemScheme,
    group: GroupId,
    rng: &mut impl Read,
) -> Result<(KemPublicKey, KemPrivateKey)> {
    let needed = scheme.seed_size();
    let mut seed = Zeroizing::new(vec![0u8; needed]);
    rng.read_exact(&mut seed)
        .map_err(|source| KemError::RandomSourceExhausted { needed, source })?;

    let (public_key, secret_key) = scheme.derive_key_pair(&seed)?;
    log::debug!(
        "Generated {} key share for group {} (pk {}…)",
        scheme.name(),
        group,
        hex::encode(&public_key.as_bytes()[..8.min(public_key.as_bytes().len())])
    );

    Ok((public_key, KemPrivateKey { secret_key, group }))
}
