/// Initiator side of the key-exchange phase.
///
/// ```text
/// Init ──offer──▶ AwaitingPeer ──on_server_share──▶ OnSelect ──▶ Done(secret)
///                      │                                 └─────▶ Failed(alert)
///                      └──on_retry_request──▶ RetryRequested(group)
/// ```
///
/// No retries happen in here. On a retry request the caller drops this
/// exchange and starts a fresh one offering the requested group. The client
/// remembers every group it advertised in `supported_groups`, including ones
/// sent without a key share, so retry requests can be checked against it.
use std::io::Read;

use super::encapsulate::decapsulate_for_kem;
use super::key_share::{ClassicalPrivateKey, ClientKeyShareStore, PrivateKeyEntry};
use super::keygen::generate_kem_key_pair;
use crate::alert::AlertCode;
use crate::error::{AlertError, KexError};
use crate::groups::{resolve, GroupId};
use crate::kem::SharedSecret;

/// A `key_share` entry: group plus the packed public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShare {
    pub group: GroupId,
    pub key_exchange: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KexPhase {
    Init,
    Offering,
    AwaitingPeer,
    OnSelect,
    Done,
    RetryRequested(GroupId),
    Failed(AlertCode),
}

impl KexPhase {
    fn label(self) -> &'static str {
        match self {
            KexPhase::Init => "Init",
            KexPhase::Offering => "Offering",
            KexPhase::AwaitingPeer => "AwaitingPeer",
            KexPhase::OnSelect => "OnSelect",
            KexPhase::Done => "Done",
            KexPhase::RetryRequested(_) => "RetryRequested",
            KexPhase::Failed(_) => "Failed",
        }
    }
}

/// What to do after a retry request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDirective {
    /// Start a fresh exchange offering only this group. For a non-KEM group
    /// the classical path generates the share and hands it over through
    /// [`ClientKeyExchange::store_classical`].
    Reoffer(GroupId),
}

/// What the peer's selection resolved to.
#[derive(Debug)]
pub enum PeerSelection<'a> {
    /// KEM group: decapsulated, exchange is `Done`.
    Kem(SharedSecret),
    /// Classical group: finish the DH with this key, then call
    /// [`ClientKeyExchange::complete_classical`].
    Classical(&'a ClassicalPrivateKey),
}

#[derive(Debug)]
pub struct ClientKeyExchange {
    phase: KexPhase,
    store: ClientKeyShareStore,
    offered: Vec<GroupId>,
    supported: Vec<GroupId>,
    shared_secret: Option<SharedSecret>,
}

fn fail(phase: &mut KexPhase, alert: AlertCode, cause: impl Into<KexError>) -> AlertError {
    *phase = KexPhase::Failed(alert);
    AlertError::new(alert, cause)
}

impl Default for ClientKeyExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientKeyExchange {
    pub fn new() -> Self {
        Self {
            phase: KexPhase::Init,
            store: ClientKeyShareStore::new(),
            offered: Vec::new(),
            supported: Vec::new(),
            shared_secret: None,
        }
    }

    pub fn phase(&self) -> KexPhase {
        self.phase
    }

    /// Groups that carried a key share.
    pub fn offered_groups(&self) -> &[GroupId] {
        &self.offered
    }

    /// Everything advertised in `supported_groups`, key share or not.
    pub fn supported_groups(&self) -> &[GroupId] {
        &self.supported
    }

    fn note_supported(&mut self, group: GroupId) {
        if !self.supported.contains(&group) {
            self.supported.push(group);
        }
    }

    pub fn store(&self) -> &ClientKeyShareStore {
        &self.store
    }

    pub fn shared_secret(&self) -> Option<&SharedSecret> {
        self.shared_secret.as_ref()
    }

    fn expect_phase(&mut self, expected: KexPhase) -> Result<(), AlertError> {
        if self.phase != expected {
            let actual = self.phase.label();
            return Err(fail(
                &mut self.phase,
                AlertCode::InternalError,
                KexError::InvalidState {
                    expected: expected.label(),
                    actual,
                },
            ));
        }
        Ok(())
    }

    /// Record groups advertised in `supported_groups` without a key share.
    /// Only valid before `offer`.
    pub fn advertise(&mut self, groups: &[GroupId]) -> Result<(), AlertError> {
        self.expect_phase(KexPhase::Init)?;
        for &group in groups {
            self.note_supported(group);
        }
        Ok(())
    }

    /// Register a key share produced by the classical path so that a peer
    /// selecting its group is recognised. Only valid before `offer`.
    pub fn store_classical(&mut self, key: ClassicalPrivateKey) -> Result<(), AlertError> {
        self.expect_phase(KexPhase::Init)?;
        let group = key.group;
        self.store
            .insert(group, key)
            .map_err(AlertError::internal_error)?;
        if !self.offered.contains(&group) {
            self.offered.push(group);
        }
        self.note_supported(group);
        Ok(())
    }

    /// Generate and store a key share for every KEM group in `groups`.
    ///
    /// Groups that do not resolve to a KEM are skipped; they belong to the
    /// classical path. All of `groups` count as advertised. Returns the
    /// shares to put on the wire, in order.
    pub fn offer(
        &mut self,
        groups: &[GroupId],
        rng: &mut impl Read,
    ) -> Result<Vec<KeyShare>, AlertError> {
        self.expect_phase(KexPhase::Init)?;
        self.phase = KexPhase::Offering;

        let mut shares = Vec::with_capacity(groups.len());
        for &group in groups {
            self.note_supported(group);
            if self.store.contains(group) {
                continue;
            }
            let Some(scheme) = resolve(group) else {
                log::debug!("Group {} is not a KEM group, leaving it to the classical path", group);
                continue;
            };
            let (public_key, private_key) = generate_kem_key_pair(scheme, group, rng)
                .map_err(|e| fail(&mut self.phase, AlertCode::InternalError, e))?;
            self.store.insert_kem(private_key);
            self.offered.push(group);
            shares.push(KeyShare {
                group,
                key_exchange: public_key.to_vec(),
            });
        }

        if self.offered.is_empty() {
            return Err(fail(
                &mut self.phase,
                AlertCode::InternalError,
                KexError::NothingToOffer,
            ));
        }

        log::debug!(
            "Offering {} key share(s): {:?}",
            shares.len(),
            shares.iter().map(|s| s.group.to_string()).collect::<Vec<_>>()
        );
        self.phase = KexPhase::AwaitingPeer;
        Ok(shares)
    }

    /// Handle the peer's chosen group and its key-exchange payload.
    ///
    /// For a KEM group the payload is the ciphertext, decapsulated with the
    /// stored key. A group we never offered is an `illegal_parameter`.
    pub fn on_server_share(
        &mut self,
        group: GroupId,
        key_exchange: &[u8],
    ) -> Result<PeerSelection<'_>, AlertError> {
        self.expect_phase(KexPhase::AwaitingPeer)?;
        self.phase = KexPhase::OnSelect;

        match self.store.lookup(group) {
            None => {
                log::warn!("Peer selected group {} which was not offered", group);
                Err(fail(
                    &mut self.phase,
                    AlertCode::IllegalParameter,
                    KexError::UnexpectedGroup(group),
                ))
            }
            Some(PrivateKeyEntry::Classical(key)) => Ok(PeerSelection::Classical(key)),
            Some(PrivateKeyEntry::Kem(key)) => {
                let Some(scheme) = resolve(group) else {
                    return Err(fail(
                        &mut self.phase,
                        AlertCode::InternalError,
                        KexError::UnsupportedGroup(group),
                    ));
                };
                let secret = decapsulate_for_kem(scheme, key, key_exchange).map_err(|e| {
                    self.phase = KexPhase::Failed(e.alert);
                    e
                })?;
                log::debug!("Key exchange complete with group {}", group);
                self.phase = KexPhase::Done;
                self.shared_secret = Some(secret.clone());
                Ok(PeerSelection::Kem(secret))
            }
        }
    }

    /// Finish a classical selection with the DH output computed by the caller.
    pub fn complete_classical(&mut self, shared_secret: SharedSecret) -> Result<(), AlertError> {
        self.expect_phase(KexPhase::OnSelect)?;
        self.shared_secret = Some(shared_secret);
        self.phase = KexPhase::Done;
        Ok(())
    }

    /// Handle a retry request naming `group`.
    ///
    /// The group must have been advertised and must not have carried a key
    /// share already; anything else is an `illegal_parameter`. Classical
    /// groups are fine: the directive hands them back to the caller.
    pub fn on_retry_request(&mut self, group: GroupId) -> Result<RetryDirective, AlertError> {
        self.expect_phase(KexPhase::AwaitingPeer)?;
        if !self.supported.contains(&group) {
            log::warn!("Retry request for group {} which was never advertised", group);
            return Err(fail(
                &mut self.phase,
                AlertCode::IllegalParameter,
                KexError::RetryGroupNotAdvertised(group),
            ));
        }
        if self.offered.contains(&group) {
            log::warn!("Retry request for already-offered group {}", group);
            return Err(fail(
                &mut self.phase,
                AlertCode::IllegalParameter,
                KexError::RetryForOfferedGroup(group),
            ));
        }
        log::debug!(
            "Peer requested retry with {} group {}",
            if resolve(group).is_some() { "KEM" } else { "classical" },
            group
        );
        self.phase = KexPhase::RetryRequested(group);
        self.store.clear();
        Ok(RetryDirective::Reoffer(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::encapsulate::encapsulate_for_kem;
    use crate::groups::{
        DUMMY_KEX, MLKEM768, SECP256R1_MLKEM768, X25519, X25519_KYBER768_DRAFT00,
        X25519_MLKEM768,
    };
    use crate::rng::RngReader;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::io::Cursor;

    fn rng(seed: u8) -> RngReader<ChaCha20Rng> {
        RngReader(ChaCha20Rng::from_seed([seed; 32]))
    }

    #[test]
    fn test_offer_then_decapsulate() {
        let mut client = ClientKeyExchange::new();
        let shares = client
            .offer(&[X25519_MLKEM768, X25519, MLKEM768], &mut rng(1))
            .unwrap();
        assert_eq!(client.phase(), KexPhase::AwaitingPeer);
        assert_eq!(
            shares.iter().map(|s| s.group).collect::<Vec<_>>(),
            vec![X25519_MLKEM768, MLKEM768]
        );
        assert_eq!(client.store().len(), 2);

        let scheme = resolve(MLKEM768).unwrap();
        let (ct, server_secret) =
            encapsulate_for_kem(scheme, &mut rng(2), &shares[1].key_exchange).unwrap();

        match client.on_server_share(MLKEM768, &ct).unwrap() {
            PeerSelection::Kem(secret) => assert_eq!(secret, server_secret),
            other => panic!("unexpected selection {:?}", other),
        }
        assert_eq!(client.phase(), KexPhase::Done);
        assert_eq!(client.shared_secret(), Some(&server_secret));
    }

    #[test]
    fn test_unoffered_group_is_illegal_parameter() {
        let mut client = ClientKeyExchange::new();
        client.offer(&[X25519_MLKEM768], &mut rng(3)).unwrap();
        let err = client.on_server_share(SECP256R1_MLKEM768, &[0u8; 8]).unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
        assert_eq!(client.phase(), KexPhase::Failed(AlertCode::IllegalParameter));
        assert!(client.shared_secret().is_none());
    }

    #[test]
    fn test_bad_ciphertext_fails_exchange() {
        let mut client = ClientKeyExchange::new();
        client.offer(&[X25519_MLKEM768], &mut rng(4)).unwrap();
        let err = client.on_server_share(X25519_MLKEM768, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
        assert_eq!(client.phase(), KexPhase::Failed(AlertCode::IllegalParameter));
    }

    #[test]
    fn test_exhausted_rng_during_offer() {
        let mut client = ClientKeyExchange::new();
        let err = client
            .offer(&[X25519_MLKEM768], &mut Cursor::new(vec![0u8; 10]))
            .unwrap_err();
        assert_eq!(err.alert, AlertCode::InternalError);
        assert_eq!(client.phase(), KexPhase::Failed(AlertCode::InternalError));
    }

    #[test]
    fn test_nothing_to_offer() {
        let mut client = ClientKeyExchange::new();
        let err = client.offer(&[X25519], &mut rng(5)).unwrap_err();
        assert_eq!(err.alert, AlertCode::InternalError);
        assert!(matches!(err.source, KexError::NothingToOffer));
    }

    #[test]
    fn test_classical_selection_is_delegated() {
        let mut client = ClientKeyExchange::new();
        client
            .store_classical(ClassicalPrivateKey::new(X25519, vec![7u8; 32]))
            .unwrap();
        let shares = client.offer(&[X25519, X25519_MLKEM768], &mut rng(6)).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(client.offered_groups(), &[X25519, X25519_MLKEM768]);

        match client.on_server_share(X25519, &[9u8; 32]).unwrap() {
            PeerSelection::Classical(key) => assert_eq!(key.group, X25519),
            other => panic!("unexpected selection {:?}", other),
        }
        assert_eq!(client.phase(), KexPhase::OnSelect);
        client
            .complete_classical(SharedSecret::new(vec![1u8; 32]))
            .unwrap();
        assert_eq!(client.phase(), KexPhase::Done);
    }

    #[test]
    fn test_retry_request() {
        let mut client = ClientKeyExchange::new();
        client.advertise(&[X25519_MLKEM768]).unwrap();
        client.offer(&[DUMMY_KEX], &mut rng(7)).unwrap();
        assert_eq!(client.supported_groups(), &[X25519_MLKEM768, DUMMY_KEX]);
        let directive = client.on_retry_request(X25519_MLKEM768).unwrap();
        assert_eq!(directive, RetryDirective::Reoffer(X25519_MLKEM768));
        assert_eq!(client.phase(), KexPhase::RetryRequested(X25519_MLKEM768));
        assert!(client.store().is_empty());
        assert!(client.shared_secret().is_none());
    }

    #[test]
    fn test_retry_for_offered_group_is_illegal() {
        let mut client = ClientKeyExchange::new();
        client.offer(&[X25519_KYBER768_DRAFT00], &mut rng(8)).unwrap();
        let err = client.on_retry_request(X25519_KYBER768_DRAFT00).unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
        assert!(matches!(err.source, KexError::RetryForOfferedGroup(_)));
    }

    #[test]
    fn test_retry_for_classical_group() {
        let mut client = ClientKeyExchange::new();
        client
            .offer(&[X25519_MLKEM768, X25519], &mut rng(10))
            .unwrap();
        assert_eq!(client.offered_groups(), &[X25519_MLKEM768]);
        let directive = client.on_retry_request(X25519).unwrap();
        assert_eq!(directive, RetryDirective::Reoffer(X25519));
        assert_eq!(client.phase(), KexPhase::RetryRequested(X25519));
    }

    #[test]
    fn test_retry_for_unadvertised_group_is_illegal() {
        let mut client = ClientKeyExchange::new();
        client.offer(&[X25519_MLKEM768], &mut rng(11)).unwrap();
        let err = client.on_retry_request(DUMMY_KEX).unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
        assert!(matches!(err.source, KexError::RetryGroupNotAdvertised(g) if g == DUMMY_KEX));
        assert_eq!(client.phase(), KexPhase::Failed(AlertCode::IllegalParameter));

        let mut client = ClientKeyExchange::new();
        client.offer(&[MLKEM768], &mut rng(12)).unwrap();
        assert!(client.on_retry_request(X25519).is_err());
    }

    #[test]
    fn test_retry_for_classical_share_is_illegal() {
        let mut client = ClientKeyExchange::new();
        client
            .store_classical(ClassicalPrivateKey::new(X25519, vec![7u8; 32]))
            .unwrap();
        client.offer(&[X25519_MLKEM768], &mut rng(13)).unwrap();
        let err = client.on_retry_request(X25519).unwrap_err();
        assert!(matches!(err.source, KexError::RetryForOfferedGroup(_)));
    }

    #[test]
    fn test_advertise_only_before_offer() {
        let mut client = ClientKeyExchange::new();
        client.offer(&[MLKEM768], &mut rng(14)).unwrap();
        let err = client.advertise(&[X25519]).unwrap_err();
        assert_eq!(err.alert, AlertCode::InternalError);
    }

    #[test]
    fn test_calls_out_of_order() {
        let mut client = ClientKeyExchange::new();
        let err = client.on_server_share(X25519_MLKEM768, &[]).unwrap_err();
        assert_eq!(err.alert, AlertCode::InternalError);
        assert!(matches!(err.source, KexError::InvalidState { .. }));

        let mut client = ClientKeyExchange::new();
        client.offer(&[MLKEM768], &mut rng(9)).unwrap();
        assert!(client.offer(&[MLKEM768], &mut rng(9)).is_err());
    }
}
