/// Responder side: pick a group from the client's offer.
///
/// Preferences cover every group the server supports. KEM groups are
/// encapsulated here; a classical group wins the same way but its DH stays
/// with the handshake core.
use std::io::Read;

use super::client::KeyShare;
use super::encapsulate::encapsulate_for_kem;
use crate::alert::AlertCode;
use crate::config::KeyExchangeConfig;
use crate::error::{AlertError, ConfigError, KexError};
use crate::groups::{resolve, GroupId};
use crate::kem::SharedSecret;

#[derive(Debug)]
pub enum ServerDecision {
    /// Encapsulated to the client's key share; `ciphertext` goes back on the wire.
    Accept {
        group: GroupId,
        ciphertext: Vec<u8>,
        shared_secret: SharedSecret,
    },
    /// The client's share for a non-KEM `group` was selected; the classical
    /// path completes the DH.
    Classical { group: GroupId },
    /// No usable key share, but the client supports `group`.
    RetryRequest { group: GroupId },
}

#[derive(Debug, Clone)]
pub struct ServerKeyExchange {
    preferences: Vec<GroupId>,
}

impl ServerKeyExchange {
    pub fn new(config: &KeyExchangeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            preferences: config.preferences.clone(),
        })
    }

    /// Groups this server will select, most preferred first.
    pub fn preferences(&self) -> &[GroupId] {
        &self.preferences
    }

    pub fn respond(
        &self,
        key_shares: &[KeyShare],
        client_supported: &[GroupId],
        rng: &mut impl Read,
    ) -> Result<ServerDecision, AlertError> {
        for (i, share) in key_shares.iter().enumerate() {
            if key_shares[..i].iter().any(|s| s.group == share.group) {
                log::warn!("Client sent duplicate key share for {}", share.group);
                return Err(AlertError::illegal_parameter(KexError::DuplicateKeyShare(
                    share.group,
                )));
            }
            if !client_supported.contains(&share.group) {
                log::warn!("Client key share for {} not in supported groups", share.group);
                return Err(AlertError::illegal_parameter(
                    KexError::KeyShareNotSupported(share.group),
                ));
            }
        }

        for &group in &self.preferences {
            let Some(share) = key_shares.iter().find(|s| s.group == group) else {
                continue;
            };
            let Some(scheme) = resolve(group) else {
                log::debug!("Selected classical group {} from client key shares", group);
                return Ok(ServerDecision::Classical { group });
            };
            let (ciphertext, shared_secret) =
                encapsulate_for_kem(scheme, rng, &share.key_exchange)?;
            log::debug!("Selected group {} from client key shares", group);
            return Ok(ServerDecision::Accept {
                group,
                ciphertext,
                shared_secret,
            });
        }

        if let Some(&group) = self
            .preferences
            .iter()
            .find(|g| client_supported.contains(g))
        {
            log::debug!("No acceptable key share, requesting retry with {}", group);
            return Ok(ServerDecision::RetryRequest { group });
        }

        log::warn!("No common group with client");
        Err(AlertError::new(
            AlertCode::HandshakeFailure,
            KexError::NoCommonGroup,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::client::{ClientKeyExchange, KexPhase, PeerSelection, RetryDirective};
    use crate::exchange::key_share::ClassicalPrivateKey;
    use crate::groups::{
        DUMMY_KEX, MLKEM768, P256_KYBER768_DRAFT00, SECP256R1, SECP256R1_MLKEM768, X25519,
        X25519_MLKEM768,
    };
    use crate::rng::RngReader;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng(seed: u8) -> RngReader<ChaCha20Rng> {
        RngReader(ChaCha20Rng::from_seed([seed; 32]))
    }

    fn default_server() -> ServerKeyExchange {
        ServerKeyExchange::new(&KeyExchangeConfig::default()).unwrap()
    }

    fn client_secret(selection: PeerSelection<'_>) -> SharedSecret {
        match selection {
            PeerSelection::Kem(secret) => secret,
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_preferences_keep_every_group() {
        assert_eq!(
            default_server().preferences(),
            &[X25519_MLKEM768, X25519, SECP256R1]
        );
    }

    #[test]
    fn test_classical_share_is_selected() {
        let server = default_server();
        let shares = [KeyShare {
            group: X25519,
            key_exchange: vec![9u8; 32],
        }];
        match server.respond(&shares, &[X25519], &mut rng(14)).unwrap() {
            ServerDecision::Classical { group } => assert_eq!(group, X25519),
            other => panic!("expected classical selection, got {:?}", other),
        }
    }

    #[test]
    fn test_preference_order_spans_kem_and_classical() {
        let mut client = ClientKeyExchange::new();
        client
            .store_classical(ClassicalPrivateKey::new(X25519, vec![7u8; 32]))
            .unwrap();
        let mut shares = client.offer(&[X25519_MLKEM768], &mut rng(15)).unwrap();
        shares.push(KeyShare {
            group: X25519,
            key_exchange: vec![9u8; 32],
        });
        let supported = client.supported_groups().to_vec();

        let kem_first = default_server();
        assert!(matches!(
            kem_first.respond(&shares, &supported, &mut rng(16)).unwrap(),
            ServerDecision::Accept { group, .. } if group == X25519_MLKEM768
        ));

        let classical_first =
            ServerKeyExchange::new(&KeyExchangeConfig::new(vec![X25519, X25519_MLKEM768]))
                .unwrap();
        assert!(matches!(
            classical_first.respond(&shares, &supported, &mut rng(17)).unwrap(),
            ServerDecision::Classical { group } if group == X25519
        ));
        match client.on_server_share(X25519, &[0u8; 32]).unwrap() {
            PeerSelection::Classical(key) => assert_eq!(key.group, X25519),
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_retry_request_for_classical_group() {
        let server = default_server();
        let mut client = ClientKeyExchange::new();
        let shares = client.offer(&[MLKEM768, X25519], &mut rng(18)).unwrap();
        let group = match server
            .respond(&shares, client.supported_groups(), &mut rng(19))
            .unwrap()
        {
            ServerDecision::RetryRequest { group } => group,
            other => panic!("expected retry request, got {:?}", other),
        };
        assert_eq!(group, X25519);
        assert_eq!(
            client.on_retry_request(group).unwrap(),
            RetryDirective::Reoffer(X25519)
        );
    }

    #[test]
    fn test_accept_and_agree() {
        let server = ServerKeyExchange::new(&KeyExchangeConfig::new(vec![
            SECP256R1_MLKEM768,
            X25519_MLKEM768,
        ]))
        .unwrap();
        let mut client = ClientKeyExchange::new();
        let supported = [X25519_MLKEM768, SECP256R1_MLKEM768];
        let shares = client.offer(&supported, &mut rng(1)).unwrap();

        let (group, ciphertext, shared_secret) =
            match server.respond(&shares, &supported, &mut rng(2)).unwrap() {
                ServerDecision::Accept {
                    group,
                    ciphertext,
                    shared_secret,
                } => (group, ciphertext, shared_secret),
                other => panic!("expected accept, got {:?}", other),
            };
        // Server preference wins over client order.
        assert_eq!(group, SECP256R1_MLKEM768);

        let secret = client_secret(client.on_server_share(group, &ciphertext).unwrap());
        assert_eq!(secret, shared_secret);
        assert_eq!(client.phase(), KexPhase::Done);
    }

    #[test]
    fn test_dummy_only_offer_gets_retry_request() {
        let server = default_server();
        let supported = [DUMMY_KEX, X25519_MLKEM768];

        let mut client = ClientKeyExchange::new();
        client.advertise(&supported).unwrap();
        let shares = client.offer(&[DUMMY_KEX], &mut rng(3)).unwrap();
        let group = match server.respond(&shares, &supported, &mut rng(4)).unwrap() {
            ServerDecision::RetryRequest { group } => group,
            other => panic!("dummy group must never be accepted, got {:?}", other),
        };
        assert_eq!(group, X25519_MLKEM768);

        let RetryDirective::Reoffer(group) = client.on_retry_request(group).unwrap();
        let mut client = ClientKeyExchange::new();
        let shares = client.offer(&[group], &mut rng(5)).unwrap();
        let (group, ciphertext, shared_secret) =
            match server.respond(&shares, &supported, &mut rng(6)).unwrap() {
                ServerDecision::Accept {
                    group,
                    ciphertext,
                    shared_secret,
                } => (group, ciphertext, shared_secret),
                other => panic!("expected accept after retry, got {:?}", other),
            };
        let secret = client_secret(client.on_server_share(group, &ciphertext).unwrap());
        assert_eq!(secret, shared_secret);
    }

    #[test]
    fn test_no_common_group_is_handshake_failure() {
        let server = default_server();
        let mut client = ClientKeyExchange::new();
        let shares = client.offer(&[DUMMY_KEX], &mut rng(7)).unwrap();
        let err = server.respond(&shares, &[DUMMY_KEX], &mut rng(8)).unwrap_err();
        assert_eq!(err.alert, AlertCode::HandshakeFailure);
        assert!(matches!(err.source, KexError::NoCommonGroup));
    }

    #[test]
    fn test_malformed_share_is_illegal_parameter() {
        let server = default_server();
        let shares = [KeyShare {
            group: X25519_MLKEM768,
            key_exchange: vec![0u8; 31],
        }];
        let err = server
            .respond(&shares, &[X25519_MLKEM768], &mut rng(9))
            .unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
    }

    #[test]
    fn test_share_validation() {
        let server = default_server();
        let share = KeyShare {
            group: MLKEM768,
            key_exchange: vec![1u8; 4],
        };

        let err = server
            .respond(&[share.clone(), share.clone()], &[MLKEM768], &mut rng(10))
            .unwrap_err();
        assert!(matches!(err.source, KexError::DuplicateKeyShare(g) if g == MLKEM768));

        let err = server
            .respond(&[share], &[X25519_MLKEM768], &mut rng(11))
            .unwrap_err();
        assert_eq!(err.alert, AlertCode::IllegalParameter);
        assert!(matches!(err.source, KexError::KeyShareNotSupported(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert_eq!(
            ServerKeyExchange::new(&KeyExchangeConfig::new(vec![])).unwrap_err(),
            ConfigError::EmptyPreferences
        );
        // Classical-only preferences are valid config; the KEM share is
        // passed over for a group the client also supports.
        let server =
            ServerKeyExchange::new(&KeyExchangeConfig::new(vec![X25519, SECP256R1])).unwrap();
        assert_eq!(server.preferences(), &[X25519, SECP256R1]);
        let mut client = ClientKeyExchange::new();
        let shares = client.offer(&[P256_KYBER768_DRAFT00], &mut rng(12)).unwrap();
        assert!(matches!(
            server
                .respond(&shares, &[P256_KYBER768_DRAFT00, X25519], &mut rng(13))
                .unwrap(),
            ServerDecision::RetryRequest { group } if group == X25519
        ));
        let err = server
            .respond(&shares, &[P256_KYBER768_DRAFT00], &mut rng(13))
            .unwrap_err();
        assert_eq!(err.alert, AlertCode::HandshakeFailure);
    }
}
