use thiserror::Error;

use crate::alert::AlertCode;
use crate::groups::GroupId;

/// Failures raised by KEM schemes and the seeded generation/encapsulation path.
#[derive(Error, Debug)]
pub enum KemError {
    #[error("random: needed {needed} bytes: {source}")]
    RandomSourceExhausted {
        needed: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("unpack pk: {0}")]
    MalformedPeerKey(String),
    #[error("malformed ciphertext: expected {expected} bytes, got {actual}")]
    MalformedCiphertext { expected: usize, actual: usize },
    #[error("invalid seed length: expected {expected} bytes, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },
    #[error("encapsulation failed: {0}")]
    EncapsulationFailed(String),
    #[error("decapsulation failed: {0}")]
    DecapsulationFailed(String),
    #[error("key belongs to scheme {actual}, expected {expected}")]
    SchemeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, KemError>;

/// Handshake-level causes that sit above a single KEM operation.
#[derive(Error, Debug)]
pub enum KexError {
    #[error(transparent)]
    Kem(#[from] KemError),
    #[error("peer selected group {0} which was not offered")]
    UnexpectedGroup(GroupId),
    #[error("group {0} is not a supported KEM group")]
    UnsupportedGroup(GroupId),
    #[error("retry requested for group {0} which already carried a key share")]
    RetryForOfferedGroup(GroupId),
    #[error("retry requested for group {0} which was not in supported_groups")]
    RetryGroupNotAdvertised(GroupId),
    #[error("no offered group resolved to a KEM scheme")]
    NothingToOffer,
    #[error("no mutually supported group")]
    NoCommonGroup,
    #[error("more than one key share for group {0}")]
    DuplicateKeyShare(GroupId),
    #[error("key share for group {0} missing from supported_groups")]
    KeyShareNotSupported(GroupId),
    #[error("invalid key-exchange state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    KeyShare(#[from] KeyShareError),
}

/// An alert to send to the peer together with the underlying cause.
#[derive(Error, Debug)]
#[error("{alert}: {source}")]
pub struct AlertError {
    pub alert: AlertCode,
    #[source]
    pub source: KexError,
}

impl AlertError {
    pub fn new(alert: AlertCode, source: impl Into<KexError>) -> Self {
        Self {
            alert,
            source: source.into(),
        }
    }

    pub fn illegal_parameter(source: impl Into<KexError>) -> Self {
        Self::new(AlertCode::IllegalParameter, source)
    }

    pub fn internal_error(source: impl Into<KexError>) -> Self {
        Self::new(AlertCode::InternalError, source)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyShareError {
    #[error("key for group {entry} cannot be stored under group {key}")]
    GroupMismatch { key: GroupId, entry: GroupId },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("group preference list is empty")]
    EmptyPreferences,
    #[error("group {0} listed more than once")]
    DuplicateGroup(GroupId),
    #[error("key_share_limit must be at least 1")]
    ZeroKeyShareLimit,
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("unknown group name: {0}")]
    UnknownGroupName(String),
}
