/// Per-handshake storage of locally generated private keys.
///
/// One store lives for exactly one handshake attempt: created when the
/// key-exchange phase starts, filled while offering, read once the peer's
/// group is known, and dropped (secrets zeroized) at teardown.
use std::collections::HashMap;

use zeroize::Zeroizing;

use crate::error::KeyShareError;
use crate::groups::GroupId;
use crate::kem::KemSecretKey;

/// Private key produced by the classical ECDHE path (not generated here).
pub struct ClassicalPrivateKey {
    pub group: GroupId,
    pub secret: Zeroizing<Vec<u8>>,
}

impl ClassicalPrivateKey {
    pub fn new(group: GroupId, secret: Vec<u8>) -> Self {
        Self {
            group,
            secret: Zeroizing::new(secret),
        }
    }
}

impl std::fmt::Debug for ClassicalPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassicalPrivateKey")
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// KEM secret key tagged with the group it was generated for.
#[derive(Debug)]
pub struct KemPrivateKey {
    pub secret_key: KemSecretKey,
    pub group: GroupId,
}

#[derive(Debug)]
pub enum PrivateKeyEntry {
    Classical(ClassicalPrivateKey),
    Kem(KemPrivateKey),
}

impl PrivateKeyEntry {
    pub fn group(&self) -> GroupId {
        match self {
            PrivateKeyEntry::Classical(k) => k.group,
            PrivateKeyEntry::Kem(k) => k.group,
        }
    }
}

impl From<KemPrivateKey> for PrivateKeyEntry {
    fn from(k: KemPrivateKey) -> Self {
        PrivateKeyEntry::Kem(k)
    }
}

impl From<ClassicalPrivateKey> for PrivateKeyEntry {
    fn from(k: ClassicalPrivateKey) -> Self {
        PrivateKeyEntry::Classical(k)
    }
}

#[derive(Debug, Default)]
pub struct ClientKeyShareStore {
    keys: HashMap<GroupId, PrivateKeyEntry>,
}

impl ClientKeyShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under `group`. The entry's own group tag must match, so
    /// a key can never be filed under a group that did not generate it.
    /// Re-inserting a group replaces the previous key.
    pub fn insert(
        &mut self,
        group: GroupId,
        entry: impl Into<PrivateKeyEntry>,
    ) -> Result<(), KeyShareError> {
        let entry = entry.into();
        if entry.group() != group {
            return Err(KeyShareError::GroupMismatch {
                key: group,
                entry: entry.group(),
            });
        }
        self.keys.insert(group, entry);
        Ok(())
    }

    /// Store a KEM key under its own group tag.
    pub fn insert_kem(&mut self, key: KemPrivateKey) {
        self.keys.insert(key.group, PrivateKeyEntry::Kem(key));
    }

    /// `None` is the normal outcome for a group the peer did not select.
    pub fn lookup(&self, group: GroupId) -> Option<&PrivateKeyEntry> {
        self.keys.get(&group)
    }

    pub fn kem_key(&self, group: GroupId) -> Option<&KemPrivateKey> {
        match self.keys.get(&group)? {
            PrivateKeyEntry::Kem(k) => Some(k),
            PrivateKeyEntry::Classical(_) => None,
        }
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.keys.contains_key(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.keys.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
