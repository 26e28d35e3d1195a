use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::groups::{GroupId, SECP256R1, X25519, X25519_MLKEM768};

/// Group preferences for one side of the handshake.
///
/// Preferences are most-preferred first. In JSON a group may be given by
/// number (`4588`) or by name (`"X25519MLKEM768"`, `"0x11ec"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyExchangeConfig {
    #[serde(deserialize_with = "deserialize_groups")]
    pub preferences: Vec<GroupId>,
    /// How many of the leading preferences a client sends key shares for.
    pub key_share_limit: usize,
}

impl Default for KeyExchangeConfig {
    fn default() -> Self {
        Self {
            preferences: vec![X25519_MLKEM768, X25519, SECP256R1],
            key_share_limit: 2,
        }
    }
}

impl KeyExchangeConfig {
    pub fn new(preferences: Vec<GroupId>) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preferences.is_empty() {
            return Err(ConfigError::EmptyPreferences);
        }
        if self.key_share_limit == 0 {
            return Err(ConfigError::ZeroKeyShareLimit);
        }
        for (i, group) in self.preferences.iter().enumerate() {
            if self.preferences[..i].contains(group) {
                return Err(ConfigError::DuplicateGroup(*group));
            }
        }
        Ok(())
    }

    /// Groups a client should send key shares for.
    pub fn client_offer(&self) -> &[GroupId] {
        let n = self.key_share_limit.min(self.preferences.len());
        &self.preferences[..n]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupRef {
    Id(u16),
    Name(String),
}

fn deserialize_groups<'de, D>(deserializer: D) -> Result<Vec<GroupId>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<GroupRef>::deserialize(deserializer)?
        .into_iter()
        .map(|g| match g {
            GroupRef::Id(id) => Ok(GroupId(id)),
            GroupRef::Name(name) => name.parse().map_err(serde::de::Error::custom),
        })
        .collect()
}
