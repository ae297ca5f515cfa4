//! Normalized wallet address used as the identity key for every stored value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A wallet address, trimmed and lowercased.
///
/// Wallets hand out checksummed mixed-case addresses while backends and
/// explorers often return lowercase ones, so both must land on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserKey(String);

impl UserKey {
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        let normalized = address.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "address".into(),
                message: "wallet address must not be empty".into(),
            });
        }
        if normalized.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidValue {
                field: "address".into(),
                message: format!("wallet address contains whitespace: {address:?}"),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this user under `prefix`.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserKey> for String {
    fn from(key: UserKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for UserKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
