//! Identifier and role types shared across the ledgers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User identifier (owner of every record in the system)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role.
///
/// `Participant` submits reports and uploads and spends points;
/// `Authority` reviews pending items across all owners and approves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Authority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Participant => "participant",
            Role::Authority => "authority",
        }
    }

    /// Parse a stored role string; unknown values fall back to participant,
    /// matching registration behavior.
    pub fn parse_or_participant(s: &str) -> Self {
        match s {
            "authority" => Role::Authority,
            _ => Role::Participant,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrip() {
        assert_eq!(Role::parse_or_participant("authority"), Role::Authority);
        assert_eq!(Role::parse_or_participant("participant"), Role::Participant);
        assert_eq!(Role::parse_or_participant("government"), Role::Participant);
        assert_eq!(Role::Authority.as_str(), "authority");
    }
}
