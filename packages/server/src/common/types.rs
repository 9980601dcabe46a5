use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifies one wizard flow (one browser tab / session scope).
///
/// Flow ids are generated by the client so a reload of the same tab lands on
/// the same persisted draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(Uuid);

impl FlowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FlowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Hash an identifier (phone number or email) using SHA256
///
/// Storage keys are derived from the hash so raw phone numbers never end up
/// as keys in the scoped store or in logs.
pub fn hash_identifier(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.trim().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_ignores_surrounding_whitespace() {
        assert_eq!(hash_identifier("+15550001111"), hash_identifier(" +15550001111 "));
        assert_eq!(hash_identifier("+15550001111").len(), 64);
    }

    #[test]
    fn different_identifiers_hash_differently() {
        assert_ne!(hash_identifier("+15550001111"), hash_identifier("+15550001112"));
    }

    #[test]
    fn flow_id_round_trips_through_display() {
        let id = FlowId::new();
        let parsed: FlowId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
