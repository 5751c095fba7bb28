// ── Core identity type ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier for any managed entity.
///
/// The management server issues opaque strings (xid-style); the engine
/// never parses them, only compares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_display_roundtrips_raw_string() {
        let id: EntityId = "ch8i4ug6lnn4g9hqv7m0".parse().unwrap();
        assert_eq!(id.to_string(), "ch8i4ug6lnn4g9hqv7m0");
        assert_eq!(id.as_str(), "ch8i4ug6lnn4g9hqv7m0");
    }

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::from("g1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"g1\"");
    }
}
