use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of any entity in the document.
///
/// Ids are kept in one canonical form, a string. Stored documents may carry
/// numeric ids (millisecond timestamps) and navigation parameters are always
/// strings, so both are normalized here and compared by plain equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
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

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(EntityId(s)),
            RawId::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(EntityId(v.to_string()))
                } else if let Some(v) = n.as_i64() {
                    Ok(EntityId(v.to_string()))
                } else {
                    Err(serde::de::Error::custom(format!(
                        "entity id must be an integer or a string, got {}",
                        n
                    )))
                }
            }
        }
    }
}

/// Source of fresh entity ids.
pub trait IdSource {
    fn next_id(&mut self) -> EntityId;
}

/// Millisecond timestamps, bumped so two ids handed out in the same
/// millisecond still differ.
#[derive(Debug, Default)]
pub struct ClockIds {
    last: u64,
}

impl ClockIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for ClockIds {
    fn next_id(&mut self) -> EntityId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last = now.max(self.last + 1);
        EntityId::from(self.last)
    }
}

/// Counter-based ids, predictable for tests and scripted sessions.
#[derive(Debug)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> EntityId {
        let id = EntityId::from(self.next);
        self.next += 1;
        id
    }
}
