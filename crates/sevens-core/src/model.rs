// Record types read from the league data store.
//
// These mirror the rows of the remote `teams`, `scoreboard`, `games` and
// `users` tables. The core never mutates them; it only reads snapshots.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Record identity
// ---------------------------------------------------------------------------

/// Opaque identifier of a stored record.
///
/// The data store may hand out integer keys or UUID strings depending on the
/// table, so both are accepted on deserialization and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId(n.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => RecordId(n.to_string()),
            RawId::Text(s) => RecordId(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Teams and standings
// ---------------------------------------------------------------------------

/// A team entered in one category of the tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: RecordId,
    pub name: String,
    /// Gender group label (e.g. "Male", "Ladies", "Juniors").
    #[serde(default)]
    pub gender: String,
    /// Competition tier (e.g. "Elite"); only set for tiered groups.
    #[serde(default, rename = "type")]
    pub tier: Option<String>,
}

/// Aggregate results for one team within one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamStats {
    pub played: u32,
    pub points: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// A `scoreboard` row: the stats of `team_id` in the queried category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub team_id: RecordId,
    #[serde(flatten)]
    pub stats: TeamStats,
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A scheduled or completed game between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: RecordId,
    pub team_a_id: RecordId,
    pub team_b_id: RecordId,
    /// ISO-8601 text as stored; may carry a trailing `Z`.
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default)]
    pub score_a: Option<u32>,
    #[serde(default)]
    pub score_b: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default, rename = "type")]
    pub game_type: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A row of the `users` table, as returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Newer accounts carry an explicit access level that overrides `role`.
    #[serde(default)]
    pub access: Option<String>,
}

impl User {
    /// The role used for access checks: `access` when present, else `role`,
    /// else the empty string (which no route accepts).
    pub fn effective_role(&self) -> &str {
        self.access
            .as_deref()
            .or(self.role.as_deref())
            .unwrap_or("")
    }
}
