// Retrieval boundary: the contract the core requires from the league data
// store, plus an in-memory implementation.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::category::{CategoryKey, ALL};
use crate::model::{Game, StatRecord, Team, User};

pub use memory::MemorySource;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A failed query against the data store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    #[error("request for {table} failed: {message}")]
    Transport { table: String, message: String },

    #[error("{table} query returned HTTP {status}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode {table} rows: {message}")]
    Decode { table: String, message: String },

    #[error("no matching {table} record")]
    NotFound { table: String },

    #[error("expected one {table} record, found {count}")]
    Ambiguous { table: String, count: usize },
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Filter for the games listing. `None` means "no predicate" on that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub gender: Option<String>,
    pub game_type: Option<String>,
}

impl GameFilter {
    /// Build a filter from UI-style labels where `"All"` disables a predicate.
    pub fn from_labels(gender: &str, game_type: &str) -> Self {
        let label = |s: &str| (s != ALL).then(|| s.to_string());
        Self {
            gender: label(gender),
            game_type: label(game_type),
        }
    }

    pub fn matches(&self, game: &Game) -> bool {
        let gender_ok = self.gender.as_deref().map_or(true, |g| g == game.gender);
        let type_ok = self
            .game_type
            .as_deref()
            .map_or(true, |t| game.game_type.as_deref() == Some(t));
        gender_ok && type_ok
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to teams, standings rows and games.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    /// Teams whose gender matches and, for a specific tier, whose type
    /// matches. Order is unspecified.
    async fn list_teams(&self, filter: &CategoryKey) -> Result<Vec<Team>, DataSourceError>;

    /// Standings rows for the category (`type = "All"` for the sentinel).
    /// Order is unspecified; duplicates per team are possible.
    async fn list_stats(&self, filter: &CategoryKey)
        -> Result<Vec<StatRecord>, DataSourceError>;

    /// Every team regardless of category, for id → name lookups.
    async fn list_all_teams(&self) -> Result<Vec<Team>, DataSourceError>;

    /// Games matching the filter, ordered by kickoff ascending.
    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, DataSourceError>;
}

/// Credential lookup for the login flow.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// The single user matching both `username` and `password`.
    ///
    /// Returns [`DataSourceError::NotFound`] when no row matches and
    /// [`DataSourceError::Ambiguous`] when several do.
    async fn find_user(&self, username: &str, password: &str) -> Result<User, DataSourceError>;
}
