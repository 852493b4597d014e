// Fixture listing: games for a category, in kickoff order, with team ids
// mapped to display names.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::category::{CategoryResolver, ALL};
use crate::model::{Game, RecordId};
use crate::source::{GameFilter, LeagueSource};

/// Display name used when a game's first team id is not in the team list.
pub const UNKNOWN_TEAM_A: &str = "Unknown A";
/// Display name used when a game's second team id is not in the team list.
pub const UNKNOWN_TEAM_B: &str = "Unknown B";

/// A game ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub id: RecordId,
    pub team_a: String,
    pub team_b: String,
    /// Kickoff in local wall-clock time.
    pub kickoff: Option<NaiveDateTime>,
    pub pitch: Option<String>,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub gender: String,
    pub game_type: Option<String>,
    pub is_complete: bool,
}

impl Fixture {
    pub fn from_game(game: Game, names: &HashMap<RecordId, String>) -> Self {
        let name = |id: &RecordId, fallback: &str| {
            names.get(id).cloned().unwrap_or_else(|| fallback.to_string())
        };
        Self {
            team_a: name(&game.team_a_id, UNKNOWN_TEAM_A),
            team_b: name(&game.team_b_id, UNKNOWN_TEAM_B),
            kickoff: game.kickoff_time.as_deref().and_then(parse_kickoff),
            id: game.id,
            pitch: game.pitch,
            score_a: game.score_a,
            score_b: game.score_b,
            gender: game.gender,
            game_type: game.game_type,
            is_complete: game.is_complete,
        }
    }
}

/// Parse a stored kickoff timestamp as local wall-clock time.
///
/// A trailing `Z` is dropped so the time is read as already local; any other
/// explicit offset is converted into the local zone.
pub fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Some(naive) = trimmed.strip_suffix('Z') {
        return parse_naive(naive);
    }
    if let Some(naive) = parse_naive(trimmed) {
        return Some(naive);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Fixture list container for one data source. Publishes like
/// [`Scoreboard`](crate::standings::Scoreboard).
pub struct Fixtures<S: ?Sized> {
    source: Arc<S>,
    resolver: CategoryResolver,
    list: watch::Sender<Vec<Fixture>>,
    generation: AtomicU64,
}

impl<S> Fixtures<S>
where
    S: LeagueSource + ?Sized,
{
    pub fn new(source: Arc<S>, resolver: CategoryResolver) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self {
            source,
            resolver,
            list,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Fixture>> {
        self.list.subscribe()
    }

    pub fn list(&self) -> Vec<Fixture> {
        self.list.borrow().clone()
    }

    /// Fixtures for a UI category. The type only narrows the tiered gender;
    /// for every other gender it is ignored.
    pub async fn fetch_by_category(&self, gender: &str, requested_type: &str) -> Vec<Fixture> {
        let game_type = if self.resolver.is_tiered(gender) {
            requested_type
        } else {
            ALL
        };
        self.fetch_games(&GameFilter::from_labels(gender, game_type))
            .await
    }

    /// Load games matching `filter` and map their team names.
    ///
    /// A failed games query yields an empty list. A failed team query only
    /// loses the names, which fall back to placeholders.
    pub async fn fetch_games(&self, filter: &GameFilter) -> Vec<Fixture> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (games, teams) = tokio::join!(
            self.source.list_games(filter),
            self.source.list_all_teams()
        );

        let fixtures = match games {
            Ok(games) => {
                let names: HashMap<RecordId, String> = match teams {
                    Ok(teams) => teams.into_iter().map(|t| (t.id, t.name)).collect(),
                    Err(e) => {
                        error!("failed to load teams for fixtures: {e}");
                        HashMap::new()
                    }
                };
                let mut fixtures: Vec<Fixture> = games
                    .into_iter()
                    .map(|g| Fixture::from_game(g, &names))
                    .collect();
                // Stable, and None sorts after every kickoff.
                fixtures.sort_by_key(|f| (f.kickoff.is_none(), f.kickoff));
                info!(?filter, fixtures = fixtures.len(), "fixtures loaded");
                fixtures
            }
            Err(e) => {
                error!(?filter, "fixtures fetch error: {e}");
                Vec::new()
            }
        };

        let published = self.list.send_if_modified(|list| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *list = fixtures.clone();
            true
        });
        if !published {
            debug!(generation, "discarding superseded fixture list");
        }

        fixtures
    }
}
