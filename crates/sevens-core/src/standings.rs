// Standings aggregation: merges team identities with their scoreboard rows,
// sorts by points and assigns competition ranks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::category::{CategoryKey, CategoryResolver};
use crate::model::{RecordId, StatRecord, Team, TeamStats};
use crate::source::{DataSourceError, LeagueSource};

/// One line of a standings table. Sequence order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub rank: u32,
    pub team: String,
    pub played: u32,
    pub points: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub team_id: RecordId,
}

impl StandingsRow {
    /// An unranked row; `rank` is filled in by [`assign_ranks`].
    pub fn new(team: &Team, stats: TeamStats) -> Self {
        Self {
            rank: 0,
            team: team.name.clone(),
            played: stats.played,
            points: stats.points,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            team_id: team.id.clone(),
        }
    }

    pub fn stats(&self) -> TeamStats {
        TeamStats {
            played: self.played,
            points: self.points,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
        }
    }
}

// ---------------------------------------------------------------------------
// Pure pipeline stages
// ---------------------------------------------------------------------------

/// Build one unranked row per team, in team order.
///
/// Teams without a scoreboard row get all-zero stats. If several rows share a
/// team id the last one wins. Rows for ids that are not in `teams` are
/// ignored, so the output length always equals `teams.len()`.
pub fn merge_rows(teams: &[Team], stats: Vec<StatRecord>) -> Vec<StandingsRow> {
    let mut by_team: HashMap<RecordId, TeamStats> = HashMap::with_capacity(stats.len());
    for record in stats {
        if by_team.insert(record.team_id.clone(), record.stats).is_some() {
            warn!(
                team_id = %record.team_id,
                "duplicate scoreboard row for team; keeping the last one"
            );
        }
    }

    teams
        .iter()
        .map(|team| {
            let stats = by_team.get(&team.id).copied().unwrap_or_default();
            StandingsRow::new(team, stats)
        })
        .collect()
}

/// Sort by points, highest first. Stable: equal points keep arrival order.
pub fn sort_rows(rows: &mut [StandingsRow]) {
    rows.sort_by(|a, b| b.points.cmp(&a.points));
}

/// Assign competition ranks to rows already sorted by points.
///
/// Equal points share a rank and the next distinct value resumes at its
/// 1-based position: points `[9, 9, 6]` rank `[1, 1, 3]`.
pub fn assign_ranks(rows: &mut [StandingsRow]) {
    let mut prev_points: Option<i32> = None;
    let mut prev_rank = 0u32;

    for (i, row) in rows.iter_mut().enumerate() {
        let pos = i as u32 + 1;
        if prev_points != Some(row.points) {
            prev_points = Some(row.points);
            prev_rank = pos;
        }
        row.rank = prev_rank;
    }
}

/// Merge, sort and rank in one step.
pub fn build_table(teams: &[Team], stats: Vec<StatRecord>) -> Vec<StandingsRow> {
    let mut rows = merge_rows(teams, stats);
    sort_rows(&mut rows);
    assign_ranks(&mut rows);
    rows
}

/// Fetch teams and stats for `key` concurrently and build the ranked table.
///
/// An error from either query discards both results.
pub async fn load_standings<S>(
    source: &S,
    key: &CategoryKey,
) -> Result<Vec<StandingsRow>, DataSourceError>
where
    S: LeagueSource + ?Sized,
{
    let (teams, stats) = tokio::try_join!(source.list_teams(key), source.list_stats(key))?;
    debug!(
        category = %key,
        teams = teams.len(),
        stat_rows = stats.len(),
        "fetched standings inputs"
    );
    Ok(build_table(&teams, stats))
}

// ---------------------------------------------------------------------------
// Scoreboard (observable table container)
// ---------------------------------------------------------------------------

/// Standings table container for one data source.
///
/// Each [`fetch_by_category`](Scoreboard::fetch_by_category) call publishes
/// its result to subscribers. A fetch that was superseded by a newer call
/// while in flight still returns its rows, but does not overwrite the table.
pub struct Scoreboard<S: ?Sized> {
    source: Arc<S>,
    resolver: CategoryResolver,
    table: watch::Sender<Vec<StandingsRow>>,
    generation: AtomicU64,
}

impl<S> Scoreboard<S>
where
    S: LeagueSource + ?Sized,
{
    pub fn new(source: Arc<S>, resolver: CategoryResolver) -> Self {
        let (table, _) = watch::channel(Vec::new());
        Self {
            source,
            resolver,
            table,
            generation: AtomicU64::new(0),
        }
    }

    /// Receive every table published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Vec<StandingsRow>> {
        self.table.subscribe()
    }

    /// Snapshot of the currently published table.
    pub fn table(&self) -> Vec<StandingsRow> {
        self.table.borrow().clone()
    }

    /// Resolve the category, load and rank its standings, publish and return
    /// them.
    ///
    /// Never fails: a data source error is logged and yields an empty table.
    pub async fn fetch_by_category(&self, gender: &str, requested_type: &str) -> Vec<StandingsRow> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let key = self.resolver.resolve(gender, requested_type);

        let rows = match load_standings(self.source.as_ref(), &key).await {
            Ok(rows) => {
                info!(category = %key, rows = rows.len(), "standings loaded");
                rows
            }
            Err(e) => {
                error!(category = %key, "standings fetch error: {e}");
                Vec::new()
            }
        };

        self.publish(generation, &rows);
        rows
    }

    fn publish(&self, generation: u64, rows: &[StandingsRow]) {
        let published = self.table.send_if_modified(|table| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *table = rows.to_vec();
            true
        });
        if !published {
            debug!(generation, "discarding superseded standings table");
        }
    }
}
