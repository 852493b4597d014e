// Integration tests for the standings and fixtures pipelines.
//
// These drive the public API end-to-end against in-memory and failing data
// sources: category resolution, concurrent retrieval, merge, ranking, the
// fail-soft error policy and the observable containers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sevens_core::category::{CategoryKey, CategoryResolver, ResolvedType};
use sevens_core::fixtures::{Fixtures, UNKNOWN_TEAM_A, UNKNOWN_TEAM_B};
use sevens_core::model::{Game, RecordId, StatRecord, Team, TeamStats};
use sevens_core::source::{DataSourceError, GameFilter, LeagueSource, MemorySource};
use sevens_core::standings::{load_standings, Scoreboard};

// ===========================================================================
// Test helpers
// ===========================================================================

fn team(id: i64, name: &str, gender: &str, tier: Option<&str>) -> Team {
    Team {
        id: RecordId::from(id),
        name: name.to_string(),
        gender: gender.to_string(),
        tier: tier.map(String::from),
    }
}

fn stat(id: i64, played: u32, points: i32) -> StatRecord {
    StatRecord {
        team_id: RecordId::from(id),
        stats: TeamStats {
            played,
            points,
            wins: 0,
            draws: 0,
            losses: 0,
        },
    }
}

/// Which query a [`FailingSource`] should break.
#[derive(Clone, Copy)]
enum Fail {
    Teams,
    Stats,
    Games,
    AllTeams,
}

/// Delegates to the demo data, failing one chosen query.
struct FailingSource {
    inner: MemorySource,
    fail: Fail,
}

impl FailingSource {
    fn new(fail: Fail) -> Self {
        Self {
            inner: MemorySource::demo(),
            fail,
        }
    }

    fn error(table: &str) -> DataSourceError {
        DataSourceError::Transport {
            table: table.into(),
            message: "connection reset".into(),
        }
    }
}

#[async_trait]
impl LeagueSource for FailingSource {
    async fn list_teams(&self, filter: &CategoryKey) -> Result<Vec<Team>, DataSourceError> {
        match self.fail {
            Fail::Teams => Err(Self::error("teams")),
            _ => self.inner.list_teams(filter).await,
        }
    }

    async fn list_stats(
        &self,
        filter: &CategoryKey,
    ) -> Result<Vec<StatRecord>, DataSourceError> {
        match self.fail {
            Fail::Stats => Err(Self::error("scoreboard")),
            _ => self.inner.list_stats(filter).await,
        }
    }

    async fn list_all_teams(&self) -> Result<Vec<Team>, DataSourceError> {
        match self.fail {
            Fail::AllTeams => Err(Self::error("teams")),
            _ => self.inner.list_all_teams().await,
        }
    }

    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, DataSourceError> {
        match self.fail {
            Fail::Games => Err(Self::error("games")),
            _ => self.inner.list_games(filter).await,
        }
    }
}

/// Delays the stats query of one category so a later call can overtake it.
struct SlowSource {
    inner: MemorySource,
    slow_gender: &'static str,
    stats_calls: AtomicUsize,
}

#[async_trait]
impl LeagueSource for SlowSource {
    async fn list_teams(&self, filter: &CategoryKey) -> Result<Vec<Team>, DataSourceError> {
        self.inner.list_teams(filter).await
    }

    async fn list_stats(
        &self,
        filter: &CategoryKey,
    ) -> Result<Vec<StatRecord>, DataSourceError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if filter.gender == self.slow_gender {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.inner.list_stats(filter).await
    }

    async fn list_all_teams(&self) -> Result<Vec<Team>, DataSourceError> {
        self.inner.list_all_teams().await
    }

    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, DataSourceError> {
        self.inner.list_games(filter).await
    }
}

fn scoreboard<S: LeagueSource>(source: S) -> Scoreboard<S> {
    Scoreboard::new(Arc::new(source), CategoryResolver::default())
}

// ===========================================================================
// Standings
// ===========================================================================

#[tokio::test]
async fn demo_elite_table_ranks_and_defaults_missing_stats() {
    let board = scoreboard(MemorySource::demo());
    let rows = board.fetch_by_category("Male", "Elite").await;

    let summary: Vec<(&str, i32, u32)> = rows
        .iter()
        .map(|r| (r.team.as_str(), r.points, r.rank))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Tigers", 9, 1),
            ("Lions", 6, 2),
            ("Bulls", 3, 3),
            ("Wolves", 0, 4),
            ("Jaguars", 0, 4),
            ("Tryit", 0, 4),
        ]
    );
    assert!(rows[3..].iter().all(|r| r.played == 0 && r.wins == 0));
}

#[tokio::test]
async fn non_tiered_gender_ignores_requested_type() {
    let board = scoreboard(MemorySource::demo());
    let with_tier = board.fetch_by_category("Ladies", "Elite").await;
    let with_all = board.fetch_by_category("Ladies", "All").await;

    assert_eq!(with_tier, with_all);
    let names: Vec<&str> = with_all.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(names, vec!["Queens", "Stars", "Valkyries"]);
}

#[tokio::test]
async fn all_male_table_spans_both_tiers() {
    let board = scoreboard(MemorySource::demo());
    let rows = board.fetch_by_category("Male", "All").await;
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].team, "Tigers");
    assert_eq!(rows[1].team, "Otters");
}

#[tokio::test]
async fn row_count_equals_team_count_for_every_category() {
    let source = MemorySource::demo();
    let resolver = CategoryResolver::default();
    for (gender, tier) in [
        ("Male", "Elite"),
        ("Male", "Social"),
        ("Male", "All"),
        ("Ladies", "All"),
        ("Juniors", "Social"),
        ("Nobody", "All"),
    ] {
        let key = resolver.resolve(gender, tier);
        let teams = source.list_teams(&key).await.unwrap();
        let rows = load_standings(&source, &key).await.unwrap();
        assert_eq!(rows.len(), teams.len(), "{key}");
    }
}

#[tokio::test]
async fn tied_points_share_rank_in_arrival_order() {
    let source = MemorySource::new()
        .with_team(team(1, "T1", "Ladies", None))
        .with_team(team(2, "T2", "Ladies", None))
        .with_team(team(3, "T3", "Ladies", None))
        .with_stats("Ladies", "All", stat(3, 3, 6))
        .with_stats("Ladies", "All", stat(2, 3, 9))
        .with_stats("Ladies", "All", stat(1, 3, 9));

    let rows = scoreboard(source).fetch_by_category("Ladies", "All").await;
    let summary: Vec<(&str, u32)> = rows.iter().map(|r| (r.team.as_str(), r.rank)).collect();
    assert_eq!(summary, vec![("T1", 1), ("T2", 1), ("T3", 3)]);
}

#[tokio::test]
async fn duplicate_stat_rows_last_one_wins() {
    let source = MemorySource::new()
        .with_team(team(1, "Otters", "Male", Some("Social")))
        .with_stats("Male", "Social", stat(1, 2, 3))
        .with_stats("Male", "Social", stat(1, 3, 7));

    let rows = scoreboard(source).fetch_by_category("Male", "Social").await;
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].played, rows[0].points), (3, 7));
}

#[tokio::test]
async fn stats_from_other_type_bucket_are_not_used() {
    // A team-level "Elite" row must not leak into the "All" table.
    let source = MemorySource::new()
        .with_team(team(1, "Tigers", "Male", Some("Elite")))
        .with_stats("Male", "Elite", stat(1, 3, 9));

    let rows = scoreboard(source).fetch_by_category("Male", "All").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].points, 0);
    assert_eq!(rows[0].rank, 1);
}

#[tokio::test]
async fn teams_failure_yields_empty_table() {
    let board = scoreboard(FailingSource::new(Fail::Teams));
    assert!(board.fetch_by_category("Male", "Elite").await.is_empty());
    assert!(board.table().is_empty());
}

#[tokio::test]
async fn stats_failure_publishes_empty_table() {
    let source = Arc::new(FailingSource::new(Fail::Stats));
    let board = Scoreboard::new(source, CategoryResolver::default());
    let mut rx = board.subscribe();

    assert!(board.fetch_by_category("Juniors", "All").await.is_empty());
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());
}

#[tokio::test]
async fn load_standings_surfaces_the_error() {
    let source = FailingSource::new(Fail::Stats);
    let key = CategoryResolver::default().resolve("Male", "Elite");
    let err = load_standings(&source, &key).await.unwrap_err();
    assert!(matches!(err, DataSourceError::Transport { ref table, .. } if table == "scoreboard"));
}

#[tokio::test]
async fn published_table_matches_returned_rows() {
    let board = scoreboard(MemorySource::demo());
    let mut rx = board.subscribe();

    let rows = board.fetch_by_category("Male", "Social").await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), rows);
    assert_eq!(board.table(), rows);
}

#[tokio::test(start_paused = true)]
async fn superseded_fetch_does_not_overwrite_newer_table() {
    let source = Arc::new(SlowSource {
        inner: MemorySource::demo(),
        slow_gender: "Ladies",
        stats_calls: AtomicUsize::new(0),
    });
    let board = Arc::new(Scoreboard::new(source.clone(), CategoryResolver::default()));

    // The slow Ladies request starts first, then Juniors overtakes it.
    let slow = tokio::spawn({
        let board = board.clone();
        async move { board.fetch_by_category("Ladies", "All").await }
    });
    while source.stats_calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    let juniors = board.fetch_by_category("Juniors", "All").await;
    let ladies = slow.await.unwrap();

    // The stale call still returns its own rows to its caller...
    assert_eq!(ladies.len(), 3);
    assert_eq!(ladies[0].team, "Queens");
    // ...but the published table is the newer one.
    assert_eq!(board.table(), juniors);
}

#[test]
fn resolver_keeps_tier_only_for_tiered_gender() {
    let resolver = CategoryResolver::default();
    assert_eq!(
        resolver.resolve("Male", "Social").resolved_type,
        ResolvedType::Tier("Social".into())
    );
    assert_eq!(resolver.resolve("Male", "All").resolved_type, ResolvedType::All);
    assert_eq!(resolver.resolve("Juniors", "Elite").resolved_type, ResolvedType::All);
}

// ===========================================================================
// Fixtures
// ===========================================================================

fn fixtures<S: LeagueSource>(source: S) -> Fixtures<S> {
    Fixtures::new(Arc::new(source), CategoryResolver::default())
}

#[tokio::test]
async fn fixtures_for_tier_map_names_in_kickoff_order() {
    let list = fixtures(MemorySource::demo())
        .fetch_by_category("Male", "Elite")
        .await;

    let pairs: Vec<(&str, &str)> = list
        .iter()
        .map(|f| (f.team_a.as_str(), f.team_b.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("Tigers", "Lions"), ("Bulls", "Wolves"), ("Jaguars", "Tryit")]
    );
    assert_eq!(list[0].score_a, Some(7));
    assert!(list[0].is_complete);
}

#[tokio::test]
async fn fixtures_for_all_genders_span_every_group() {
    let list = fixtures(MemorySource::demo())
        .fetch_games(&GameFilter::from_labels("All", "All"))
        .await;
    assert_eq!(list.len(), 5);
    assert_eq!(list[0].team_a, "Mini Tigers");
    let kickoffs: Vec<_> = list.iter().map(|f| f.kickoff.unwrap()).collect();
    assert!(kickoffs.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn fixtures_type_ignored_for_untiered_gender() {
    let list = fixtures(MemorySource::demo())
        .fetch_by_category("Ladies", "Elite")
        .await;
    assert_eq!(list.len(), 1);
    assert_eq!((list[0].team_a.as_str(), list[0].team_b.as_str()), ("Queens", "Stars"));
}

#[tokio::test]
async fn fixtures_with_missing_kickoff_sort_last() {
    let game = |id: i64, kickoff: Option<&str>| Game {
        id: RecordId::from(id),
        team_a_id: RecordId::from(1),
        team_b_id: RecordId::from(2),
        kickoff_time: kickoff.map(String::from),
        pitch: None,
        score_a: None,
        score_b: None,
        gender: "Juniors".into(),
        game_type: None,
        is_complete: false,
    };
    let source = MemorySource::new()
        .with_game(game(1, None))
        .with_game(game(2, Some("2025-05-03T10:00:00Z")))
        .with_game(game(3, Some("2025-05-02T10:00:00Z")));

    let list = fixtures(source).fetch_games(&GameFilter::default()).await;
    let ids: Vec<&str> = list.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"]);
    // No teams were registered at all.
    assert_eq!(list[0].team_a, UNKNOWN_TEAM_A);
    assert_eq!(list[0].team_b, UNKNOWN_TEAM_B);
}

#[tokio::test]
async fn fixtures_team_lookup_failure_falls_back_to_placeholders() {
    let list = fixtures(FailingSource::new(Fail::AllTeams))
        .fetch_by_category("Male", "Elite")
        .await;
    assert_eq!(list.len(), 3);
    assert!(list
        .iter()
        .all(|f| f.team_a == UNKNOWN_TEAM_A && f.team_b == UNKNOWN_TEAM_B));
}

#[tokio::test]
async fn fixtures_games_failure_yields_empty_list() {
    let store = fixtures(FailingSource::new(Fail::Games));
    assert!(store.fetch_by_category("Male", "All").await.is_empty());
    assert!(store.list().is_empty());
}
