// In-memory league store, seeded with demo tournament data for offline runs
// and used as the test double for the retrieval traits.

use async_trait::async_trait;

use super::{AccountSource, DataSourceError, GameFilter, LeagueSource};
use crate::category::{CategoryKey, ALL};
use crate::model::{Game, RecordId, StatRecord, Team, TeamStats, User};

/// A `scoreboard` row together with the category it belongs to.
#[derive(Debug, Clone)]
struct ScoreboardRow {
    gender: String,
    score_type: String,
    record: StatRecord,
}

/// Read-only in-memory implementation of [`LeagueSource`] and
/// [`AccountSource`]. Build it up with the `with_*` methods, then share it.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    teams: Vec<Team>,
    scoreboard: Vec<ScoreboardRow>,
    games: Vec<Game>,
    users: Vec<(User, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    /// Add a scoreboard row for `(gender, score_type)`. Several rows for the
    /// same team and category may be added to simulate duplicates.
    pub fn with_stats(mut self, gender: &str, score_type: &str, record: StatRecord) -> Self {
        self.scoreboard.push(ScoreboardRow {
            gender: gender.to_string(),
            score_type: score_type.to_string(),
            record,
        });
        self
    }

    pub fn with_game(mut self, game: Game) -> Self {
        self.games.push(game);
        self
    }

    pub fn with_user(mut self, user: User, password: &str) -> Self {
        self.users.push((user, password.to_string()));
        self
    }

    /// The demo tournament: three gender groups, two tiers for the men's
    /// competition, a few fixtures and one account per access level.
    pub fn demo() -> Self {
        let mut source = MemorySource::new();
        let mut next_id = 1i64;

        let tables: &[(&str, Option<&str>, &[(&str, u32, i32, u32, u32, u32)])] = &[
            (
                "Male",
                Some("Elite"),
                &[
                    ("Tigers", 3, 9, 3, 0, 0),
                    ("Lions", 3, 6, 1, 1, 1),
                    ("Bulls", 3, 3, 0, 0, 3),
                    ("Wolves", 0, 0, 0, 0, 0),
                    ("Jaguars", 0, 0, 0, 0, 0),
                    ("Tryit", 0, 0, 0, 0, 0),
                ],
            ),
            (
                "Male",
                Some("Social"),
                &[("Otters", 3, 7, 2, 0, 1), ("Badgers", 3, 5, 1, 0, 2)],
            ),
            (
                "Ladies",
                None,
                &[
                    ("Queens", 3, 8, 2, 1, 0),
                    ("Stars", 3, 5, 1, 0, 2),
                    ("Valkyries", 3, 3, 0, 0, 3),
                ],
            ),
            (
                "Juniors",
                None,
                &[
                    ("Mini Tigers", 3, 6, 1, 1, 1),
                    ("Tiny Bulls", 3, 4, 0, 1, 2),
                    ("Young Lions", 3, 2, 0, 0, 3),
                ],
            ),
        ];

        for &(gender, tier, rows) in tables {
            for &(name, played, points, wins, draws, losses) in rows {
                let id = RecordId::from(next_id);
                next_id += 1;
                source = source.with_team(Team {
                    id: id.clone(),
                    name: name.to_string(),
                    gender: gender.to_string(),
                    tier: tier.map(String::from),
                });

                // Teams without a result yet have no scoreboard row at all.
                if played == 0 {
                    continue;
                }
                let record = StatRecord {
                    team_id: id,
                    stats: TeamStats {
                        played,
                        points,
                        wins,
                        draws,
                        losses,
                    },
                };
                if let Some(tier) = tier {
                    source = source.with_stats(gender, tier, record.clone());
                }
                source = source.with_stats(gender, ALL, record);
            }
        }

        let fixtures = [
            ("Tigers", "Lions", "2025-05-02T19:30:00Z", "Pitch 1", Some((7, 0)), true),
            ("Bulls", "Wolves", "2025-05-02T20:00:00Z", "Pitch 2", None, false),
            ("Jaguars", "Tryit", "2025-05-02T21:00:00Z", "Pitch 2", None, false),
            ("Queens", "Stars", "2025-05-02T19:00:00Z", "Pitch 3", Some((12, 5)), true),
            ("Mini Tigers", "Tiny Bulls", "2025-05-02T18:30:00Z", "Pitch 3", None, false),
        ];
        for (i, (a, b, kickoff, pitch, score, complete)) in fixtures.into_iter().enumerate() {
            let (Some(team_a), Some(team_b)) = (source.team_by_name(a), source.team_by_name(b))
            else {
                continue;
            };
            let game = Game {
                id: RecordId::from(i as i64 + 1),
                team_a_id: team_a.id.clone(),
                team_b_id: team_b.id.clone(),
                kickoff_time: Some(kickoff.to_string()),
                pitch: Some(pitch.to_string()),
                score_a: score.map(|(a, _)| a),
                score_b: score.map(|(_, b)| b),
                gender: team_a.gender.clone(),
                game_type: team_a.tier.clone(),
                is_complete: complete,
            };
            source = source.with_game(game);
        }

        for (i, (username, role, access)) in [
            ("super", "Super Admin", "super"),
            ("admin", "Admin", "admin"),
            ("captain", "Team Admin", "team"),
        ]
        .into_iter()
        .enumerate()
        {
            source = source.with_user(
                User {
                    id: RecordId::from(i as i64 + 1),
                    username: username.to_string(),
                    role: Some(role.to_string()),
                    access: Some(access.to_string()),
                },
                "sevens",
            );
        }

        source
    }

    fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }
}

#[async_trait]
impl LeagueSource for MemorySource {
    async fn list_teams(&self, filter: &CategoryKey) -> Result<Vec<Team>, DataSourceError> {
        let tier = filter.resolved_type.tier();
        Ok(self
            .teams
            .iter()
            .filter(|t| t.gender == filter.gender)
            .filter(|t| tier.map_or(true, |tier| t.tier.as_deref() == Some(tier)))
            .cloned()
            .collect())
    }

    async fn list_stats(
        &self,
        filter: &CategoryKey,
    ) -> Result<Vec<StatRecord>, DataSourceError> {
        let score_type = filter.resolved_type.as_str();
        Ok(self
            .scoreboard
            .iter()
            .filter(|row| row.gender == filter.gender && row.score_type == score_type)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn list_all_teams(&self) -> Result<Vec<Team>, DataSourceError> {
        Ok(self.teams.clone())
    }

    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, DataSourceError> {
        let mut games: Vec<Game> = self
            .games
            .iter()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect();
        // Same ordering as `order=kickoff_time.asc`: nulls last.
        games.sort_by(|a, b| match (&a.kickoff_time, &b.kickoff_time) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(games)
    }
}

#[async_trait]
impl AccountSource for MemorySource {
    async fn find_user(&self, username: &str, password: &str) -> Result<User, DataSourceError> {
        self.users
            .iter()
            .find(|(u, p)| u.username == username && p == password)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| DataSourceError::NotFound {
                table: "users".into(),
            })
    }
}
