// PostgREST query construction.
//
// Builds `GET /rest/v1/{table}?select=...&col=eq.value&order=...` requests
// without touching the network so the filters can be unit tested.

use sevens_core::category::CategoryKey;
use sevens_core::source::GameFilter;

pub const TEAMS_TABLE: &str = "teams";
pub const SCOREBOARD_TABLE: &str = "scoreboard";
pub const GAMES_TABLE: &str = "games";
pub const USERS_TABLE: &str = "users";

const TEAM_COLUMNS: &str = "id,name,gender,type";
const STAT_COLUMNS: &str = "team_id,played,points,wins,draws,losses";
const GAME_COLUMNS: &str = "*";

/// A read query against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    table: &'static str,
    columns: &'static str,
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl Select {
    pub fn new(table: &'static str, columns: &'static str) -> Self {
        Self {
            table,
            columns,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Add an equality predicate on `column`. A top-level `eq.` filter reads
    /// the rest of the parameter as the value, so it is sent verbatim.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(format!("{column}.asc"));
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Path relative to the project URL.
    pub fn path(&self) -> String {
        format!("rest/v1/{}", self.table)
    }

    /// Query string pairs, in the order they were added.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.to_string())];
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// League queries
// ---------------------------------------------------------------------------

/// Teams of a category. The type predicate is only added for a specific tier.
pub fn teams_in(key: &CategoryKey) -> Select {
    let select = Select::new(TEAMS_TABLE, TEAM_COLUMNS).eq("gender", &key.gender);
    match key.resolved_type.tier() {
        Some(tier) => select.eq("type", tier),
        None => select,
    }
}

/// Scoreboard rows of a category. The sentinel is stored as `type = All`, so
/// the type predicate is always present.
pub fn stats_in(key: &CategoryKey) -> Select {
    Select::new(SCOREBOARD_TABLE, STAT_COLUMNS)
        .eq("gender", &key.gender)
        .eq("type", key.resolved_type.as_str())
}

pub fn all_teams() -> Select {
    Select::new(TEAMS_TABLE, TEAM_COLUMNS)
}

pub fn games(filter: &GameFilter) -> Select {
    let mut select = Select::new(GAMES_TABLE, GAME_COLUMNS);
    if let Some(gender) = &filter.gender {
        select = select.eq("gender", gender);
    }
    if let Some(game_type) = &filter.game_type {
        select = select.eq("type", game_type);
    }
    select.order_asc("kickoff_time")
}

pub fn user_by_credentials(username: &str, password: &str) -> Select {
    Select::new(USERS_TABLE, "*")
        .eq("username", username)
        .eq("password", password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sevens_core::category::resolve;

    fn pairs(select: &Select) -> Vec<(String, String)> {
        select.params()
    }

    fn p(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn specific_tier_filters_teams_by_type() {
        let q = teams_in(&resolve("Male", "Elite"));
        assert_eq!(q.path(), "rest/v1/teams");
        assert_eq!(
            pairs(&q),
            vec![
                p("select", "id,name,gender,type"),
                p("gender", "eq.Male"),
                p("type", "eq.Elite"),
            ]
        );
    }

    #[test]
    fn sentinel_omits_team_type_but_not_stat_type() {
        let key = resolve("Ladies", "Elite");

        let teams = teams_in(&key);
        assert!(!pairs(&teams).iter().any(|(k, _)| k == "type"));

        let stats = stats_in(&key);
        assert_eq!(stats.table(), "scoreboard");
        assert_eq!(
            pairs(&stats),
            vec![
                p("select", "team_id,played,points,wins,draws,losses"),
                p("gender", "eq.Ladies"),
                p("type", "eq.All"),
            ]
        );
    }

    #[test]
    fn games_are_ordered_by_kickoff() {
        let q = games(&GameFilter::from_labels("Male", "All"));
        assert_eq!(
            pairs(&q),
            vec![
                p("select", "*"),
                p("gender", "eq.Male"),
                p("order", "kickoff_time.asc"),
            ]
        );

        let q = games(&GameFilter::default());
        assert_eq!(pairs(&q), vec![p("select", "*"), p("order", "kickoff_time.asc")]);
    }

    #[test]
    fn credential_values_are_sent_verbatim() {
        let q = user_by_credentials("j.smith", "hunter2.0,(x)");
        assert_eq!(
            pairs(&q)[1..],
            [
                p("username", "eq.j.smith"),
                p("password", "eq.hunter2.0,(x)"),
            ]
        );
    }
}
