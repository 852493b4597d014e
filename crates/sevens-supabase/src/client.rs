// Supabase REST client.
//
// Issues read-only PostgREST queries with the project's anon key and decodes
// the JSON rows into the core model types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use sevens_core::category::CategoryKey;
use sevens_core::config::Config;
use sevens_core::model::{Game, StatRecord, Team, User};
use sevens_core::source::{AccountSource, DataSourceError, GameFilter, LeagueSource};

use crate::query::{self, Select};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Supabase anon key not configured (set supabase_anon_key in credentials.toml or {env})")]
    MissingAnonKey { env: &'static str },

    #[error("invalid Supabase URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// SupabaseClient
// ---------------------------------------------------------------------------

/// Read-only client for the league tables.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    pub fn new(base_url: &str, anon_key: String, timeout: Duration) -> Result<Self, ClientError> {
        // A trailing slash makes `join` append instead of replacing the last
        // path segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            anon_key,
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let anon_key = config
            .credentials
            .supabase_anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ClientError::MissingAnonKey {
                env: sevens_core::config::ENV_SUPABASE_ANON_KEY,
            })?;
        Self::new(
            &config.supabase.url,
            anon_key,
            Duration::from_secs(config.supabase.timeout_secs),
        )
    }

    /// Full request URL for `select`, query string included.
    pub fn request_url(&self, select: &Select) -> Result<Url, DataSourceError> {
        let mut url = self
            .base_url
            .join(&select.path())
            .map_err(|e| DataSourceError::Transport {
                table: select.table().to_string(),
                message: e.to_string(),
            })?;
        url.query_pairs_mut().extend_pairs(select.params());
        Ok(url)
    }

    /// Run `select` and decode the response array.
    async fn fetch<T: DeserializeOwned>(&self, select: &Select) -> Result<Vec<T>, DataSourceError> {
        let table = select.table();
        let url = self.request_url(select)?;
        debug!(%url, "supabase query");

        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| DataSourceError::Transport {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(table, status = status.as_u16(), "supabase query rejected");
            return Err(DataSourceError::Status {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DataSourceError::Transport {
                table: table.to_string(),
                message: e.to_string(),
            })?;
        decode_rows(table, &bytes)
    }
}

/// Decode a PostgREST JSON array.
pub fn decode_rows<T: DeserializeOwned>(table: &str, bytes: &[u8]) -> Result<Vec<T>, DataSourceError> {
    serde_json::from_slice(bytes).map_err(|e| DataSourceError::Decode {
        table: table.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Source implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl LeagueSource for SupabaseClient {
    async fn list_teams(&self, filter: &CategoryKey) -> Result<Vec<Team>, DataSourceError> {
        self.fetch(&query::teams_in(filter)).await
    }

    async fn list_stats(&self, filter: &CategoryKey) -> Result<Vec<StatRecord>, DataSourceError> {
        self.fetch(&query::stats_in(filter)).await
    }

    async fn list_all_teams(&self) -> Result<Vec<Team>, DataSourceError> {
        self.fetch(&query::all_teams()).await
    }

    async fn list_games(&self, filter: &GameFilter) -> Result<Vec<Game>, DataSourceError> {
        self.fetch(&query::games(filter)).await
    }
}

#[async_trait]
impl AccountSource for SupabaseClient {
    async fn find_user(&self, username: &str, password: &str) -> Result<User, DataSourceError> {
        let select = query::user_by_credentials(username, password);
        let users: Vec<User> = self.fetch(&select).await?;
        single_row(select.table(), users)
    }
}

/// Exactly one row, or `NotFound` / `Ambiguous`.
pub fn single_row<T>(table: &str, rows: Vec<T>) -> Result<T, DataSourceError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        (None, _) => Err(DataSourceError::NotFound {
            table: table.to_string(),
        }),
        (Some(_), count) => {
            warn!(table, count, "credential lookup matched several rows");
            Err(DataSourceError::Ambiguous {
                table: table.to_string(),
                count,
            })
        }
    }
}
