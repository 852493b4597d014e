// Signed-in user session with SQLite-backed persistence.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::User;
use crate::source::{AccountSource, DataSourceError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login failed: unknown username or wrong password")]
    InvalidCredentials,

    #[error("login failed: {0}")]
    Source(#[from] DataSourceError),

    #[error("failed to persist session: {0:#}")]
    Store(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Key-value store holding persisted session blobs as JSON text.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open (or create) the store at `path`. Pass `":memory:"` for an
    /// ephemeral store.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open session store at {path}"))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("failed to set session store pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )
        .context("failed to create session store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("session store mutex poisoned")
    }

    /// Persist `value` under `key`, replacing any previous value.
    pub fn save(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let json_str = serde_json::to_string(value).context("failed to serialize session value")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO session_state (key, value) VALUES (?1, ?2)",
                params![key, json_str],
            )
            .context("failed to save session value")?;
        Ok(())
    }

    /// Load the value stored under `key`, if any.
    pub fn load(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM session_state WHERE key = ?1")
            .context("failed to prepare session load query")?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query session state")?;

        match rows.next() {
            Some(row) => {
                let json_str = row.context("failed to read session row")?;
                let value = serde_json::from_str(&json_str)
                    .context("failed to deserialize session value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM session_state WHERE key = ?1", params![key])
            .context("failed to remove session value")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The current user, passed explicitly to whoever needs it.
///
/// Lifecycle: [`restore`](Session::restore) on startup,
/// [`login`](Session::login) populates, [`logout`](Session::logout) clears.
pub struct Session {
    store: SessionStore,
    user: Option<User>,
}

impl Session {
    /// Key the signed-in user is persisted under.
    pub const USER_KEY: &'static str = "user";

    /// A signed-out session over `store`.
    pub fn new(store: SessionStore) -> Self {
        Self { store, user: None }
    }

    /// A signed-out session that persists nothing beyond the process.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(SessionStore::open(":memory:")?))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(User::effective_role)
    }

    /// Rehydrate the user persisted by a previous run. Returns whether a user
    /// was restored. An unreadable blob is discarded and logged.
    pub fn restore(&mut self) -> Result<bool> {
        let Some(value) = self.store.load(Self::USER_KEY)? else {
            return Ok(false);
        };
        match serde_json::from_value::<User>(value) {
            Ok(user) => {
                info!(username = %user.username, "session restored");
                self.user = Some(user);
                Ok(true)
            }
            Err(e) => {
                warn!("discarding unreadable persisted session: {e}");
                self.store.remove(Self::USER_KEY)?;
                Ok(false)
            }
        }
    }

    /// Look up the credentials and sign the user in.
    ///
    /// On failure the session is left signed out.
    pub async fn login<A>(
        &mut self,
        accounts: &A,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError>
    where
        A: AccountSource + ?Sized,
    {
        let user = match accounts.find_user(username, password).await {
            Ok(user) => user,
            Err(DataSourceError::NotFound { .. }) => {
                warn!(username, "login rejected");
                self.clear()?;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!(username, "login lookup failed: {e}");
                self.clear()?;
                return Err(e.into());
            }
        };
        self.sign_in(user.clone())?;
        info!(username, "logged in");
        Ok(user)
    }

    /// Populate the session with an already verified user and persist it.
    pub fn sign_in(&mut self, user: User) -> Result<()> {
        let value = serde_json::to_value(&user).context("failed to serialize user")?;
        self.store.save(Self::USER_KEY, &value)?;
        self.user = Some(user);
        Ok(())
    }

    /// Clear the user in memory and in the store.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = &self.user {
            info!(username = %user.username, "logged out");
        }
        self.clear()
    }

    fn clear(&mut self) -> Result<()> {
        self.user = None;
        self.store.remove(Self::USER_KEY)
    }
}
