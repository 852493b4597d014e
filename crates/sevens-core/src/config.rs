// Configuration loading and parsing (sevens.toml, credentials.toml).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::category::{CategoryResolver, ALL, DEFAULT_TIERED_GENDER};

/// Environment variable overriding `supabase.url`.
pub const ENV_SUPABASE_URL: &str = "SEVENS_SUPABASE_URL";
/// Environment variable overriding the anon key from credentials.toml.
pub const ENV_SUPABASE_ANON_KEY: &str = "SEVENS_SUPABASE_ANON_KEY";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub supabase: SupabaseConfig,
    pub credentials: CredentialsConfig,
    /// Where the signed-in user is persisted.
    pub session_path: PathBuf,
}

// ---------------------------------------------------------------------------
// sevens.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire sevens.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SevensFile {
    league: LeagueConfig,
    supabase: SupabaseConfig,
    #[serde(default)]
    session: SessionSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Gender groups offered by the tournament, in display order.
    pub genders: Vec<String>,
    /// The one group whose teams are split into tiers.
    #[serde(default = "default_tiered_gender")]
    pub tiered_gender: String,
    /// Tier labels of the tiered group.
    pub tiers: Vec<String>,
}

fn default_tiered_gender() -> String {
    DEFAULT_TIERED_GENDER.to_string()
}

impl LeagueConfig {
    pub fn resolver(&self) -> CategoryResolver {
        CategoryResolver::new(self.tiered_gender.clone())
    }

    pub fn is_known_gender(&self, gender: &str) -> bool {
        self.genders.iter().any(|g| g == gender)
    }

    /// `"All"` is always accepted; tier labels only count for the tiered
    /// group.
    pub fn is_known_type(&self, gender: &str, requested_type: &str) -> bool {
        requested_type == ALL
            || (gender == self.tiered_gender && self.tiers.iter().any(|t| t == requested_type))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SessionSection {
    #[serde(default)]
    path: Option<String>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub supabase_anon_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/sevens.toml` and (optionally)
/// `config/credentials.toml` under `base_dir`, then apply overrides from
/// `env`.
///
/// This does not copy defaults; prefer [`load_config`].
pub fn load_config_from<F>(base_dir: &Path, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_dir = base_dir.join("config");

    // --- sevens.toml (required) ---
    let sevens_path = config_dir.join("sevens.toml");
    let sevens_text = read_file(&sevens_path)?;
    let sevens_file: SevensFile =
        toml::from_str(&sevens_text).map_err(|e| ConfigError::ParseError {
            path: sevens_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let mut credentials: CredentialsConfig = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let mut supabase = sevens_file.supabase;
    if let Some(url) = env(ENV_SUPABASE_URL).filter(|v| !v.is_empty()) {
        supabase.url = url;
    }
    if let Some(key) = env(ENV_SUPABASE_ANON_KEY).filter(|v| !v.is_empty()) {
        credentials.supabase_anon_key = Some(key);
    }

    let session_path = match sevens_file.session.path.filter(|p| !p.is_empty()) {
        Some(p) => base_dir.join(p),
        None => default_session_path(),
    };

    let config = Config {
        league: sevens_file.league,
        supabase,
        credentials,
        session_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded into `config/` from `defaults/` on first run. The anon key
/// is never seeded; `credentials.toml.example` only documents its shape.
const SEEDED_FILES: &[&str] = &["sevens.toml"];

/// Copy each missing seeded file from `defaults/` into `config/`. Returns the
/// files that were written; existing files are never replaced.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(copy_error(format!(
                "no {name} in {} or {}; run from the project root",
                config_dir.display(),
                defaults_dir.display()
            )));
        }

        std::fs::create_dir_all(&config_dir)
            .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        info!(path = %target.display(), "seeded config from defaults");
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory with process environment overrides, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd, |key| std::env::var(key).ok())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Platform data directory, or the working directory when none is known.
fn default_session_path() -> PathBuf {
    ProjectDirs::from("ie", "TryIt", "sevens")
        .map(|dirs| dirs.data_dir().join("session.db"))
        .unwrap_or_else(|| PathBuf::from("sevens-session.db"))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.genders.is_empty() {
        return Err(invalid("league.genders", "must list at least one gender"));
    }
    if !league.is_known_gender(&league.tiered_gender) {
        return Err(invalid(
            "league.tiered_gender",
            format!("`{}` is not one of league.genders", league.tiered_gender),
        ));
    }
    if league.tiers.is_empty() {
        return Err(invalid("league.tiers", "must list at least one tier"));
    }
    if league.tiers.iter().any(|t| t == ALL) {
        return Err(invalid("league.tiers", format!("`{ALL}` is reserved")));
    }

    let url = config.supabase.url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(invalid(
            "supabase.url",
            format!("must be an http(s) URL, got `{url}`"),
        ));
    }
    if config.supabase.timeout_secs == 0 {
        return Err(invalid("supabase.timeout_secs", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
