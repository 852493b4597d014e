// Try It Sevens command-line entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, keeping stdout for command output)
// 2. Load config
// 3. Open the session store and restore the signed-in user
// 4. Pick the data source (demo data or Supabase)
// 5. Run the requested command

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use sevens_app::cli::{Cli, Command};
use sevens_app::commands;
use sevens_core::config::{self, Config};
use sevens_core::session::{Session, SessionStore};
use sevens_core::source::MemorySource;
use sevens_supabase::SupabaseClient;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    init_tracing()?;
    info!("sevens starting: {:?}", cli.command);

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, genders={:?}, tiered={}",
        config.league.name, config.league.genders, config.league.tiered_gender
    );

    // 3. Open the session store
    let mut session = open_session(&config)?;
    match session.restore() {
        Ok(true) => info!("Signed-in user restored from previous run"),
        Ok(false) => info!("No signed-in user"),
        Err(e) => warn!("Session restore failed: {e:#}"),
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // 4-5. Commands that need no data source run first so they work offline
    // and without an anon key.
    match &cli.command {
        Command::Logout => {
            commands::logout(&mut session, &mut out)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Whoami => {
            commands::whoami(&session, &mut out)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Access { path } => {
            let allowed = commands::check_access(&session, path, &mut out)?;
            return Ok(if allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        _ => {}
    }

    if cli.demo {
        info!("Using built-in demo data");
        run(cli.command, &config, &mut session, Arc::new(MemorySource::demo()), &mut out).await?;
    } else {
        let client = SupabaseClient::from_config(&config)
            .context("failed to create Supabase client")?;
        info!("Using Supabase at {}", config.supabase.url);
        run(cli.command, &config, &mut session, Arc::new(client), &mut out).await?;
    }

    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Run a data-backed command against `source`.
async fn run<S, W>(
    command: Command,
    config: &Config,
    session: &mut Session,
    source: Arc<S>,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: sevens_core::source::LeagueSource + sevens_core::source::AccountSource + 'static,
    W: Write,
{
    match command {
        Command::Standings {
            gender,
            category_type,
            format,
        } => {
            commands::standings(source, &config.league, &gender, &category_type, format, out).await
        }
        Command::Fixtures {
            gender,
            category_type,
        } => commands::fixtures(source, &config.league, &gender, &category_type, out).await,
        Command::Login { username, password } => {
            commands::login(session, source.as_ref(), &username, &password, out).await
        }
        Command::Logout | Command::Whoami | Command::Access { .. } => Ok(()),
    }
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    if let Some(parent) = config.session_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory {}", parent.display())
            })?;
        }
    }
    let path = config.session_path.to_string_lossy();
    let store = SessionStore::open(&path).context("failed to open session store")?;
    info!("Session store opened at {path}");
    Ok(Session::new(store))
}

/// Initialize tracing to log to a file so stdout carries only command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("sevens.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sevens=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
