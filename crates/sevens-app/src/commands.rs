// Command handlers. Each writes its user-facing output to `out`; diagnostics
// go to the log.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use sevens_core::access::{self, Navigation};
use sevens_core::category::ALL;
use sevens_core::config::LeagueConfig;
use sevens_core::fixtures::Fixtures;
use sevens_core::session::{AuthError, Session};
use sevens_core::source::{AccountSource, LeagueSource};
use sevens_core::standings::Scoreboard;

use crate::cli::OutputFormat;
use crate::render;

/// Reject labels the league does not use before any query is issued.
pub fn validate_category(
    league: &LeagueConfig,
    gender: &str,
    category_type: &str,
    allow_all_genders: bool,
) -> Result<()> {
    let gender_ok = league.is_known_gender(gender) || (allow_all_genders && gender == ALL);
    if !gender_ok {
        bail!(
            "unknown gender `{gender}` (expected one of: {})",
            league.genders.join(", ")
        );
    }
    if gender != ALL && !league.is_known_type(gender, category_type) {
        if gender == league.tiered_gender {
            bail!(
                "unknown type `{category_type}` for {gender} (expected {ALL} or one of: {})",
                league.tiers.join(", ")
            );
        }
        bail!("{gender} is not split into tiers; use --type {ALL}");
    }
    Ok(())
}

pub async fn standings<S, W>(
    source: Arc<S>,
    league: &LeagueConfig,
    gender: &str,
    category_type: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    S: LeagueSource + ?Sized,
    W: Write,
{
    validate_category(league, gender, category_type, false)?;

    let resolver = league.resolver();
    let key = resolver.resolve(gender, category_type);
    let scoreboard = Scoreboard::new(source, resolver);
    let rows = scoreboard.fetch_by_category(gender, category_type).await;

    match format {
        OutputFormat::Table => {
            let title = format!("{} standings: {key}", league.name);
            render::write_standings_table(out, &title, &rows)
        }
        OutputFormat::Csv => render::write_standings_csv(out, &rows),
    }
}

pub async fn fixtures<S, W>(
    source: Arc<S>,
    league: &LeagueConfig,
    gender: &str,
    category_type: &str,
    out: &mut W,
) -> Result<()>
where
    S: LeagueSource + ?Sized,
    W: Write,
{
    validate_category(league, gender, category_type, true)?;

    let list = Fixtures::new(source, league.resolver());
    let fixtures = list.fetch_by_category(gender, category_type).await;
    render::write_fixtures(out, &fixtures)
}

pub async fn login<A, W>(
    session: &mut Session,
    accounts: &A,
    username: &str,
    password: &str,
    out: &mut W,
) -> Result<()>
where
    A: AccountSource + ?Sized,
    W: Write,
{
    match session.login(accounts, username, password).await {
        Ok(user) => {
            writeln!(out, "Logged in as {} ({})", user.username, display_role(user.effective_role()))?;
            Ok(())
        }
        Err(AuthError::InvalidCredentials) => bail!("invalid username or password"),
        Err(e) => Err(e.into()),
    }
}

pub fn logout<W: Write>(session: &mut Session, out: &mut W) -> Result<()> {
    if !session.is_logged_in() {
        writeln!(out, "Not logged in.")?;
        return Ok(());
    }
    session.logout()?;
    writeln!(out, "Logged out.")?;
    Ok(())
}

pub fn whoami<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    match (session.user(), session.role()) {
        (Some(user), Some(role)) => writeln!(out, "{} ({})", user.username, display_role(role))?,
        _ => writeln!(out, "Not logged in.")?,
    }
    Ok(())
}

/// Print the navigation decision for `path`. Returns whether access is
/// granted so the binary can set its exit status.
pub fn check_access<W: Write>(session: &Session, path: &str, out: &mut W) -> Result<bool> {
    let decision = access::guard(session, path);
    info!(path, ?decision, "access check");
    match decision {
        Navigation::Proceed => {
            writeln!(out, "allowed: {path}")?;
            Ok(true)
        }
        Navigation::Redirect(target) => {
            writeln!(out, "denied: {path} (redirect to {target})")?;
            Ok(false)
        }
    }
}

fn display_role(role: &str) -> &str {
    if role.is_empty() {
        "no access level"
    } else {
        role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn league() -> LeagueConfig {
        LeagueConfig {
            name: "Try It Sevens".into(),
            genders: vec!["Male".into(), "Ladies".into(), "Juniors".into()],
            tiered_gender: "Male".into(),
            tiers: vec!["Elite".into(), "Social".into()],
        }
    }

    #[test]
    fn validation_accepts_known_categories() {
        let l = league();
        assert!(validate_category(&l, "Male", "Elite", false).is_ok());
        assert!(validate_category(&l, "Male", "All", false).is_ok());
        assert!(validate_category(&l, "Juniors", "All", false).is_ok());
        assert!(validate_category(&l, "All", "All", true).is_ok());
    }

    #[test]
    fn validation_rejects_unknown_labels() {
        let l = league();
        let err = validate_category(&l, "Mixed", "All", false).unwrap_err();
        assert!(err.to_string().contains("unknown gender `Mixed`"));

        let err = validate_category(&l, "Male", "Vets", false).unwrap_err();
        assert!(err.to_string().contains("Elite, Social"));

        let err = validate_category(&l, "Ladies", "Elite", false).unwrap_err();
        assert!(err.to_string().contains("not split into tiers"));

        assert!(validate_category(&l, "All", "All", false).is_err());
    }

    #[test]
    fn whoami_reports_role_when_access_missing() {
        use sevens_core::model::{RecordId, User};

        let mut session = Session::in_memory().unwrap();
        let mut out = Vec::new();
        for (role, access) in [(Some("Admin"), None), (None, None)] {
            session
                .sign_in(User {
                    id: RecordId::from(4),
                    username: "ref".into(),
                    role: role.map(String::from),
                    access,
                })
                .unwrap();
            whoami(&session, &mut out).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "ref (Admin)\nref (no access level)\n");
    }

    #[test]
    fn whoami_and_logout_when_signed_out() {
        let mut session = Session::in_memory().unwrap();
        let mut out = Vec::new();
        whoami(&session, &mut out).unwrap();
        logout(&mut session, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Not logged in.\nNot logged in.\n");
    }
}
