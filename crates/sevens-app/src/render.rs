// Text and CSV rendering of standings and fixtures.

use std::io::Write;

use anyhow::{Context, Result};

use sevens_core::fixtures::Fixture;
use sevens_core::standings::StandingsRow;

const KICKOFF_FORMAT: &str = "%a %d %b %H:%M";
const NO_KICKOFF: &str = "TBC";

/// Write an aligned standings table with a title line.
pub fn write_standings_table<W: Write>(
    out: &mut W,
    title: &str,
    rows: &[StandingsRow],
) -> Result<()> {
    writeln!(out, "{title}")?;
    if rows.is_empty() {
        writeln!(out, "No standings available.")?;
        return Ok(());
    }

    let team_width = rows
        .iter()
        .map(|r| r.team.chars().count())
        .max()
        .unwrap_or(0)
        .max("Team".len());

    writeln!(
        out,
        "{:>3}  {:<team_width$}  {:>2}  {:>2}  {:>2}  {:>2}  {:>4}",
        "Pos", "Team", "P", "W", "D", "L", "Pts"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:>3}  {:<team_width$}  {:>2}  {:>2}  {:>2}  {:>2}  {:>4}",
            row.rank, row.team, row.played, row.wins, row.draws, row.losses, row.points
        )?;
    }
    Ok(())
}

/// Write standings as CSV with a header record.
pub fn write_standings_csv<W: Write>(out: W, rows: &[StandingsRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["rank", "team", "played", "wins", "draws", "losses", "points"])
        .context("failed to write CSV header")?;
    for row in rows {
        writer
            .write_record([
                row.rank.to_string(),
                row.team.clone(),
                row.played.to_string(),
                row.wins.to_string(),
                row.draws.to_string(),
                row.losses.to_string(),
                row.points.to_string(),
            ])
            .with_context(|| format!("failed to write CSV row for {}", row.team))?;
    }
    writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// One fixture per line: kickoff, pitch, teams with the score once complete,
/// and the category.
pub fn write_fixtures<W: Write>(out: &mut W, fixtures: &[Fixture]) -> Result<()> {
    if fixtures.is_empty() {
        writeln!(out, "No fixtures scheduled.")?;
        return Ok(());
    }
    for fixture in fixtures {
        writeln!(out, "{}", fixture_line(fixture))?;
    }
    Ok(())
}

fn fixture_line(f: &Fixture) -> String {
    let kickoff = f
        .kickoff
        .map(|k| k.format(KICKOFF_FORMAT).to_string())
        .unwrap_or_else(|| NO_KICKOFF.to_string());
    let pitch = f.pitch.as_deref().unwrap_or("-");
    let result = match (f.is_complete, f.score_a, f.score_b) {
        (true, Some(a), Some(b)) => format!("{} {a} - {b} {}", f.team_a, f.team_b),
        _ => format!("{} v {}", f.team_a, f.team_b),
    };
    let category = match &f.game_type {
        Some(t) => format!("{} {t}", f.gender),
        None => f.gender.clone(),
    };
    format!("{kickoff:<16}  {pitch:<8}  {result}  ({category})")
}
