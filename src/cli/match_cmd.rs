//! Match CLI commands

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;

use super::app::Session;
use super::output::Output;
use crate::domain::{Match, MatchId, NewMatch, Side};
use crate::storage::{Project, Scorebook};

#[derive(Subcommand)]
pub enum MatchCommands {
    /// Create a match; Team A bats first with its first two players
    ///
    /// Example:
    ///   crease match new "Tigers vs Lions" --team-a Asha,Ben,Chen --team-b Dev,Eli,Fay --overs 6
    New {
        /// Match title
        title: String,

        /// Team A players in batting order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        team_a: Vec<String>,

        /// Team B players in batting order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        team_b: Vec<String>,

        /// Overs per innings (defaults to `default_overs` in config)
        #[arg(long)]
        overs: Option<u32>,

        /// Ground or venue
        #[arg(long, default_value = "")]
        venue: String,
    },

    /// List matches
    List,

    /// Show the scoreboard for a match
    Show {
        /// Match ID (defaults to --match or the only match in progress)
        id: Option<String>,
    },

    /// Delete a match
    Delete {
        /// Match ID
        id: String,
    },
}

pub fn run(cmd: MatchCommands, session: &Session, output: &Output) -> Result<()> {
    match cmd {
        MatchCommands::New {
            title,
            team_a,
            team_b,
            overs,
            venue,
        } => new_match(output, title, team_a, team_b, overs, venue),
        MatchCommands::List => list_matches(output),
        MatchCommands::Show { id } => {
            show_match(session, output, id.as_deref().or(session.match_id.as_deref()))
        }
        MatchCommands::Delete { id } => delete_match(session, output, &id),
    }
}

const NO_MATCH: &str = "No match in progress. Pass --match or run 'crease match new'.";

/// Picks the match a command applies to: the requested one, or the only
/// match still in progress
pub fn resolve_match(book: &Scorebook, requested: Option<&str>) -> Result<MatchId> {
    pick_match(book, requested, false)
}

/// Like [`resolve_match`], but with no match in progress falls back to the
/// most recently scored one
pub fn resolve_recent_match(book: &Scorebook, requested: Option<&str>) -> Result<MatchId> {
    pick_match(book, requested, true)
}

fn pick_match(book: &Scorebook, requested: Option<&str>, allow_finished: bool) -> Result<MatchId> {
    if let Some(id) = requested {
        return Ok(id.parse()?);
    }

    let all = book.list()?;
    let live: Vec<&Match> = all.iter().filter(|m| m.status.is_active()).collect();

    match live.as_slice() {
        [only] => Ok(only.id.clone()),
        [] if allow_finished => all
            .iter()
            .max_by_key(|m| m.ball_log.last().map_or(m.created_at, |b| b.time))
            .map(|m| m.id.clone())
            .ok_or_else(|| anyhow!(NO_MATCH)),
        [] => Err(anyhow!(NO_MATCH)),
        _ => bail!(
            "{} matches in progress; pass --match to pick one",
            live.len()
        ),
    }
}

fn new_match(
    output: &Output,
    title: String,
    team_a: Vec<String>,
    team_b: Vec<String>,
    overs: Option<u32>,
    venue: String,
) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();

    let overs_limit = overs.unwrap_or(book.config().default_overs);
    output.verbose_ctx(
        "match",
        &format!(
            "Creating '{}' with {} overs, {} v {} players",
            title,
            overs_limit,
            team_a.len(),
            team_b.len()
        ),
    );

    let id = book.create_match(NewMatch {
        title,
        venue,
        overs_limit,
        team_a,
        team_b,
    })?;

    if output.is_json() {
        output.data(&book.load(&id)?);
    } else {
        output.success(&format!("Created match {}", id));
        output.note("Next: 'crease lock acquire', then 'crease players --bowler NAME'");
    }

    Ok(())
}

fn list_matches(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let matches = project.scorebook().list()?;

    if output.is_json() {
        let items: Vec<_> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id.to_string(),
                    "title": m.title,
                    "venue": m.venue,
                    "status": m.status,
                    "overs_limit": m.overs_limit,
                    "scores": m.scores,
                    "result": m.result(),
                    "created_at": m.created_at,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches yet. Create one with 'crease match new'.");
        return Ok(());
    }

    println!(
        "{:<10} {:<10} {:<18} {:<18} TITLE",
        "ID", "STATUS", "TEAM A", "TEAM B"
    );
    println!("{}", "-".repeat(80));
    for m in &matches {
        println!(
            "{:<10} {:<10} {:<18} {:<18} {}",
            m.id.to_string(),
            m.status.to_string(),
            m.score(Side::TeamA).to_string(),
            m.score(Side::TeamB).to_string(),
            m.title
        );
    }

    Ok(())
}

fn show_match(session: &Session, output: &Output, id: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_recent_match(&book, id)?;
    let m = book.load(&id)?;

    if output.is_json() {
        output.data(&m);
    } else {
        print_scoreboard(&m, &session.scorer);
    }

    Ok(())
}

fn delete_match(session: &Session, output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: MatchId = id.parse()?;

    if !project.scorebook().delete(&id, &session.scorer)? {
        bail!("Match not found: {}", id);
    }

    output.success(&format!("Deleted match {}", id));
    Ok(())
}

/// Prints the full text scoreboard
pub fn print_scoreboard(m: &Match, scorer: &str) {
    if m.venue.is_empty() {
        println!("{} ({})", m.title, m.id);
    } else {
        println!("{} ({}) at {}", m.title, m.id, m.venue);
    }
    println!("Status: {} | {} overs per side", m.status, m.overs_limit);
    println!();

    for side in [Side::TeamA, Side::TeamB] {
        let score = m.score(side);
        let marker = if m.status.is_active() && side == m.batting_team {
            "*"
        } else {
            " "
        };
        println!(
            "{}{:<7} {:<16} RR {:.2}",
            marker,
            side.to_string(),
            score.to_string(),
            score.run_rate()
        );
    }

    if m.status.is_active() {
        if let (Some(target), Some(required)) = (m.target(), m.runs_required()) {
            let balls_left = m.innings_balls().saturating_sub(m.batting_score().balls);
            println!(
                "Target {}: need {} from {} balls",
                target, required, balls_left
            );
        }

        println!();
        println!(
            "Striker: {}   Non-striker: {}   Bowler: {}",
            m.batting.striker.as_deref().unwrap_or("-"),
            m.batting.non_striker.as_deref().unwrap_or("-"),
            m.bowling.current_bowler.as_deref().unwrap_or("-")
        );
        if m.bowling.current_bowler.is_none() {
            println!("Waiting for a bowler: run 'crease players --bowler NAME'");
        }
    }

    if let Some(result) = m.result() {
        println!("Result: {}", result);
    }

    match &m.scorer_lock {
        Some(lock) if !lock.is_expired(chrono::Utc::now()) => {
            let mine = if lock.holder == scorer { " (you)" } else { "" };
            println!(
                "Scorer: {}{} until {}",
                lock.holder,
                mine,
                lock.expires_at.format("%H:%M:%S UTC")
            );
        }
        _ => println!("Scorer: nobody holds the lease"),
    }

    for side in [Side::TeamA, Side::TeamB] {
        print_batting_card(m, side);
    }
    for side in [Side::TeamA, Side::TeamB] {
        print_bowling_card(m, side);
    }
}

fn print_batting_card(m: &Match, side: Side) {
    let rows: Vec<_> = m
        .teams
        .roster(side)
        .iter()
        .filter_map(|name| m.batting_stats.get(name).map(|s| (name, s)))
        .collect();
    if rows.is_empty() {
        return;
    }

    println!();
    println!(
        "{} batting {:>5} {:>5} {:>4} {:>4} {:>7}",
        side, "R", "B", "4s", "6s", "SR"
    );
    for (name, s) in rows {
        let status = if m.batting_team == side && m.batting.is_on_field(name) {
            "*"
        } else if m.batting_team == side && m.batting.is_dismissed(name) {
            "out"
        } else {
            ""
        };
        println!(
            "  {:<16} {:<3} {:>5} {:>5} {:>4} {:>4} {:>7.2}",
            name,
            status,
            s.runs,
            s.balls,
            s.fours,
            s.sixes,
            s.strike_rate()
        );
    }
}

fn print_bowling_card(m: &Match, side: Side) {
    let rows: Vec<_> = m
        .teams
        .roster(side)
        .iter()
        .filter_map(|name| m.bowling_stats.get(name).map(|s| (name, s)))
        .collect();
    if rows.is_empty() {
        return;
    }

    println!();
    println!(
        "{} bowling {:>7} {:>5} {:>4} {:>6}",
        side, "O", "R", "W", "Econ"
    );
    for (name, s) in rows {
        println!(
            "  {:<20} {:>7} {:>5} {:>4} {:>6.2}",
            name,
            s.overs(),
            s.runs,
            s.wickets,
            s.economy()
        );
    }
}
