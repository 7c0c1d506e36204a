//! Live scoring commands: players, ball, undo, innings and match endings,
//! commentary

use anyhow::{anyhow, Result};

use super::app::Session;
use super::match_cmd::{resolve_match, resolve_recent_match};
use super::output::Output;
use crate::domain::{Delivery, MatchStatus, Outcome};
use crate::storage::Project;

pub fn players(
    session: &Session,
    output: &Output,
    striker: Option<&str>,
    non_striker: Option<&str>,
    bowler: Option<&str>,
) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_match(&book, session.match_id.as_deref())?;
    let current = book.load(&id)?;

    let striker = striker
        .map(str::to_string)
        .or(current.batting.striker.clone())
        .ok_or_else(|| anyhow!("No striker at the crease; pass --striker"))?;
    let non_striker = non_striker
        .map(str::to_string)
        .or(current.batting.non_striker.clone())
        .ok_or_else(|| anyhow!("No non-striker at the crease; pass --non-striker"))?;
    let bowler = bowler
        .map(str::to_string)
        .or(current.bowling.current_bowler.clone())
        .ok_or_else(|| anyhow!("No bowler set; pass --bowler"))?;

    book.set_on_field_players(&id, &session.scorer, &striker, &non_striker, &bowler)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "striker": striker,
            "non_striker": non_striker,
            "bowler": bowler,
        }));
    } else {
        output.success(&format!(
            "{} on strike, {} at the other end, {} bowling",
            striker, non_striker, bowler
        ));
    }

    Ok(())
}

/// Builds a delivery from the command-line code and options
fn delivery_from_args(
    code: &str,
    runs: Option<u32>,
    batter: Option<String>,
    how: Option<String>,
) -> Result<Delivery> {
    let mut delivery = Delivery::parse(code)?;

    if let Some(runs) = runs {
        delivery = match delivery.outcome {
            Outcome::NoBall => delivery.with_runs_off_bat(runs),
            Outcome::Wide | Outcome::Bye | Outcome::LegBye => delivery.with_runs(runs),
            other => {
                return Err(anyhow!(
                    "--runs only applies to WD, NB, BY and LB, not {}",
                    other
                ))
            }
        };
    }

    if batter.is_some() || how.is_some() {
        if delivery.outcome != Outcome::Wicket {
            return Err(anyhow!("--batter and --how only apply to a wicket (W)"));
        }
        if let Some(name) = batter {
            delivery = delivery.with_new_batter(name);
        }
        if let Some(how) = how {
            delivery = delivery.with_dismissal(how);
        }
    }

    Ok(delivery)
}

pub fn ball(
    session: &Session,
    output: &Output,
    code: &str,
    runs: Option<u32>,
    batter: Option<String>,
    how: Option<String>,
) -> Result<()> {
    let delivery = delivery_from_args(code, runs, batter, how)?;

    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_match(&book, session.match_id.as_deref())?;

    output.verbose_ctx("ball", &format!("{} on {}", delivery.outcome, id));
    let result = book.apply_delivery(&id, &session.scorer, &delivery)?;

    if output.is_json() {
        output.data(&result);
        return Ok(());
    }

    println!("{}", result.commentary);
    println!("{} {}", result.entry.batting_team, result.score);

    if result.match_completed {
        let m = book.load(&id)?;
        output.blank();
        output.note(&format!(
            "Match over. {}",
            m.result().unwrap_or_else(|| "No result".to_string())
        ));
    } else if result.innings_ended {
        let m = book.load(&id)?;
        output.blank();
        output.note(&format!(
            "Innings over. {} need {} to win.",
            m.batting_team,
            m.target().unwrap_or_default()
        ));
        output.note("Pick openers and a bowler: crease players --striker A --non-striker B --bowler C");
    } else if result.over_complete {
        output.note("End of over. Choose the next bowler: crease players --bowler NAME");
    }

    Ok(())
}

pub fn undo(session: &Session, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_recent_match(&book, session.match_id.as_deref())?;

    let undone = book.undo_last(&id, &session.scorer)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "undone": undone }));
    } else if undone {
        let m = book.load(&id)?;
        output.success(&format!(
            "Undid last ball. {} {}",
            m.batting_team,
            m.batting_score()
        ));
    } else {
        output.success("Nothing to undo");
    }

    Ok(())
}

pub fn end_innings(session: &Session, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_match(&book, session.match_id.as_deref())?;

    let status = book.end_innings(&id, &session.scorer)?;
    let message = match status {
        MatchStatus::Completed => "Second innings closed; match completed".to_string(),
        _ => {
            let m = book.load(&id)?;
            format!(
                "First innings closed. {} need {} to win.",
                m.batting_team,
                m.target().unwrap_or_default()
            )
        }
    };

    output.success(&message);
    Ok(())
}

pub fn end_match(session: &Session, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_match(&book, session.match_id.as_deref())?;

    book.end_match(&id, &session.scorer)?;
    let m = book.load(&id)?;

    output.success(&format!(
        "Match completed. {}",
        m.result().unwrap_or_else(|| "No result".to_string())
    ));
    Ok(())
}

pub fn commentary(session: &Session, output: &Output, lines: usize) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_recent_match(&book, session.match_id.as_deref())?;
    let m = book.load(&id)?;

    let recent: Vec<&String> = m.recent_commentary(lines).collect();

    if output.is_json() {
        output.data(&recent);
    } else if recent.is_empty() {
        println!("No balls bowled yet");
    } else {
        for line in recent {
            println!("{}", line);
        }
    }

    Ok(())
}
