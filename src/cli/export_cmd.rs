//! Export and statistics commands

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::app::Session;
use super::match_cmd::resolve_recent_match;
use super::output::Output;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Full match snapshot as pretty JSON
    Json {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Ball log as CSV
    Csv {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(cmd: ExportCommands, session: &Session, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_recent_match(&book, session.match_id.as_deref())?;

    let (content, target) = match cmd {
        ExportCommands::Json { output: target } => (book.export_snapshot(&id)?, target),
        ExportCommands::Csv { output: target } => (book.export_ball_log_csv(&id)?, target),
    };

    match target {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            output.success(&format!("Exported {} to {}", id, path.display()));
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

pub fn stats(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let totals = project.scorebook().player_totals()?;

    if output.is_json() {
        output.data(&totals);
        return Ok(());
    }

    if totals.is_empty() {
        println!("No data");
        return Ok(());
    }

    println!(
        "{:<20} {:>3} {:>5} {:>5} {:>4} {:>4} {:>7} {:>6} {:>5} {:>4}",
        "PLAYER", "M", "R", "B", "4s", "6s", "SR", "O", "RC", "W"
    );
    println!("{}", "-".repeat(74));
    for t in &totals {
        println!(
            "{:<20} {:>3} {:>5} {:>5} {:>4} {:>4} {:>7.2} {:>6} {:>5} {:>4}",
            t.player,
            t.matches,
            t.batting.runs,
            t.batting.balls,
            t.batting.fours,
            t.batting.sixes,
            t.strike_rate(),
            t.bowling.overs(),
            t.bowling.runs,
            t.bowling.wickets
        );
    }

    Ok(())
}
