//! Scorer lease commands

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Subcommand;

use super::app::Session;
use super::match_cmd::resolve_recent_match;
use super::output::Output;
use crate::domain::ScorerLock;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum LockCommands {
    /// Take the scorer lease (or refresh your own)
    Acquire,

    /// Give up the scorer lease
    Release,

    /// Push your lease's expiry out by another full lease
    Extend,
}

pub fn run(cmd: LockCommands, session: &Session, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let book = project.scorebook();
    let id = resolve_recent_match(&book, session.match_id.as_deref())?;
    let scorer = session.scorer.as_str();

    output.verbose_ctx("lock", &format!("Match {} as '{}'", id, scorer));

    match cmd {
        LockCommands::Acquire => {
            let lock = book.try_acquire_lock(&id, scorer)?;
            report(output, &lock, &format!("Scoring {} as {}", id, scorer));
        }
        LockCommands::Extend => {
            let lock = book.extend_lock(&id, scorer)?;
            report(output, &lock, &format!("Extended lease on {}", id));
        }
        LockCommands::Release => {
            if !book.release_lock(&id, scorer)? {
                bail!("{} does not hold the lease on {}", scorer, id);
            }
            output.success(&format!("Released lease on {}", id));
        }
    }

    Ok(())
}

fn report(output: &Output, lock: &ScorerLock, message: &str) {
    if output.is_json() {
        output.data(lock);
    } else {
        let minutes = lock.remaining(Utc::now()).num_minutes();
        output.success(&format!(
            "{} until {} ({} min)",
            message,
            lock.expires_at.format("%H:%M:%S UTC"),
            minutes
        ));
    }
}
