//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{export_cmd, lock_cmd, logging, match_cmd, scoring};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "crease")]
#[command(author, version, about = "Ball-by-ball cricket scoring from the command line")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Scorer identity used for the lease (name, phone number, ...)
    #[arg(long = "as", visible_alias = "holder", global = true, env = "CREASE_SCORER")]
    pub scorer: Option<String>,

    /// Match to act on (defaults to the only match in progress)
    #[arg(long = "match", short = 'm', global = true, env = "CREASE_MATCH")]
    pub match_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new crease project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Create, list, show and delete matches
    #[command(subcommand)]
    Match(match_cmd::MatchCommands),

    /// Take, give up or extend the scorer lease
    #[command(subcommand)]
    Lock(lock_cmd::LockCommands),

    /// Set the batters at the crease and the bowler
    ///
    /// Omitted roles keep their current player.
    Players {
        /// Batter facing the next ball
        #[arg(long)]
        striker: Option<String>,

        /// Batter at the bowler's end
        #[arg(long)]
        non_striker: Option<String>,

        /// Bowler of the current over
        #[arg(long)]
        bowler: Option<String>,
    },

    /// Record one delivery
    ///
    /// Codes: 0 1 2 3 4 6, W, WD, NB, BY, LB (case-insensitive)
    ///
    /// Examples:
    ///   crease ball 4
    ///   crease ball WD --runs 5
    ///   crease ball NB --runs 4           # four off the bat from a no-ball
    ///   crease ball W --batter "Chen" --how "caught at slip"
    Ball {
        /// Outcome code
        code: String,

        /// Runs on a wide, bye or leg-bye; runs off the bat on a no-ball
        #[arg(long)]
        runs: Option<u32>,

        /// Incoming batter after a wicket (defaults to the next in order)
        #[arg(long)]
        batter: Option<String>,

        /// How the batter was out
        #[arg(long)]
        how: Option<String>,
    },

    /// Revert the last delivery
    Undo,

    /// End the current innings now
    EndInnings,

    /// Mark the match completed
    EndMatch,

    /// Show recent commentary, newest first
    Commentary {
        /// Number of lines
        #[arg(short = 'n', long, default_value = "10")]
        lines: usize,
    },

    /// Export a match
    #[command(subcommand)]
    Export(export_cmd::ExportCommands),

    /// Player totals across all matches
    Stats,
}

/// Per-invocation identity and match selection
pub struct Session {
    pub scorer: String,
    pub match_id: Option<String>,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    let session = Session {
        scorer: cli
            .scorer
            .unwrap_or_else(|| config.global.effective_scorer()),
        match_id: cli.match_id,
    };

    output.verbose(&format!("Crease starting as scorer '{}'", session.scorer));

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .crease directory at: {}", project.crease_dir().display()),
            );
            output.success(&format!(
                "Initialized crease project at {}",
                project.root().display()
            ));
        }

        Commands::Match(cmd) => match_cmd::run(cmd, &session, &output)?,
        Commands::Lock(cmd) => lock_cmd::run(cmd, &session, &output)?,

        Commands::Players {
            striker,
            non_striker,
            bowler,
        } => scoring::players(
            &session,
            &output,
            striker.as_deref(),
            non_striker.as_deref(),
            bowler.as_deref(),
        )?,

        Commands::Ball {
            code,
            runs,
            batter,
            how,
        } => scoring::ball(&session, &output, &code, runs, batter, how)?,

        Commands::Undo => scoring::undo(&session, &output)?,
        Commands::EndInnings => scoring::end_innings(&session, &output)?,
        Commands::EndMatch => scoring::end_match(&session, &output)?,
        Commands::Commentary { lines } => scoring::commentary(&session, &output, lines)?,

        Commands::Export(cmd) => export_cmd::run(cmd, &session, &output)?,
        Commands::Stats => export_cmd::stats(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
