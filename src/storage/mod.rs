//! # Storage Layer
//!
//! Persistence layer for Crease with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Matches | Pretty JSON snapshot | `.crease/matches/{id}.json` |
//! | Backups | Previous snapshot | `.crease/backups/{id}.json` |
//! | Config | TOML | `.crease/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`Scorebook`] holds an exclusive `fs2` lock on `{id}.lock` for the whole
//!   load, apply, persist sequence
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .crease/
//! ├── matches/
//! │   ├── m-1a2b3c4.json    # Match snapshots
//! │   └── m-1a2b3c4.lock    # Write lock (ignored)
//! ├── backups/              # Previous snapshots (ignored)
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a Crease project
//! - [`Scorebook`] - Persisted match operations
//! - [`MatchStore`] - Read/write match snapshots
//! - [`Config`] - Project and global configuration

mod config;
mod export;
mod project;
mod scorebook;
mod store;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use export::{ball_log_csv, ball_log_rows, player_totals, snapshot_json, BallLogRow, PlayerTotals};
pub use project::{Project, ProjectError};
pub use scorebook::{Clock, DeliveryResult, Scorebook};
pub use store::{MatchGuard, MatchStore, StoreError};
