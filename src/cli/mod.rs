//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Match | Match records | `match new`, `match list`, `match show` |
//! | Lease | Scorer exclusivity | `lock acquire`, `lock extend` |
//! | Scoring | Live scoring | `players`, `ball`, `undo`, `end-innings` |
//! | Reports | Read-only views | `commentary`, `export csv`, `stats` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Scorer Identity
//!
//! Mutating commands act as `--as NAME`, falling back to `$CREASE_SCORER`,
//! the `scorer` key of the global config, then `$USER`.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and library trace events:
//! ```bash
//! crease --verbose ball 4
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod export_cmd;
mod lock_cmd;
mod logging;
mod match_cmd;
mod output;
mod scoring;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
