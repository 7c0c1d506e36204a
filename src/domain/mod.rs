//! Domain models for Crease
//!
//! Contains the scoring rules and match lifecycle without any I/O concerns.

mod commentary;
mod error;
mod id;
mod lifecycle;
mod lock;
mod match_state;
mod outcome;
mod scoring;

pub use commentary::{describe, Category};
pub use error::MatchError;
pub use id::{IdError, MatchId};
pub use lifecycle::{after_delivery, Transition};
pub use lock::{ScorerLock, DEFAULT_LEASE_MINUTES};
pub use match_state::{
    over_notation, BattingState, BattingStats, BowlingState, BowlingStats, Match, MatchStatus,
    NewMatch, Phase, Scores, Side, TeamScore, Teams, BALLS_PER_OVER, MAX_OVERS,
};
pub use outcome::{Delivery, Extras, Outcome, WicketInfo, MAX_EXTRA_RUNS};
pub use scoring::{apply_delivery, undo_last, Applied, BallLogEntry};
