//! Errors raised by the scoring domain
//!
//! Every variant is recoverable: a failed operation leaves the match exactly
//! as it was, so the scorer can correct the input and try again.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::match_state::MatchStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("No innings in progress (match is {0})")]
    InactiveInnings(MatchStatus),

    #[error("Scoring is locked by {holder} until {expires_at}")]
    LockHeldByOther {
        holder: String,
        expires_at: DateTime<Utc>,
    },

    #[error("Scorer lock is not held by '{0}'. Run 'crease lock acquire' first.")]
    LockNotHeld(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Overs per innings must be between 1 and {max}, got {overs}")]
    InvalidOvers { overs: u32, max: u32 },

    #[error("{runs} runs from a single ball is more than the allowed {max}")]
    InvalidExtras { runs: u32, max: u32 },

    #[error("No batter left to replace {0}; name the incoming batter")]
    NoEligibleBatter(String),

    #[error("Striker and non-striker must be set before the next delivery")]
    PlayersNotSet,

    #[error("A bowler must be selected before the next delivery")]
    BowlerRequired,

    #[error("{0} bowled the previous over and cannot bowl two in a row")]
    ConsecutiveOvers(String),

    #[error("Invalid player: {0}")]
    InvalidPlayer(String),

    #[error("Unknown outcome code '{0}' (expected 0-4, 6, W, WD, NB, BY or LB)")]
    UnknownOutcome(String),
}
