//! Crease - ball-by-ball cricket scoring
//!
//! Crease keeps a live scorebook for limited-overs matches: every delivery
//! updates team scores, player figures, strike and the over count, and can
//! be undone exactly. One scorer at a time holds a time-boxed lease on a
//! match; snapshots are stored as JSON under `.crease/`.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Delivery, Match, MatchError, MatchId, MatchStatus, Outcome};
pub use storage::{Project, Scorebook};
